//! Storage layer for vehiclenft.
//!
//! A `SQLite`-backed key/value store with the same surface as a browser's
//! `localStorage`: string keys, string values, last write wins.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Persistent string key/value storage.
#[derive(Debug)]
pub struct LocalStorage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl LocalStorage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            (key, value),
        )?;
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    /// Delete `key`. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    /// All stored keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM local_storage ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM local_storage", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Delete every key. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM local_storage", [])?;
        if affected > 0 {
            info!("Cleared {} stored items", affected);
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> LocalStorage {
        LocalStorage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_open_in_memory() {
        let storage = create_test_storage();
        assert_eq!(storage.path(), Path::new(":memory:"));
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_get_missing_item() {
        let storage = create_test_storage();
        assert_eq!(storage.get_item("missing").unwrap(), None);
    }

    #[test]
    fn test_set_and_get_item() {
        let storage = create_test_storage();
        storage.set_item("greeting", "hello").unwrap();

        assert_eq!(storage.get_item("greeting").unwrap().as_deref(), Some("hello"));
        assert_eq!(storage.len().unwrap(), 1);
    }

    #[test]
    fn test_set_item_overwrites() {
        let storage = create_test_storage();
        storage.set_item("k", "first").unwrap();
        storage.set_item("k", "second").unwrap();

        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("second"));
        assert_eq!(storage.len().unwrap(), 1);
    }

    #[test]
    fn test_empty_value_is_stored() {
        let storage = create_test_storage();
        storage.set_item("blank", "").unwrap();
        assert_eq!(storage.get_item("blank").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_remove_item() {
        let storage = create_test_storage();
        storage.set_item("a", "1").unwrap();

        assert!(storage.remove_item("a").unwrap());
        assert!(!storage.remove_item("a").unwrap());
        assert_eq!(storage.get_item("a").unwrap(), None);
    }

    #[test]
    fn test_keys_sorted() {
        let storage = create_test_storage();
        storage.set_item("zeta", "1").unwrap();
        storage.set_item("alpha", "2").unwrap();
        storage.set_item("mid", "3").unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_clear() {
        let storage = create_test_storage();
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();

        assert_eq!(storage.clear().unwrap(), 2);
        assert!(storage.is_empty().unwrap());
        assert_eq!(storage.clear().unwrap(), 0);
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.db");

        {
            let storage = LocalStorage::open(&path).unwrap();
            storage.set_item("vehicleNftWallets", "[]").unwrap();
        }

        let reopened = LocalStorage::open(&path).unwrap();
        assert_eq!(reopened.path(), path.as_path());
        assert_eq!(
            reopened.get_item("vehicleNftWallets").unwrap().as_deref(),
            Some("[]")
        );
    }
}
