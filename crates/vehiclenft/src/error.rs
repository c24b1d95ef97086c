//! Error types for vehiclenft.
//!
//! This module defines all error types used throughout the vehiclenft crate.
//! Actions turn these into user-facing messages; everything else propagates
//! them to the binary.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for vehiclenft operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Wallet Errors ===
    /// The secret could not be turned into an account.
    #[error("Invalid seed: {message}")]
    InvalidSecret {
        /// Why derivation failed.
        message: String,
    },

    /// A required wallet field was left empty.
    #[error("Please provide both wallet name and seed")]
    MissingWalletField,

    /// No saved wallet matches the selector.
    #[error("no saved wallet matches '{selector}'")]
    WalletNotFound {
        /// The index or label that was asked for.
        selector: String,
    },

    /// The stored wallet list is not valid JSON.
    #[error("saved wallet list is unreadable: {source}")]
    WalletListUnreadable {
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A wallet index is past the end of the list.
    #[error("wallet index {index} is out of range ({len} saved)")]
    WalletIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of saved wallets.
        len: usize,
    },

    // === Vehicle Errors ===
    /// A vehicle field failed validation.
    #[error("invalid {field}: {message}")]
    InvalidVehicle {
        /// The offending field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },

    // === Ledger Errors ===
    /// The ledger client reported an error.
    #[error(transparent)]
    Ledger(#[from] vehiclenft_ledger::Error),

    /// The minted token could not be identified.
    #[error("minted token id not found for account {account}")]
    MintedTokenMissing {
        /// The minting account.
        account: String,
    },

    /// No searched account holds the token.
    #[error("NFT not found. Please provide an account address to search.")]
    NftNotFound,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for vehiclenft operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid vehicle field error.
    #[must_use]
    pub fn invalid_vehicle(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidVehicle {
            field,
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error came from the ledger client.
    #[must_use]
    pub fn is_ledger_error(&self) -> bool {
        matches!(self, Self::Ledger(_) | Self::MintedTokenMissing { .. })
    }

    /// Check if this error is a rejected secret.
    #[must_use]
    pub fn is_invalid_secret(&self) -> bool {
        matches!(self, Self::InvalidSecret { .. } | Self::MissingWalletField)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::NftNotFound.to_string(),
            "NFT not found. Please provide an account address to search."
        );
        assert_eq!(
            Error::MissingWalletField.to_string(),
            "Please provide both wallet name and seed"
        );
    }

    #[test]
    fn test_invalid_secret_display() {
        let err = Error::InvalidSecret {
            message: "checksum mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid seed: checksum mismatch");
        assert!(err.is_invalid_secret());
        assert!(!Error::NftNotFound.is_invalid_secret());
    }

    #[test]
    fn test_ledger_error_is_transparent() {
        let err: Error = vehiclenft_ledger::Error::Rpc {
            error: "actNotFound".to_string(),
            message: "Account not found.".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "actNotFound: Account not found.");
        assert!(err.is_ledger_error());
    }

    #[test]
    fn test_invalid_vehicle_display() {
        let err = Error::invalid_vehicle("vin", "must not be empty");
        assert_eq!(err.to_string(), "invalid vin: must not be empty");
    }

    #[test]
    fn test_wallet_index_out_of_range_display() {
        let err = Error::WalletIndexOutOfRange { index: 4, len: 2 };
        let msg = err.to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("fee_drops must be greater than 0");
        assert!(err.to_string().contains("fee_drops"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
