//! Configuration management for vehiclenft.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "vehiclenft";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "storage.db";

/// Public XRPL test network.
pub const DEFAULT_ENDPOINT: &str = "wss://s.altnet.rippletest.net:51233";

/// Where test accounts get funded.
pub const DEFAULT_FAUCET_URL: &str = "https://test.xrplexplorer.com/faucet";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `VEHICLENFT_`, `__` between
///    section and key)
/// 2. TOML config file at `~/.config/vehiclenft/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger connection and transaction settings.
    pub ledger: LedgerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Faucet configuration.
    pub faucet: FaucetConfig,
}

/// Ledger-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// WebSocket endpoint of an XRPL server.
    pub endpoint: String,
    /// Transaction cost in drops.
    pub fee_drops: u64,
    /// How many ledgers past the current one a transaction stays valid.
    pub last_ledger_offset: u32,
    /// Delay between validation checks while waiting on a submission.
    pub poll_interval_ms: u64,
    /// Taxon given to minted tokens.
    pub nft_taxon: u32,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/vehiclenft/storage.db`
    pub database_path: Option<PathBuf>,
}

/// Faucet configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetConfig {
    /// Faucet page for funding test accounts.
    pub url: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fee_drops: 12,
            last_ledger_offset: 20,
            poll_interval_ms: 1_000,
            nft_taxon: 0,
        }
    }
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FAUCET_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("VEHICLENFT_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let endpoint = &self.ledger.endpoint;
        if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
            return Err(Error::config_validation(format!(
                "ledger endpoint must be a ws:// or wss:// URL, got '{endpoint}'"
            )));
        }

        if self.ledger.fee_drops == 0 {
            return Err(Error::config_validation(
                "fee_drops must be greater than 0",
            ));
        }

        if self.ledger.last_ledger_offset == 0 {
            return Err(Error::config_validation(
                "last_ledger_offset must be greater than 0",
            ));
        }

        if self.ledger.poll_interval_ms == 0 {
            return Err(Error::config_validation(
                "poll_interval_ms must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.ledger.poll_interval_ms)
    }
}
