//! Saved wallets.
//!
//! Wallets are kept as one JSON array under [`WALLETS_KEY`] in
//! [`LocalStorage`], in insertion order. Seeds are stored in clear text;
//! this store is meant for test-network accounts only.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::LocalStorage;

/// Storage key holding the wallet list.
pub const WALLETS_KEY: &str = "vehicleNftWallets";

/// A labelled account secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedWallet {
    /// User-chosen label.
    pub name: String,
    /// Classic address derived from `seed`.
    pub address: String,
    /// Family seed.
    pub seed: String,
}

impl fmt::Debug for SavedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavedWallet")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// How a command refers to a saved wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletSelector {
    /// Zero-based position in the list.
    Index(usize),
    /// Exact label.
    Name(String),
}

impl WalletSelector {
    /// Read a selector from user input: digits are an index, anything else
    /// a label.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        input
            .parse::<usize>()
            .map_or_else(|_| Self::Name(input.to_string()), Self::Index)
    }
}

impl fmt::Display for WalletSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// The wallet list, backed by local storage.
#[derive(Debug)]
pub struct CredentialStore<'a> {
    storage: &'a LocalStorage,
}

impl<'a> CredentialStore<'a> {
    /// Wrap `storage`.
    #[must_use]
    pub fn new(storage: &'a LocalStorage) -> Self {
        Self { storage }
    }

    /// All saved wallets in insertion order.
    ///
    /// A missing key reads as an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalletListUnreadable`] if the stored value does not
    /// parse, or a storage error.
    pub fn list(&self) -> Result<Vec<SavedWallet>> {
        let Some(raw) = self.storage.get_item(WALLETS_KEY)? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|source| {
            warn!("Saved wallet list is unreadable: {}", source);
            Error::WalletListUnreadable { source }
        })
    }

    /// Derive the address for `seed` and append a new wallet.
    ///
    /// Nothing is written if the label or seed is empty or the seed does
    /// not decode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingWalletField`], [`Error::InvalidSecret`], or a
    /// storage error.
    pub fn add(&self, name: &str, seed: &str) -> Result<SavedWallet> {
        let name = name.trim();
        let seed = seed.trim();
        if name.is_empty() || seed.is_empty() {
            return Err(Error::MissingWalletField);
        }

        let address = vehiclenft_ledger::derive_address(seed).map_err(|e| {
            let message = match e {
                vehiclenft_ledger::Error::InvalidSeed(message) => message,
                other => other.to_string(),
            };
            Error::InvalidSecret { message }
        })?;

        let wallet = SavedWallet {
            name: name.to_string(),
            address,
            seed: seed.to_string(),
        };

        let mut wallets = self.list()?;
        wallets.push(wallet.clone());
        self.save(&wallets)?;

        info!("Saved wallet '{}' ({})", wallet.name, wallet.address);
        Ok(wallet)
    }

    /// Remove the wallet at `index` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalletIndexOutOfRange`] without touching the list,
    /// or a storage error.
    pub fn remove(&self, index: usize) -> Result<SavedWallet> {
        let mut wallets = self.list()?;
        if index >= wallets.len() {
            return Err(Error::WalletIndexOutOfRange {
                index,
                len: wallets.len(),
            });
        }

        let removed = wallets.remove(index);
        self.save(&wallets)?;

        info!("Removed wallet '{}'", removed.name);
        Ok(removed)
    }

    /// Resolve a selector to a wallet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalletNotFound`] if nothing matches, or a storage
    /// error.
    pub fn find(&self, selector: &WalletSelector) -> Result<SavedWallet> {
        let wallets = self.list()?;
        let found = match selector {
            WalletSelector::Index(index) => wallets.into_iter().nth(*index),
            WalletSelector::Name(name) => wallets.into_iter().find(|w| &w.name == name),
        };
        found.ok_or_else(|| Error::WalletNotFound {
            selector: selector.to_string(),
        })
    }

    /// Addresses of all saved wallets, without duplicates, in list order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    pub fn addresses(&self) -> Result<Vec<String>> {
        let mut addresses: Vec<String> = Vec::new();
        for wallet in self.list()? {
            if !addresses.contains(&wallet.address) {
                addresses.push(wallet.address);
            }
        }
        Ok(addresses)
    }

    fn save(&self, wallets: &[SavedWallet]) -> Result<()> {
        let json = serde_json::to_string(wallets)?;
        self.storage.set_item(WALLETS_KEY, &json)?;
        debug!("Wallet list now holds {} entries", wallets.len());
        Ok(())
    }
}
