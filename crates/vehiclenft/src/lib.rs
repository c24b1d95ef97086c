//! `vehiclenft` - Vehicle history records as NFTs on the XRP Ledger
//!
//! This library encodes vehicle records into token metadata, keeps a list
//! of saved wallets, and runs the mint, lookup and dashboard actions against
//! a ledger.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod actions;
pub mod cli;
pub mod codec;
pub mod config;
pub mod credentials;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod render;
pub mod storage;
pub mod vehicle;

pub use actions::{NftView, Outcome};
pub use config::Config;
pub use credentials::{CredentialStore, SavedWallet};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::LocalStorage;
pub use vehicle::VehicleRecord;
