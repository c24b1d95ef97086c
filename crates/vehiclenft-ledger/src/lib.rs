//! `vehiclenft-ledger` - a small XRP Ledger client.
//!
//! Covers exactly what minting and reading NFTs needs: seed decoding and
//! key derivation, classic addresses, `NFTokenMint` serialization and
//! signing, and a WebSocket client for the handful of commands involved.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod address;
pub mod binary;
pub mod client;
pub mod error;
pub mod keys;
pub mod models;
pub mod transaction;

pub use client::{Client, MintParams};
pub use error::{Error, Result};
pub use keys::{derive_address, KeyType, Seed, Wallet};
pub use models::{AccountNft, SubmitResult, ValidatedTransaction};
pub use transaction::{flags, NfTokenMint, SignedTransaction};
