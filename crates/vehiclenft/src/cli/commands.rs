//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};
use vehiclenft_ledger::flags;

use crate::vehicle::VehicleRecord;

/// Vehicle attributes, shared by `mint` and `codec encode`.
#[derive(Debug, Clone, Args)]
pub struct VehicleArgs {
    /// Vehicle identification number
    #[arg(long)]
    pub vin: String,

    /// Manufacturer
    #[arg(long)]
    pub brand: String,

    /// Model name
    #[arg(long)]
    pub model: String,

    /// Model year
    #[arg(long)]
    pub year: i32,

    /// Date of the last inspection (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub last_inspection: String,

    /// Odometer reading in kilometres
    #[arg(long, value_name = "KM")]
    pub mileage: u64,
}

impl VehicleArgs {
    /// Build the record these arguments describe.
    #[must_use]
    pub fn to_record(&self) -> VehicleRecord {
        VehicleRecord::new(
            &self.vin,
            &self.brand,
            &self.model,
            self.year,
            &self.last_inspection,
            self.mileage,
        )
    }
}

/// Mint command arguments.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("signer").required(true).args(["seed", "wallet"])))]
pub struct MintCommand {
    /// The vehicle to register
    #[command(flatten)]
    pub vehicle: VehicleArgs,

    /// Seed of the minting account (fund one with `vnft faucet`)
    #[arg(long)]
    pub seed: Option<String>,

    /// Saved wallet to mint with, by index or name
    #[arg(short, long, value_name = "WALLET")]
    pub wallet: Option<String>,

    /// Save --seed as a wallet under this name
    #[arg(long, value_name = "NAME", requires = "seed", conflicts_with = "wallet")]
    pub save_as: Option<String>,

    /// Allow the issuer to burn the token
    #[arg(long)]
    pub burnable: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl MintCommand {
    /// `NFTokenMint` flags for this request. Tokens are always transferable.
    #[must_use]
    pub fn flags(&self) -> u32 {
        if self.burnable {
            flags::TF_TRANSFERABLE | flags::TF_BURNABLE
        } else {
            flags::TF_TRANSFERABLE
        }
    }
}

/// Lookup command arguments.
#[derive(Debug, Args)]
pub struct LookupCommand {
    /// The NFT id to find
    pub nft_id: String,

    /// Account to search before the saved wallets
    #[arg(short, long)]
    pub account: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Dashboard command arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Saved wallet, by index or name
    pub wallet: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Saved wallet commands.
#[derive(Debug, Subcommand)]
pub enum WalletCommand {
    /// Save a wallet
    Add {
        /// Label for the wallet
        name: String,
        /// The wallet's seed
        seed: String,
    },

    /// List saved wallets
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove a saved wallet
    Remove {
        /// Position shown by `wallet list`
        index: usize,
    },
}

/// Metadata codec commands.
#[derive(Debug, Subcommand)]
pub enum CodecCommand {
    /// Print the token URI for a vehicle
    Encode {
        /// The vehicle to encode
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Decode a token URI
    Decode {
        /// Hex-encoded URI
        uri: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl ConfigCommand {
    /// Whether this command reads the loaded configuration. `path` and
    /// `validate` run even when the configuration does not load.
    #[must_use]
    pub fn needs_loaded_config(&self) -> bool {
        matches!(self, Self::Show { .. })
    }
}
