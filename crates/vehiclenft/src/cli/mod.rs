//! Command-line interface for vehiclenft.
//!
//! This module provides the CLI structure for the `vnft` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CodecCommand, ConfigCommand, DashboardCommand, LookupCommand, MintCommand, VehicleArgs,
    WalletCommand,
};

/// vnft - Vehicle history records as NFTs on the XRP Ledger
///
/// Mint a vehicle's inspection and mileage record as an NFT, then look it
/// up again by id or browse every record a saved wallet holds.
#[derive(Debug, Parser)]
#[command(name = "vnft")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mint a vehicle record as an NFT
    Mint(MintCommand),

    /// Find an NFT by id and show its vehicle record
    Lookup(LookupCommand),

    /// Show every NFT held by a saved wallet
    Dashboard(DashboardCommand),

    /// Manage saved wallets
    #[command(subcommand)]
    Wallet(WalletCommand),

    /// Encode or decode token metadata offline
    #[command(subcommand)]
    Codec(CodecCommand),

    /// Show where to fund a test account
    Faucet,

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const MINT_ARGS: &[&str] = &[
        "vnft",
        "mint",
        "--vin",
        "VIN1",
        "--brand",
        "Toyota",
        "--model",
        "Camry",
        "--year",
        "2020",
        "--last-inspection",
        "2023-12-01",
        "--mileage",
        "50000",
    ];

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn mint_with(extra: &[&str]) -> Result<Cli, clap::Error> {
        let args: Vec<&str> = MINT_ARGS.iter().chain(extra).copied().collect();
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "vnft");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;

        assert_eq!(parse(&["vnft", "faucet"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["vnft", "-q", "faucet"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["vnft", "-v", "faucet"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["vnft", "-vv", "faucet"]).verbosity(), Verbosity::Debug);
        assert_eq!(parse(&["vnft", "-vvv", "faucet"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_mint_with_seed() {
        let cli = mint_with(&["--seed", "sSeed", "--save-as", "Fleet"]).unwrap();
        let Command::Mint(cmd) = cli.command else {
            panic!("expected mint");
        };
        assert_eq!(cmd.vehicle.year, 2020);
        assert_eq!(cmd.vehicle.mileage, 50_000);
        assert_eq!(cmd.seed.as_deref(), Some("sSeed"));
        assert_eq!(cmd.save_as.as_deref(), Some("Fleet"));
        assert!(!cmd.burnable);
    }

    #[test]
    fn test_parse_mint_with_wallet() {
        let cli = mint_with(&["-w", "0", "--burnable"]).unwrap();
        let Command::Mint(cmd) = cli.command else {
            panic!("expected mint");
        };
        assert_eq!(cmd.wallet.as_deref(), Some("0"));
        assert!(cmd.burnable);
    }

    #[test]
    fn test_parse_mint_requires_signer() {
        assert!(mint_with(&[]).is_err());
    }

    #[test]
    fn test_parse_mint_rejects_both_signers() {
        assert!(mint_with(&["--seed", "s", "--wallet", "0"]).is_err());
    }

    #[test]
    fn test_parse_mint_save_as_requires_seed() {
        assert!(mint_with(&["--wallet", "0", "--save-as", "x"]).is_err());
    }

    #[test]
    fn test_parse_mint_rejects_negative_mileage() {
        let mut args = MINT_ARGS.to_vec();
        let last = args.len() - 1;
        args[last] = "-5";
        args.extend(["--seed", "s"]);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_lookup() {
        let cli = parse(&["vnft", "lookup", "000800AB", "--account", "rXYZ", "--json"]);
        let Command::Lookup(cmd) = cli.command else {
            panic!("expected lookup");
        };
        assert_eq!(cmd.nft_id, "000800AB");
        assert_eq!(cmd.account.as_deref(), Some("rXYZ"));
        assert!(cmd.json);
    }

    #[test]
    fn test_parse_dashboard() {
        let cli = parse(&["vnft", "dashboard", "Fleet"]);
        assert!(matches!(cli.command, Command::Dashboard(ref d) if d.wallet == "Fleet"));
    }

    #[test]
    fn test_parse_wallet_commands() {
        assert!(matches!(
            parse(&["vnft", "wallet", "add", "Fleet", "sSeed"]).command,
            Command::Wallet(WalletCommand::Add { .. })
        ));
        assert!(matches!(
            parse(&["vnft", "wallet", "list"]).command,
            Command::Wallet(WalletCommand::List { json: false })
        ));
        assert!(matches!(
            parse(&["vnft", "wallet", "remove", "1"]).command,
            Command::Wallet(WalletCommand::Remove { index: 1 })
        ));
    }

    #[test]
    fn test_parse_codec_decode() {
        let cli = parse(&["vnft", "codec", "decode", "68656C6C6F"]);
        assert!(matches!(
            cli.command,
            Command::Codec(CodecCommand::Decode { json: false, .. })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["vnft", "-c", "/custom/config.toml", "faucet"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["vnft", "config", "validate", "--file", "/tmp/c.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
