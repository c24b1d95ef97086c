//! `vnft` - CLI for vehiclenft
//!
//! Registers vehicle-history records as NFTs on the XRP Ledger and reads
//! them back.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};

use vehiclenft::actions::{self, Outcome};
use vehiclenft::cli::{
    Cli, CodecCommand, Command, ConfigCommand, DashboardCommand, LookupCommand, MintCommand,
    WalletCommand,
};
use vehiclenft::credentials::{CredentialStore, WalletSelector};
use vehiclenft::ledger::XrplGateway;
use vehiclenft::render::{self, Dashboard, WalletList};
use vehiclenft::{codec, init_logging, Config, LocalStorage};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    if let Command::Config(cmd) = &cli.command {
        if !cmd.needs_loaded_config() {
            handle_config_file(cmd, cli.config.clone());
            return Ok(());
        }
    }

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Mint(cmd) => handle_mint(&config, &cmd).await,
        Command::Lookup(cmd) => handle_lookup(&config, &cmd).await,
        Command::Dashboard(cmd) => handle_dashboard(&config, &cmd).await,
        Command::Wallet(cmd) => handle_wallet(&config, cmd),
        Command::Codec(cmd) => handle_codec(cmd),
        Command::Faucet => {
            handle_faucet(&config);
            Ok(())
        }
        Command::Config(cmd) => handle_config(&config, &cmd, cli.config),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<LocalStorage> {
    let path = config.database_path();
    LocalStorage::open(&path).with_context(|| format!("opening {}", path.display()))
}

/// Print a successful outcome with `show`, or the failure message on stderr.
fn report<T>(
    outcome: Outcome<T>,
    show: impl FnOnce(T) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    match outcome {
        Outcome::Success(value) => show(value),
        Outcome::Failure(message) => {
            eprintln!("{message}");
            Ok(())
        }
    }
}

async fn handle_mint(config: &Config, cmd: &MintCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let store = CredentialStore::new(&storage);

    let secret = match (&cmd.seed, &cmd.wallet) {
        (Some(seed), _) => seed.clone(),
        (None, Some(selector)) => store.find(&WalletSelector::parse(selector))?.seed,
        (None, None) => bail!("provide --seed or --wallet"),
    };

    if let Some(name) = &cmd.save_as {
        // A seed that won't save still gets its chance to mint
        match store.add(name, &secret) {
            Ok(wallet) => info!("Saved wallet '{}' ({})", wallet.name, wallet.address),
            Err(e) => warn!("Wallet not saved: {}", e),
        }
    }

    let record = cmd.vehicle.to_record();
    let gateway = XrplGateway::from_config(config);
    info!(endpoint = %config.ledger.endpoint, vin = %record.vin, "Minting vehicle NFT");

    let outcome = actions::create_vehicle_nft(&gateway, &record, &secret, cmd.flags()).await;
    report(outcome, |minted| {
        if cmd.json {
            println!("{}", render::to_json(&minted)?);
        } else {
            println!("{minted}");
        }
        Ok(())
    })
}

async fn handle_lookup(config: &Config, cmd: &LookupCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let store = CredentialStore::new(&storage);
    let gateway = XrplGateway::from_config(config);

    let outcome =
        actions::lookup_nft(&gateway, &store, &cmd.nft_id, cmd.account.as_deref()).await;
    report(outcome, |view| {
        if cmd.json {
            println!("{}", render::to_json(&view)?);
        } else {
            println!("{view}");
        }
        Ok(())
    })
}

async fn handle_dashboard(config: &Config, cmd: &DashboardCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let wallet = CredentialStore::new(&storage).find(&WalletSelector::parse(&cmd.wallet))?;
    let gateway = XrplGateway::from_config(config);

    let outcome = actions::load_dashboard(&gateway, &wallet).await;
    report(outcome, |views| {
        if cmd.json {
            println!("{}", render::to_json(&views)?);
        } else {
            println!(
                "{}",
                Dashboard {
                    wallet: &wallet,
                    views: &views,
                }
            );
        }
        Ok(())
    })
}

fn handle_wallet(config: &Config, cmd: WalletCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let store = CredentialStore::new(&storage);

    match cmd {
        WalletCommand::Add { name, seed } => match store.add(&name, &seed) {
            Ok(wallet) => {
                println!("Wallet added successfully!");
                println!("  {}  {}", wallet.name, wallet.address);
            }
            Err(e) if e.is_invalid_secret() => eprintln!("{e}"),
            Err(e) => return Err(e.into()),
        },
        WalletCommand::List { json } => {
            let wallets = store.list()?;
            if json {
                let entries: Vec<_> = wallets
                    .iter()
                    .map(|w| json!({ "name": w.name, "address": w.address }))
                    .collect();
                println!("{}", render::to_json(&entries)?);
            } else {
                println!("{}", WalletList(&wallets));
            }
        }
        WalletCommand::Remove { index } => {
            let removed = store.remove(index)?;
            println!("Removed wallet '{}' ({})", removed.name, removed.address);
        }
    }
    Ok(())
}

fn handle_codec(cmd: CodecCommand) -> anyhow::Result<()> {
    match cmd {
        CodecCommand::Encode { vehicle } => {
            let record = vehicle.to_record();
            record.validate()?;
            println!("{}", codec::encode(&record)?);
        }
        CodecCommand::Decode { uri, json } => {
            let record = codec::decode(&uri);
            if json {
                println!(
                    "{}",
                    render::to_json(&json!({
                        "metadata": record,
                        "uri_text": codec::decode_uri_text(&uri),
                    }))?
                );
            } else if let Some(record) = record {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", render::NO_METADATA_MESSAGE);
                if let Some(text) = codec::decode_uri_text(&uri) {
                    println!("URI text: {text}");
                }
            }
        }
    }
    Ok(())
}

fn handle_faucet(config: &Config) {
    println!("Fund a test account at: {}", config.faucet.url);
    println!("Then save it with: vnft wallet add <NAME> <SEED>");
}

fn handle_config(
    config: &Config,
    cmd: &ConfigCommand,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let ConfigCommand::Show { json } = cmd else {
        handle_config_file(cmd, config_path);
        return Ok(());
    };

    if *json {
        println!("{}", render::to_json(config)?);
    } else {
        println!("Current Configuration");
        println!("=====================");
        println!();
        println!("[Ledger]");
        println!("  Endpoint:           {}", config.ledger.endpoint);
        println!("  Fee (drops):        {}", config.ledger.fee_drops);
        println!("  Last ledger offset: {}", config.ledger.last_ledger_offset);
        println!("  Poll interval (ms): {}", config.ledger.poll_interval_ms);
        println!("  NFT taxon:          {}", config.ledger.nft_taxon);
        println!();
        println!("[Storage]");
        println!("  Database path:      {}", config.database_path().display());
        println!();
        println!("[Faucet]");
        println!("  URL:                {}", config.faucet.url);
    }
    Ok(())
}

/// `config path` and `config validate`, which work without a loaded config.
fn handle_config_file(cmd: &ConfigCommand, config_path: Option<PathBuf>) {
    let path = match cmd {
        ConfigCommand::Validate { file } => file.clone().or(config_path),
        _ => config_path,
    }
    .unwrap_or_else(Config::default_config_path);

    if let ConfigCommand::Validate { .. } = cmd {
        println!("Validating configuration: {}", path.display());
        match Config::load_from(Some(path)) {
            Ok(_) => println!("Configuration is valid."),
            Err(e) => println!("Configuration error: {e}"),
        }
    } else {
        println!("{}", path.display());
    }
}
