//! User actions: mint, lookup, dashboard.
//!
//! Each action opens one ledger session, does its work, closes the session,
//! and reports an [`Outcome`]. Failures never escape an action; they come
//! back as the message the user sees.

use serde::Serialize;
use tracing::{debug, info, warn};
use vehiclenft_ledger::transaction::MAX_URI_LEN;
use vehiclenft_ledger::{AccountNft, Wallet};

use crate::codec;
use crate::credentials::{CredentialStore, SavedWallet};
use crate::error::{Error, Result};
use crate::ledger::{Gateway, LedgerSession, MintRequest};
use crate::vehicle::VehicleRecord;

/// Message shown after a successful mint.
pub const CREATED_MESSAGE: &str = "NFT created successfully!";

/// Message shown when lookup is asked for nothing.
pub const MISSING_ID_MESSAGE: &str = "Please enter an NFT ID";

/// Result of a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The action completed.
    Success(T),
    /// The action failed; the message is ready for display.
    Failure(String),
}

impl<T> Outcome<T> {
    /// Whether the action completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure message, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }
}

/// A freshly minted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Minted {
    /// Confirmation text.
    pub message: String,
    /// Id of the new token.
    pub nft_id: String,
    /// Minting transaction id.
    pub hash: String,
    /// Ledger that included the mint.
    pub ledger_index: Option<u32>,
    /// Account that minted and holds the token.
    pub account: String,
}

/// A token together with who holds it and what it says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftView {
    /// The ledger's view of the token.
    pub token: AccountNft,
    /// The account the token was found in.
    pub owner: String,
    /// Decoded vehicle record, when the URI carries one.
    pub metadata: Option<VehicleRecord>,
    /// The URI as text, when it is valid UTF-8.
    pub uri_text: Option<String>,
}

impl NftView {
    /// Build a view, decoding the URI if present.
    #[must_use]
    pub fn new(token: AccountNft, owner: impl Into<String>) -> Self {
        let metadata = token.uri.as_deref().and_then(codec::decode);
        let uri_text = token.uri.as_deref().and_then(codec::decode_uri_text);
        Self {
            token,
            owner: owner.into(),
            metadata,
            uri_text,
        }
    }
}

/// Mint `record` as a token owned by the account behind `secret`.
pub async fn create_vehicle_nft(
    gateway: &dyn Gateway,
    record: &VehicleRecord,
    secret: &str,
    flags: u32,
) -> Outcome<Minted> {
    match mint(gateway, record, secret, flags).await {
        Ok(minted) => Outcome::Success(minted),
        Err(e) => {
            warn!("Mint failed: {}", e);
            Outcome::Failure(format!("Failed to create NFT: {e}"))
        }
    }
}

async fn mint(
    gateway: &dyn Gateway,
    record: &VehicleRecord,
    secret: &str,
    flags: u32,
) -> Result<Minted> {
    record.validate()?;
    let wallet = Wallet::from_seed(secret)?;
    let uri = codec::encode(record)?;
    let uri_len = uri.len() / 2;
    if uri_len > MAX_URI_LEN {
        return Err(Error::invalid_vehicle(
            "record",
            format!("encodes to {uri_len} bytes, more than the {MAX_URI_LEN} a token URI holds"),
        ));
    }
    let request = MintRequest { uri, flags };

    let mut session = gateway.connect().await?;
    let result = session.mint(&wallet, &request).await;
    close(session).await;
    let receipt = result?;

    info!(nft_id = %receipt.nft_id, vin = %record.vin, "Vehicle NFT created");
    Ok(Minted {
        message: CREATED_MESSAGE.to_string(),
        nft_id: receipt.nft_id,
        hash: receipt.hash,
        ledger_index: receipt.ledger_index,
        account: wallet.address().to_string(),
    })
}

/// Find token `nft_id`, searching `account` first and then every saved
/// wallet.
pub async fn lookup_nft(
    gateway: &dyn Gateway,
    store: &CredentialStore<'_>,
    nft_id: &str,
    account: Option<&str>,
) -> Outcome<NftView> {
    let nft_id = nft_id.trim();
    if nft_id.is_empty() {
        return Outcome::Failure(MISSING_ID_MESSAGE.to_string());
    }

    match lookup(gateway, store, nft_id, account).await {
        Ok(view) => Outcome::Success(view),
        Err(e) => Outcome::Failure(format!("Failed to lookup NFT: {e}")),
    }
}

async fn lookup(
    gateway: &dyn Gateway,
    store: &CredentialStore<'_>,
    nft_id: &str,
    account: Option<&str>,
) -> Result<NftView> {
    let mut candidates: Vec<String> = Vec::new();
    if let Some(account) = account.map(str::trim).filter(|a| !a.is_empty()) {
        candidates.push(account.to_string());
    }
    for address in store.addresses()? {
        if !candidates.contains(&address) {
            candidates.push(address);
        }
    }

    let mut session = gateway.connect().await?;
    let found = search(session.as_mut(), nft_id, &candidates).await;
    close(session).await;

    found.ok_or(Error::NftNotFound)
}

async fn search(
    session: &mut dyn LedgerSession,
    nft_id: &str,
    accounts: &[String],
) -> Option<NftView> {
    for account in accounts {
        match session.account_nfts(account).await {
            Ok(nfts) => {
                if let Some(token) = nfts
                    .into_iter()
                    .find(|nft| nft.nftoken_id.eq_ignore_ascii_case(nft_id))
                {
                    debug!(nft_id, account = %account, "Found NFT");
                    return Some(NftView::new(token, account.as_str()));
                }
            }
            // An unreadable account just doesn't hold the token
            Err(e) => debug!(account = %account, "Skipping account: {}", e),
        }
    }
    None
}

/// Every token held by `wallet`, decoded.
pub async fn load_dashboard(gateway: &dyn Gateway, wallet: &SavedWallet) -> Outcome<Vec<NftView>> {
    match dashboard(gateway, &wallet.address).await {
        Ok(views) => Outcome::Success(views),
        Err(e) => Outcome::Failure(format!("Failed to load NFTs: {e}")),
    }
}

async fn dashboard(gateway: &dyn Gateway, address: &str) -> Result<Vec<NftView>> {
    let mut session = gateway.connect().await?;
    let result = session.account_nfts(address).await;
    close(session).await;

    Ok(result?
        .into_iter()
        .map(|token| NftView::new(token, address))
        .collect())
}

async fn close(session: Box<dyn LedgerSession>) {
    if let Err(e) = session.disconnect().await {
        warn!("Error closing ledger session: {}", e);
    }
}
