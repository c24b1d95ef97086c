//! The ledger as seen by user actions.
//!
//! Actions talk to a [`Gateway`], which hands out one [`LedgerSession`] per
//! action. [`XrplGateway`] is the real implementation over
//! `vehiclenft_ledger`; tests substitute their own.

use std::time::Duration;

use tracing::{debug, info};
use vehiclenft_ledger::{AccountNft, Client, MintParams, Wallet};

use crate::config::Config;
use crate::error::{Error, Result};

/// What to mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    /// Hex-encoded URI.
    pub uri: String,
    /// `NFTokenMint` flag bits.
    pub flags: u32,
}

/// A validated mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    /// Id of the new token.
    pub nft_id: String,
    /// Transaction id.
    pub hash: String,
    /// Ledger that included the transaction.
    pub ledger_index: Option<u32>,
}

/// Opens sessions against a ledger.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Where sessions connect, for messages and logs.
    fn endpoint(&self) -> &str;

    /// Open a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be reached.
    async fn connect(&self) -> Result<Box<dyn LedgerSession>>;
}

/// One open connection to a ledger.
#[async_trait::async_trait]
pub trait LedgerSession: Send {
    /// Every token held by `account`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the account does not exist.
    async fn account_nfts(&mut self, account: &str) -> Result<Vec<AccountNft>>;

    /// Mint a token for `wallet` and wait for validation.
    ///
    /// # Errors
    ///
    /// Returns an error if submission fails, the transaction fails, or it
    /// expires before validation.
    async fn mint(&mut self, wallet: &Wallet, request: &MintRequest) -> Result<MintReceipt>;

    /// Close the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails.
    async fn disconnect(self: Box<Self>) -> Result<()>;
}

/// Transaction settings applied to every mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintSettings {
    /// Fee in drops.
    pub fee_drops: u64,
    /// Ledgers of validity past the current one.
    pub last_ledger_offset: u32,
    /// Taxon given to minted tokens.
    pub taxon: u32,
    /// Delay between validation checks.
    pub poll_interval: Duration,
}

impl From<&Config> for MintSettings {
    fn from(config: &Config) -> Self {
        Self {
            fee_drops: config.ledger.fee_drops,
            last_ledger_offset: config.ledger.last_ledger_offset,
            taxon: config.ledger.nft_taxon,
            poll_interval: config.poll_interval(),
        }
    }
}

/// Gateway to an XRPL server over WebSocket.
#[derive(Debug, Clone)]
pub struct XrplGateway {
    endpoint: String,
    settings: MintSettings,
}

impl XrplGateway {
    /// Create a gateway for `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, settings: MintSettings) -> Self {
        Self {
            endpoint: endpoint.into(),
            settings,
        }
    }

    /// Create a gateway from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ledger.endpoint.clone(), MintSettings::from(config))
    }

    /// Settings applied to mints.
    #[must_use]
    pub fn settings(&self) -> &MintSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl Gateway for XrplGateway {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn connect(&self) -> Result<Box<dyn LedgerSession>> {
        let client = Client::connect(&self.endpoint).await?;
        Ok(Box::new(XrplSession {
            client,
            settings: self.settings.clone(),
        }))
    }
}

/// A live connection to an XRPL server.
#[derive(Debug)]
pub struct XrplSession {
    client: Client,
    settings: MintSettings,
}

#[async_trait::async_trait]
impl LedgerSession for XrplSession {
    async fn account_nfts(&mut self, account: &str) -> Result<Vec<AccountNft>> {
        Ok(self.client.account_nfts(account).await?)
    }

    async fn mint(&mut self, wallet: &Wallet, request: &MintRequest) -> Result<MintReceipt> {
        let params = MintParams {
            uri: Some(request.uri.clone()),
            flags: request.flags,
            taxon: self.settings.taxon,
            fee_drops: self.settings.fee_drops,
            last_ledger_offset: self.settings.last_ledger_offset,
        };

        let tx = self.client.autofill_mint(wallet.address(), &params).await?;
        let validated = self
            .client
            .submit_and_wait(&tx, wallet, self.settings.poll_interval)
            .await?;

        let nft_id = if let Some(id) = validated.nftoken_id {
            id
        } else {
            // Older servers omit nftoken_id from metadata; newest token is last
            debug!("No nftoken_id in metadata, reading account_nfts");
            self.client
                .account_nfts(wallet.address())
                .await?
                .pop()
                .map(|nft| nft.nftoken_id)
                .ok_or_else(|| Error::MintedTokenMissing {
                    account: wallet.address().to_string(),
                })?
        };

        info!(nft_id = %nft_id, hash = %validated.hash, "Minted NFT");
        Ok(MintReceipt {
            nft_id,
            hash: validated.hash,
            ledger_index: validated.ledger_index,
        })
    }

    async fn disconnect(self: Box<Self>) -> Result<()> {
        Ok(self.client.disconnect().await?)
    }
}
