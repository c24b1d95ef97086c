//! Human-readable output.

use std::fmt;

use serde::Serialize;
use vehiclenft_ledger::flags;

use crate::actions::{Minted, NftView};
use crate::credentials::SavedWallet;
use crate::error::Result;
use crate::vehicle::VehicleRecord;

/// Shown when a token's URI does not decode to a vehicle record.
pub const NO_METADATA_MESSAGE: &str = "No detailed metadata available for this NFT";

/// Format `n` with comma thousands separators.
#[must_use]
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a mileage reading, e.g. `50,000 km`.
#[must_use]
pub fn format_mileage(km: u64) -> String {
    format!("{} km", format_thousands(km))
}

/// Decoded `NFTokenMint` flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagSummary {
    /// The raw bit value.
    pub raw: u32,
    /// `tfBurnable`.
    pub burnable: bool,
    /// `tfOnlyXRP`.
    pub only_xrp: bool,
    /// `tfTrustLine`.
    pub trust_line: bool,
    /// `tfTransferable`.
    pub transferable: bool,
}

impl FlagSummary {
    /// Decode `raw`.
    #[must_use]
    pub fn from_bits(raw: u32) -> Self {
        Self {
            raw,
            burnable: raw & flags::TF_BURNABLE != 0,
            only_xrp: raw & flags::TF_ONLY_XRP != 0,
            trust_line: raw & flags::TF_TRUST_LINE != 0,
            transferable: raw & flags::TF_TRANSFERABLE != 0,
        }
    }
}

impl fmt::Display for FlagSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}",
            self.raw,
            if self.transferable {
                "Transferable"
            } else {
                "Non-transferable"
            },
            if self.burnable {
                "Burnable"
            } else {
                "Non-burnable"
            },
        )?;
        if self.only_xrp {
            f.write_str(", XRP only")?;
        }
        if self.trust_line {
            f.write_str(", trust line")?;
        }
        f.write_str(")")
    }
}

/// Pretty JSON for `--json` output.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn write_vehicle(f: &mut fmt::Formatter<'_>, record: Option<&VehicleRecord>) -> fmt::Result {
    writeln!(f, "Vehicle Information")?;
    let Some(record) = record else {
        return writeln!(f, "  {NO_METADATA_MESSAGE}");
    };
    writeln!(f, "  VIN:             {}", record.vin)?;
    writeln!(f, "  Brand:           {}", record.brand)?;
    writeln!(f, "  Model:           {}", record.model)?;
    writeln!(f, "  Year:            {}", record.year)?;
    writeln!(f, "  Last inspection: {}", record.last_inspection)?;
    writeln!(f, "  Mileage:         {}", format_mileage(record.mileage))
}

impl fmt::Display for NftView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_vehicle(f, self.metadata.as_ref())?;
        writeln!(f)?;
        writeln!(f, "NFT Details")?;
        writeln!(f, "  NFT ID:          {}", self.token.nftoken_id)?;
        writeln!(f, "  Issuer:          {}", self.token.issuer)?;
        writeln!(f, "  Owner:           {}", self.owner)?;
        writeln!(f, "  Taxon:           {}", self.token.taxon)?;
        writeln!(f, "  Serial:          {}", self.token.nft_serial)?;
        write!(f, "  Flags:           {}", FlagSummary::from_bits(self.token.flags))?;
        if let Some(fee) = self.token.transfer_fee {
            write!(f, "\n  Transfer fee:    {fee}")?;
        }
        if let Some(text) = &self.uri_text {
            write!(f, "\n  URI:             {text}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Minted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        writeln!(f, "  NFT ID:      {}", self.nft_id)?;
        writeln!(f, "  Account:     {}", self.account)?;
        writeln!(f, "  Transaction: {}", self.hash)?;
        if let Some(ledger) = self.ledger_index {
            writeln!(f, "  Ledger:      {ledger}")?;
        }
        writeln!(f)?;
        write!(
            f,
            "View it with: vnft lookup {} --account {}",
            self.nft_id, self.account
        )
    }
}

/// A saved wallet's tokens, for the dashboard.
#[derive(Debug)]
pub struct Dashboard<'a> {
    /// Whose tokens these are.
    pub wallet: &'a SavedWallet,
    /// The tokens.
    pub views: &'a [NftView],
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}'s NFTs", self.wallet.name)?;
        write!(f, "{}", self.wallet.address)?;

        if self.views.is_empty() {
            return write!(f, "\n\nNo NFTs found for this wallet.");
        }

        for view in self.views {
            let flags = FlagSummary::from_bits(view.token.flags);
            write!(f, "\n\n{}", view.token.nftoken_id)?;
            match &view.metadata {
                Some(record) => {
                    write!(f, "\n  {}", record.title())?;
                    write!(f, "\n  VIN:             {}", record.vin)?;
                    write!(f, "\n  Last inspection: {}", record.last_inspection)?;
                    write!(f, "\n  Mileage:         {}", format_mileage(record.mileage))?;
                }
                None => write!(f, "\n  {NO_METADATA_MESSAGE}")?,
            }
            write!(f, "\n  Flags:           {flags}")?;
        }
        Ok(())
    }
}

/// The saved wallet list, numbered for `wallet remove`.
#[derive(Debug)]
pub struct WalletList<'a>(pub &'a [SavedWallet]);

impl fmt::Display for WalletList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No saved wallets. Add one with: vnft wallet add <NAME> <SEED>");
        }
        for (i, wallet) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{i}] {}  {}", wallet.name, wallet.address)?;
        }
        Ok(())
    }
}
