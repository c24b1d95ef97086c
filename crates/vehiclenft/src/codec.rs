//! Metadata codec.
//!
//! A record travels in a token's `URI` field as
//! `hex(utf8("data:application/json;base64," + base64(json)))`, hex in upper
//! case. Decoding reverses each step and gives up quietly on anything that
//! does not fit, since tokens minted elsewhere carry arbitrary URIs.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::Result;
use crate::vehicle::VehicleRecord;

/// Prefix of the data URI wrapping the base64 JSON.
pub const DATA_URI_PREFIX: &str = "data:application/json;base64,";

/// Encode a record into the hex string stored as the token URI.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized.
pub fn encode(record: &VehicleRecord) -> Result<String> {
    let json = serde_json::to_string(record)?;
    let uri = format!("{DATA_URI_PREFIX}{}", STANDARD.encode(json));
    Ok(hex::encode_upper(uri))
}

/// Recover a record from a token URI.
///
/// Returns `None` when the URI is not hex, not UTF-8, not a JSON data URI,
/// or does not hold a vehicle record.
#[must_use]
pub fn decode(uri_hex: &str) -> Option<VehicleRecord> {
    let text = decode_uri_text(uri_hex)?;
    let payload = text.strip_prefix(DATA_URI_PREFIX)?;
    let json = STANDARD.decode(payload.trim()).ok()?;
    serde_json::from_slice(&json).ok()
}

/// Decode a hex URI to text. Accepts either case and an optional `0x`.
#[must_use]
pub fn decode_uri_text(uri_hex: &str) -> Option<String> {
    let trimmed = uri_hex.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).ok()?;
    String::from_utf8(bytes).ok()
}
