//! Base58Check encoding with the XRPL alphabet.
//!
//! Seeds and classic addresses share one envelope: a version prefix, the
//! payload, and the first four bytes of a double SHA-256 over both.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Version prefix of a classic account address.
pub const ACCOUNT_ID_PREFIX: &[u8] = &[0x00];

/// Version prefix of a secp256k1 family seed.
pub const FAMILY_SEED_PREFIX: &[u8] = &[0x21];

/// Version prefix of an ed25519 seed.
pub const ED25519_SEED_PREFIX: &[u8] = &[0x01, 0xE1, 0x4B];

/// Length of an account id in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;

const CHECKSUM_LEN: usize = 4;

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

/// Encode `payload` behind `version` with a trailing checksum.
#[must_use]
pub fn encode_check(version: &[u8], payload: &[u8]) -> String {
    let mut buf = Vec::with_capacity(version.len() + payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(version);
    buf.extend_from_slice(payload);
    let sum = checksum(&buf);
    buf.extend_from_slice(&sum);
    bs58::encode(buf)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

/// Decode a Base58Check string, returning the bytes between the version
/// prefix and the checksum.
///
/// Returns `None` when the alphabet, length, version or checksum is wrong.
#[must_use]
pub fn decode_check(encoded: &str, version: &[u8], payload_len: usize) -> Option<Vec<u8>> {
    let raw = bs58::decode(encoded)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .ok()?;

    if raw.len() != version.len() + payload_len + CHECKSUM_LEN {
        return None;
    }

    let (body, sum) = raw.split_at(raw.len() - CHECKSUM_LEN);
    if checksum(body) != sum || !body.starts_with(version) {
        return None;
    }

    Some(body[version.len()..].to_vec())
}

/// Hash a public key into its 20-byte account id.
#[must_use]
pub fn account_id(public_key: &[u8]) -> [u8; ACCOUNT_ID_LEN] {
    let sha = Sha256::digest(public_key);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; ACCOUNT_ID_LEN];
    out.copy_from_slice(&ripe);
    out
}

/// Encode an account id as an `r…` classic address.
#[must_use]
pub fn encode_address(account_id: &[u8; ACCOUNT_ID_LEN]) -> String {
    encode_check(ACCOUNT_ID_PREFIX, account_id)
}

/// Decode an `r…` classic address into its account id.
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] when the string is not a valid address.
pub fn decode_address(address: &str) -> Result<[u8; ACCOUNT_ID_LEN]> {
    let bytes = decode_check(address, ACCOUNT_ID_PREFIX, ACCOUNT_ID_LEN)
        .ok_or_else(|| Error::InvalidAddress(address.to_string()))?;
    let mut out = [0u8; ACCOUNT_ID_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Check whether a string is a well-formed classic address.
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}
