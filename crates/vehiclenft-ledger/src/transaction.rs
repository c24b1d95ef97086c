//! `NFTokenMint` construction and local signing.

use serde::Serialize;

use crate::address;
use crate::binary::{self, FieldId, FieldValue};
use crate::error::{Error, Result};
use crate::keys::{sha512_half, Wallet};

/// `NFTokenMint` flag bits.
pub mod flags {
    /// The issuer (or an authorized account) may burn the token.
    pub const TF_BURNABLE: u32 = 0x0000_0001;
    /// The token may only be traded for XRP.
    pub const TF_ONLY_XRP: u32 = 0x0000_0002;
    /// Automatically create trust lines for transfer fees.
    pub const TF_TRUST_LINE: u32 = 0x0000_0004;
    /// The token may be transferred to accounts other than the issuer.
    pub const TF_TRANSFERABLE: u32 = 0x0000_0008;
}

/// Transaction type code of `NFTokenMint`.
pub const NFTOKEN_MINT_TYPE: u16 = 25;

/// Maximum length of an NFT `URI` in bytes.
pub const MAX_URI_LEN: usize = 256;

/// Prefix hashed ahead of a single-signed transaction's signing fields.
const SIGNING_PREFIX: [u8; 4] = *b"STX\0";

/// Prefix hashed ahead of a signed transaction blob to form its id.
const TRANSACTION_ID_PREFIX: [u8; 4] = *b"TXN\0";

/// An unsigned `NFTokenMint` with every autofilled field resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NfTokenMint {
    /// Minting account.
    pub account: String,
    /// Hex-encoded URI bytes.
    #[serde(rename = "URI", skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// `NFTokenMint` flag bits.
    pub flags: u32,
    /// Issuer-defined taxon.
    #[serde(rename = "NFTokenTaxon")]
    pub taxon: u32,
    /// Transaction cost in drops.
    #[serde(serialize_with = "drops_as_string")]
    pub fee: u64,
    /// Account sequence number.
    pub sequence: u32,
    /// Last ledger in which this transaction may be included.
    pub last_ledger_sequence: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn drops_as_string<S>(drops: &u64, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&drops.to_string())
}

/// A signed transaction ready for `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Uppercase hex of the serialized transaction.
    pub tx_blob: String,
    /// Uppercase hex transaction id.
    pub hash: String,
}

impl NfTokenMint {
    fn fields(
        &self,
        public_key: &[u8],
        signature: Option<&[u8]>,
    ) -> Result<Vec<(FieldId, FieldValue)>> {
        let account = address::decode_address(&self.account)?;

        let mut fields = vec![
            (binary::TRANSACTION_TYPE, FieldValue::UInt16(NFTOKEN_MINT_TYPE)),
            (binary::FLAGS, FieldValue::UInt32(self.flags)),
            (binary::SEQUENCE, FieldValue::UInt32(self.sequence)),
            (
                binary::LAST_LEDGER_SEQUENCE,
                FieldValue::UInt32(self.last_ledger_sequence),
            ),
            (binary::NFTOKEN_TAXON, FieldValue::UInt32(self.taxon)),
            (binary::FEE, FieldValue::Drops(self.fee)),
            (binary::SIGNING_PUB_KEY, FieldValue::Blob(public_key.to_vec())),
            (binary::ACCOUNT, FieldValue::AccountId(account)),
        ];

        if let Some(uri) = &self.uri {
            let bytes = hex::decode(uri)
                .map_err(|e| Error::InvalidTransaction(format!("URI is not hex: {e}")))?;
            if bytes.is_empty() || bytes.len() > MAX_URI_LEN {
                return Err(Error::InvalidTransaction(format!(
                    "URI must be 1 to {MAX_URI_LEN} bytes, got {}",
                    bytes.len()
                )));
            }
            fields.push((binary::URI, FieldValue::Blob(bytes)));
        }

        if let Some(signature) = signature {
            fields.push((binary::TXN_SIGNATURE, FieldValue::Blob(signature.to_vec())));
        }

        Ok(fields)
    }

    /// The bytes a signer signs: `STX\0` followed by every field except
    /// `TxnSignature`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    pub fn signing_payload(&self, public_key: &[u8]) -> Result<Vec<u8>> {
        let body = binary::serialize(&self.fields(public_key, None)?)
            .ok_or_else(|| Error::InvalidTransaction("field value out of range".to_string()))?;
        let mut payload = SIGNING_PREFIX.to_vec();
        payload.extend(body);
        Ok(payload)
    }

    /// Sign with `wallet` and serialize the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet does not own `account`, or if encoding
    /// or signing fails.
    pub fn sign(&self, wallet: &Wallet) -> Result<SignedTransaction> {
        if wallet.address() != self.account {
            return Err(Error::InvalidTransaction(format!(
                "wallet {} cannot sign for account {}",
                wallet.address(),
                self.account
            )));
        }

        let payload = self.signing_payload(wallet.public_key())?;
        let signature = wallet.sign(&payload)?;

        let blob = binary::serialize(&self.fields(wallet.public_key(), Some(&signature))?)
            .ok_or_else(|| Error::InvalidTransaction("field value out of range".to_string()))?;

        let mut hashed = TRANSACTION_ID_PREFIX.to_vec();
        hashed.extend_from_slice(&blob);

        Ok(SignedTransaction {
            tx_blob: hex::encode_upper(&blob),
            hash: hex::encode_upper(sha512_half(&hashed)),
        })
    }
}
