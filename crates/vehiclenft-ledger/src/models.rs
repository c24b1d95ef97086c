//! Response shapes for the requests this client issues.

use serde::{Deserialize, Serialize};

/// One entry of an `account_nfts` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNft {
    /// The token identifier.
    #[serde(rename = "NFTokenID")]
    pub nftoken_id: String,
    /// The issuing account.
    #[serde(rename = "Issuer")]
    pub issuer: String,
    /// Flag bits set at mint time.
    #[serde(rename = "Flags", default)]
    pub flags: u32,
    /// Hex-encoded content reference.
    #[serde(rename = "URI", default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Issuer-defined taxon.
    #[serde(rename = "NFTokenTaxon", default)]
    pub taxon: u32,
    /// Issuer-scoped serial number.
    #[serde(default)]
    pub nft_serial: u32,
    /// Secondary sale fee in 1/100,000 units.
    #[serde(
        rename = "TransferFee",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transfer_fee: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountNftsResult {
    #[serde(default)]
    pub account_nfts: Vec<AccountNft>,
    #[serde(default)]
    pub marker: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountInfoResult {
    pub account_data: AccountRoot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AccountRoot {
    pub sequence: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LedgerCurrentResult {
    pub ledger_current_index: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LedgerResult {
    pub ledger_index: u32,
}

/// Preliminary result of a `submit` request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResult {
    /// Engine result code, e.g. `tesSUCCESS`.
    pub engine_result: String,
    /// Human readable description of the code.
    #[serde(default)]
    pub engine_result_message: String,
}

impl SubmitResult {
    /// Whether the code means the transaction can never succeed as sent.
    ///
    /// Malformed (`tem`), failed (`tef`) and local (`tel`) codes are final;
    /// `tes`, `ter` and `tec` may still end up in a validated ledger.
    #[must_use]
    pub fn is_final_rejection(&self) -> bool {
        ["tem", "tef", "tel"]
            .iter()
            .any(|prefix| self.engine_result.starts_with(prefix))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TxResult {
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub ledger_index: Option<u32>,
    #[serde(default)]
    pub meta: Option<TxMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TxMeta {
    #[serde(rename = "TransactionResult")]
    pub transaction_result: String,
    #[serde(default)]
    pub nftoken_id: Option<String>,
}

/// Outcome of a validated transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransaction {
    /// Transaction id.
    pub hash: String,
    /// Ledger that included the transaction.
    pub ledger_index: Option<u32>,
    /// Token id reported by the server for an `NFTokenMint`, if any.
    pub nftoken_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_nft_deserialize() {
        let json = r#"{
            "Flags": 8,
            "Issuer": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
            "NFTokenID": "000800005AB1",
            "NFTokenTaxon": 0,
            "URI": "ABCD",
            "nft_serial": 3
        }"#;
        let nft: AccountNft = serde_json::from_str(json).unwrap();
        assert_eq!(nft.flags, 8);
        assert_eq!(nft.uri.as_deref(), Some("ABCD"));
        assert_eq!(nft.nft_serial, 3);
        assert!(nft.transfer_fee.is_none());
    }

    #[test]
    fn test_account_nft_without_uri() {
        let json = r#"{"Flags": 0, "Issuer": "r1", "NFTokenID": "00"}"#;
        let nft: AccountNft = serde_json::from_str(json).unwrap();
        assert!(nft.uri.is_none());

        let back = serde_json::to_value(&nft).unwrap();
        assert!(back.get("URI").is_none());
    }

    #[test]
    fn test_final_rejection_codes() {
        let result = |code: &str| SubmitResult {
            engine_result: code.to_string(),
            engine_result_message: String::new(),
        };
        assert!(result("temMALFORMED").is_final_rejection());
        assert!(result("tefPAST_SEQ").is_final_rejection());
        assert!(result("telINSUF_FEE_P").is_final_rejection());
        assert!(!result("tesSUCCESS").is_final_rejection());
        assert!(!result("terQUEUED").is_final_rejection());
        assert!(!result("tecNO_PERMISSION").is_final_rejection());
    }

    #[test]
    fn test_tx_meta_with_nftoken_id() {
        let json = r#"{
            "validated": true,
            "ledger_index": 99,
            "meta": {"TransactionResult": "tesSUCCESS", "nftoken_id": "0008"}
        }"#;
        let tx: TxResult = serde_json::from_str(json).unwrap();
        assert!(tx.validated);
        assert_eq!(tx.ledger_index, Some(99));
        assert_eq!(tx.meta.unwrap().nftoken_id.as_deref(), Some("0008"));
    }

    #[test]
    fn test_validated_ledger_index() {
        let json = r#"{"ledger": {"ledger_index": "100"}, "ledger_index": 100, "validated": true}"#;
        let result: LedgerResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.ledger_index, 100);
    }
}
