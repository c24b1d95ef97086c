//! JSON-over-WebSocket client.
//!
//! One [`Client`] is one connection. Requests are sent one at a time and the
//! reader skips any message whose `id` does not match the pending request,
//! so unsolicited stream messages never confuse a response.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::keys::Wallet;
use crate::models::{
    AccountInfoResult, AccountNft, AccountNftsResult, LedgerCurrentResult, LedgerResult,
    SubmitResult, TxResult, ValidatedTransaction,
};
use crate::transaction::NfTokenMint;

/// Page size requested from `account_nfts`.
const ACCOUNT_NFTS_LIMIT: u32 = 400;

/// Fields left to the server when building an `NFTokenMint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintParams {
    /// Hex-encoded URI.
    pub uri: Option<String>,
    /// Flag bits.
    pub flags: u32,
    /// Issuer-defined taxon.
    pub taxon: u32,
    /// Fee in drops.
    pub fee_drops: u64,
    /// Ledgers past the current one before the transaction expires.
    pub last_ledger_offset: u32,
}

/// A connection to a ledger server.
pub struct Client {
    endpoint: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

/// Match a raw message against the pending request id.
///
/// Returns `None` for messages addressed elsewhere, otherwise the `result`
/// object or the server's error.
fn parse_response(raw: &str, expected_id: u64) -> Option<Result<Value>> {
    let mut message: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return Some(Err(e.into())),
    };

    if message.get("id").and_then(Value::as_u64) != Some(expected_id) {
        return None;
    }

    if message.get("status").and_then(Value::as_str) == Some("error") {
        let error = message
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let text = message
            .get("error_message")
            .and_then(Value::as_str)
            .unwrap_or(&error)
            .to_string();
        return Some(Err(Error::Rpc {
            error,
            message: text,
        }));
    }

    Some(
        message
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| Error::unexpected("response without result")),
    )
}

impl Client {
    /// Open a connection to `endpoint` (`ws://` or `wss://`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the handshake fails.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        debug!(endpoint, "Connecting to ledger");
        let (stream, _response) =
            tokio_tungstenite::connect_async(endpoint)
                .await
                .map_err(|e| Error::Connect {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                })?;
        info!(endpoint, "Connected to ledger");

        Ok(Self {
            endpoint: endpoint.to_string(),
            stream,
            next_id: 1,
        })
    }

    /// The endpoint this client is connected to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one command and wait for its response.
    ///
    /// `params` must be a JSON object; its fields are merged next to
    /// `command` and `id`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, on a server error response,
    /// or if the connection closes first.
    pub async fn request(&mut self, command: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let mut body = match params {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(Error::unexpected(format!(
                    "request params must be an object, got {other}"
                )))
            }
        };
        body.insert("id".to_string(), json!(id));
        body.insert("command".to_string(), json!(command));

        trace!(id, command, "Sending request");
        self.stream
            .send(Message::Text(Value::Object(body).to_string()))
            .await?;

        while let Some(message) = self.stream.next().await {
            match message? {
                Message::Text(text) => {
                    if let Some(result) = parse_response(&text, id) {
                        trace!(id, command, ok = result.is_ok(), "Received response");
                        return result;
                    }
                }
                Message::Close(_) => return Err(Error::ConnectionClosed),
                _ => {}
            }
        }
        Err(Error::ConnectionClosed)
    }

    async fn request_as<T: DeserializeOwned>(&mut self, command: &str, params: Value) -> Result<T> {
        let result = self.request(command, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Current sequence number of `account`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (e.g. `actNotFound`).
    pub async fn account_sequence(&mut self, account: &str) -> Result<u32> {
        let info: AccountInfoResult = self
            .request_as(
                "account_info",
                json!({ "account": account, "ledger_index": "current" }),
            )
            .await?;
        Ok(info.account_data.sequence)
    }

    /// Index of the current open ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn ledger_current(&mut self) -> Result<u32> {
        let result: LedgerCurrentResult = self.request_as("ledger_current", json!({})).await?;
        Ok(result.ledger_current_index)
    }

    /// Index of the most recent validated ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn ledger_validated(&mut self) -> Result<u32> {
        let result: LedgerResult = self
            .request_as("ledger", json!({ "ledger_index": "validated" }))
            .await?;
        Ok(result.ledger_index)
    }

    /// Every NFT held by `account`, following `marker` pages.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn account_nfts(&mut self, account: &str) -> Result<Vec<AccountNft>> {
        let mut nfts = Vec::new();
        let mut marker: Option<Value> = None;

        loop {
            let mut params = json!({
                "account": account,
                "ledger_index": "validated",
                "limit": ACCOUNT_NFTS_LIMIT,
            });
            if let Some(m) = marker.take() {
                params["marker"] = m;
            }

            let page: AccountNftsResult = self.request_as("account_nfts", params).await?;
            nfts.extend(page.account_nfts);

            match page.marker {
                Some(m) if !m.is_null() => marker = Some(m),
                _ => break,
            }
        }

        debug!(account, count = nfts.len(), "Fetched account NFTs");
        Ok(nfts)
    }

    /// Build an `NFTokenMint` for `account` with `Sequence` and
    /// `LastLedgerSequence` taken from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if either lookup fails.
    pub async fn autofill_mint(&mut self, account: &str, params: &MintParams) -> Result<NfTokenMint> {
        let sequence = self.account_sequence(account).await?;
        let current = self.ledger_current().await?;

        Ok(NfTokenMint {
            account: account.to_string(),
            uri: params.uri.clone(),
            flags: params.flags,
            taxon: params.taxon,
            fee: params.fee_drops,
            sequence,
            last_ledger_sequence: current.saturating_add(params.last_ledger_offset),
        })
    }

    /// Submit a signed blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn submit(&mut self, tx_blob: &str) -> Result<SubmitResult> {
        self.request_as("submit", json!({ "tx_blob": tx_blob })).await
    }

    /// Sign, submit, and wait until the transaction is validated or its
    /// `LastLedgerSequence` has passed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionFailed`] when the preliminary or final
    /// result is a failure and [`Error::TransactionExpired`] when the
    /// transaction can no longer be included.
    pub async fn submit_and_wait(
        &mut self,
        tx: &NfTokenMint,
        wallet: &Wallet,
        poll_interval: Duration,
    ) -> Result<ValidatedTransaction> {
        let signed = tx.sign(wallet)?;
        info!(hash = %signed.hash, account = %tx.account, "Submitting transaction");

        let preliminary = self.submit(&signed.tx_blob).await?;
        debug!(
            hash = %signed.hash,
            engine_result = %preliminary.engine_result,
            "Preliminary result"
        );
        if preliminary.is_final_rejection() {
            return Err(Error::TransactionFailed {
                code: preliminary.engine_result,
            });
        }

        loop {
            tokio::time::sleep(poll_interval).await;

            match self
                .request_as::<TxResult>("tx", json!({ "transaction": signed.hash }))
                .await
            {
                Ok(result) if result.validated => {
                    let meta = result
                        .meta
                        .ok_or_else(|| Error::unexpected("validated transaction without meta"))?;
                    if meta.transaction_result != "tesSUCCESS" {
                        return Err(Error::TransactionFailed {
                            code: meta.transaction_result,
                        });
                    }
                    info!(hash = %signed.hash, ledger = ?result.ledger_index, "Transaction validated");
                    return Ok(ValidatedTransaction {
                        hash: signed.hash,
                        ledger_index: result.ledger_index,
                        nftoken_id: meta.nftoken_id,
                    });
                }
                Ok(_) => {}
                Err(e) if e.is_rpc("txnNotFound") => {}
                Err(e) => return Err(e),
            }

            // Only a validated ledger past the limit rules the transaction out
            let validated = self.ledger_validated().await?;
            if validated > tx.last_ledger_sequence {
                warn!(hash = %signed.hash, validated, "Transaction expired");
                return Err(Error::TransactionExpired {
                    hash: signed.hash,
                    last_ledger_sequence: tx.last_ledger_sequence,
                });
            }
        }
    }

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails.
    pub async fn disconnect(mut self) -> Result<()> {
        debug!(endpoint = %self.endpoint, "Disconnecting from ledger");
        self.stream.close(None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_response_skips_other_ids() {
        assert!(parse_response(r#"{"id": 2, "result": {}}"#, 1).is_none());
        assert!(parse_response(r#"{"type": "ledgerClosed"}"#, 1).is_none());
    }

    #[test]
    fn test_parse_response_success() {
        let result = parse_response(
            r#"{"id": 1, "status": "success", "type": "response", "result": {"x": 5}}"#,
            1,
        )
        .unwrap()
        .unwrap();
        assert_eq!(result["x"], 5);
    }

    #[test]
    fn test_parse_response_error() {
        let err = parse_response(
            r#"{"id": 1, "status": "error", "error": "actNotFound", "error_message": "Account not found."}"#,
            1,
        )
        .unwrap()
        .unwrap_err();
        assert!(err.is_rpc("actNotFound"));
        assert_eq!(err.to_string(), "actNotFound: Account not found.");
    }

    #[test]
    fn test_parse_response_error_without_message() {
        let err = parse_response(r#"{"id": 4, "status": "error", "error": "txnNotFound"}"#, 4)
            .unwrap()
            .unwrap_err();
        assert_eq!(err.to_string(), "txnNotFound: txnNotFound");
    }

    #[test]
    fn test_parse_response_invalid_json() {
        let result = parse_response("not json", 1).unwrap();
        assert!(matches!(result, Err(Error::Json(_))));
    }

    /// Serve one connection, answering each request through `reply`.
    async fn serve<F>(reply: F) -> String
    where
        F: Fn(&Value) -> Vec<Value> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let request: Value = serde_json::from_str(&text).unwrap();
                for out in reply(&request) {
                    ws.send(Message::Text(out.to_string())).await.unwrap();
                }
            }
        });

        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn test_account_nfts_over_websocket() {
        let endpoint = serve(|request| {
            let id = request["id"].clone();
            assert_eq!(request["command"], "account_nfts");
            vec![
                json!({ "type": "ledgerClosed", "ledger_index": 10 }),
                json!({
                    "id": id,
                    "status": "success",
                    "type": "response",
                    "result": {
                        "account": request["account"],
                        "account_nfts": [
                            { "Flags": 8, "Issuer": "rIssuer", "NFTokenID": "AA", "NFTokenTaxon": 0, "nft_serial": 0 }
                        ]
                    }
                }),
            ]
        })
        .await;

        let mut client = Client::connect(&endpoint).await.unwrap();
        let nfts = client.account_nfts("rOwner").await.unwrap();
        assert_eq!(nfts.len(), 1);
        assert_eq!(nfts[0].nftoken_id, "AA");
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_account_nfts_follows_marker() {
        let endpoint = serve(|request| {
            let id = request["id"].clone();
            let result = if request.get("marker").is_none() {
                json!({ "account_nfts": [{ "Issuer": "r1", "NFTokenID": "01" }], "marker": "next" })
            } else {
                json!({ "account_nfts": [{ "Issuer": "r1", "NFTokenID": "02" }] })
            };
            vec![json!({ "id": id, "status": "success", "result": result })]
        })
        .await;

        let mut client = Client::connect(&endpoint).await.unwrap();
        let ids: Vec<String> = client
            .account_nfts("rOwner")
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.nftoken_id)
            .collect();
        assert_eq!(ids, vec!["01", "02"]);
    }

    #[tokio::test]
    async fn test_rpc_error_over_websocket() {
        let endpoint = serve(|request| {
            vec![json!({
                "id": request["id"],
                "status": "error",
                "error": "actNotFound",
                "error_message": "Account not found.",
            })]
        })
        .await;

        let mut client = Client::connect(&endpoint).await.unwrap();
        let err = client.account_nfts("rMissing").await.unwrap_err();
        assert!(err.is_rpc("actNotFound"));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port with no listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = Client::connect(&format!("ws://{addr}")).await.unwrap_err();
        assert!(matches!(err, Error::Connect { .. }));
    }

    const GENESIS_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
    const LAST_LEDGER: u32 = 100;

    /// Canned answers for the commands a mint issues.
    struct MintScript {
        engine_result: &'static str,
        /// Answers to successive `tx` polls; the last one repeats. `Null`
        /// stands for `txnNotFound`.
        tx: Vec<Value>,
        validated_ledger: u32,
    }

    fn success(request: &Value, result: Value) -> Vec<Value> {
        vec![json!({ "id": request["id"], "status": "success", "type": "response", "result": result })]
    }

    /// Serve `script`, returning the endpoint and a count of `tx` polls.
    async fn serve_mint(script: MintScript) -> (String, Arc<AtomicUsize>) {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&polls);

        let endpoint = serve(move |request| match request["command"].as_str() {
            Some("account_info") => success(request, json!({ "account_data": { "Sequence": 7 } })),
            Some("ledger_current") => success(request, json!({ "ledger_current_index": 80 })),
            Some("ledger") => success(
                request,
                json!({ "ledger_index": script.validated_ledger, "validated": true }),
            ),
            Some("submit") => success(
                request,
                json!({ "engine_result": script.engine_result, "engine_result_message": "" }),
            ),
            Some("tx") => {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let answer = &script.tx[n.min(script.tx.len() - 1)];
                if answer.is_null() {
                    vec![json!({ "id": request["id"], "status": "error", "error": "txnNotFound" })]
                } else {
                    success(request, answer.clone())
                }
            }
            other => panic!("unexpected command {other:?}"),
        })
        .await;

        (endpoint, polls)
    }

    fn genesis_mint(wallet: &Wallet) -> NfTokenMint {
        NfTokenMint {
            account: wallet.address().to_string(),
            uri: Some("ABCD".to_string()),
            flags: crate::flags::TF_TRANSFERABLE,
            taxon: 0,
            fee: 12,
            sequence: 7,
            last_ledger_sequence: LAST_LEDGER,
        }
    }

    fn validated(result: &str, nftoken_id: Option<&str>) -> Value {
        json!({
            "validated": true,
            "ledger_index": 99,
            "meta": { "TransactionResult": result, "nftoken_id": nftoken_id },
        })
    }

    async fn run_mint(script: MintScript) -> (Result<ValidatedTransaction>, usize) {
        let (endpoint, polls) = serve_mint(script).await;
        let wallet = Wallet::from_seed(GENESIS_SEED).unwrap();
        let mut client = Client::connect(&endpoint).await.unwrap();
        let result = client
            .submit_and_wait(&genesis_mint(&wallet), &wallet, Duration::from_millis(1))
            .await;
        (result, polls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_autofill_mint_uses_server_values() {
        let (endpoint, _) = serve_mint(MintScript {
            engine_result: "tesSUCCESS",
            tx: vec![Value::Null],
            validated_ledger: 79,
        })
        .await;
        let mut client = Client::connect(&endpoint).await.unwrap();
        let params = MintParams {
            uri: Some("ABCD".to_string()),
            flags: 8,
            taxon: 0,
            fee_drops: 12,
            last_ledger_offset: 20,
        };

        let tx = client.autofill_mint("rOwner", &params).await.unwrap();
        assert_eq!(tx.account, "rOwner");
        assert_eq!(tx.sequence, 7);
        assert_eq!(tx.last_ledger_sequence, 100);
        assert_eq!(tx.fee, 12);
    }

    #[tokio::test]
    async fn test_submit_and_wait_validated() {
        let (result, polls) = run_mint(MintScript {
            engine_result: "tesSUCCESS",
            tx: vec![validated("tesSUCCESS", Some("000800AB"))],
            validated_ledger: 99,
        })
        .await;

        let tx = result.unwrap();
        assert_eq!(tx.nftoken_id.as_deref(), Some("000800AB"));
        assert_eq!(tx.ledger_index, Some(99));
        assert_eq!(tx.hash.len(), 64);
        assert_eq!(polls, 1);
    }

    #[tokio::test]
    async fn test_submit_and_wait_keeps_polling_until_limit_is_validated() {
        // The limit ledger has closed but is not validated yet.
        let (result, polls) = run_mint(MintScript {
            engine_result: "terQUEUED",
            tx: vec![
                json!({ "validated": false }),
                validated("tesSUCCESS", Some("000800AB")),
            ],
            validated_ledger: LAST_LEDGER,
        })
        .await;

        assert_eq!(result.unwrap().nftoken_id.as_deref(), Some("000800AB"));
        assert_eq!(polls, 2);
    }

    #[tokio::test]
    async fn test_submit_and_wait_final_failure() {
        let (result, _) = run_mint(MintScript {
            engine_result: "tesSUCCESS",
            tx: vec![validated("tecINSUFFICIENT_RESERVE", None)],
            validated_ledger: 99,
        })
        .await;

        let err = result.unwrap_err();
        assert!(
            matches!(err, Error::TransactionFailed { ref code } if code == "tecINSUFFICIENT_RESERVE")
        );
    }

    #[tokio::test]
    async fn test_submit_and_wait_preliminary_rejection() {
        for code in ["temMALFORMED", "tefPAST_SEQ", "telINSUF_FEE_P"] {
            let (result, polls) = run_mint(MintScript {
                engine_result: code,
                tx: vec![Value::Null],
                validated_ledger: 99,
            })
            .await;

            assert!(matches!(result, Err(Error::TransactionFailed { code: ref c }) if c == code));
            assert_eq!(polls, 0, "{code} should not be polled");
        }
    }

    #[tokio::test]
    async fn test_submit_and_wait_expires() {
        let (result, polls) = run_mint(MintScript {
            engine_result: "tesSUCCESS",
            tx: vec![Value::Null],
            validated_ledger: LAST_LEDGER + 1,
        })
        .await;

        assert!(matches!(
            result,
            Err(Error::TransactionExpired {
                last_ledger_sequence: LAST_LEDGER,
                ..
            })
        ));
        assert_eq!(polls, 1);
    }

    #[tokio::test]
    async fn test_request_rejects_non_object_params() {
        let endpoint = serve(|_| Vec::new()).await;
        let mut client = Client::connect(&endpoint).await.unwrap();
        let err = client.request("ping", json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }
}
