//! Error types for the ledger client.

use thiserror::Error;

/// The main error type for ledger operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Key Errors ===
    /// The secret could not be decoded as an XRPL seed.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// The string is not a valid classic address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Key derivation or signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    // === Transport Errors ===
    /// Could not open the WebSocket connection.
    #[error("failed to connect to {endpoint}: {message}")]
    Connect {
        /// The endpoint that was dialed.
        endpoint: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The WebSocket failed after it was opened.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The server closed the connection while a request was pending.
    #[error("connection closed by server")]
    ConnectionClosed,

    // === Protocol Errors ===
    /// The server answered a request with an error.
    #[error("{error}: {message}")]
    Rpc {
        /// The short error code, e.g. `actNotFound`.
        error: String,
        /// The human readable message, or the code when none was sent.
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Transaction Errors ===
    /// The transaction could not be built or serialized.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// The transaction was rejected or failed on ledger.
    #[error("transaction failed with {code}")]
    TransactionFailed {
        /// The engine result code, e.g. `tecNO_PERMISSION`.
        code: String,
    },

    /// The transaction was not validated before its last ledger sequence.
    #[error("transaction {hash} expired at ledger {last_ledger_sequence} without validation")]
    TransactionExpired {
        /// The transaction hash.
        hash: String,
        /// The `LastLedgerSequence` that passed.
        last_ledger_sequence: u32,
    },
}

/// A specialized Result type for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid seed error.
    #[must_use]
    pub fn invalid_seed(message: impl Into<String>) -> Self {
        Self::InvalidSeed(message.into())
    }

    /// Create a new unexpected response error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    /// Check if this error is an RPC error with the given code.
    #[must_use]
    pub fn is_rpc(&self, code: &str) -> bool {
        matches!(self, Self::Rpc { error, .. } if error == code)
    }
}
