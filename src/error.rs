//! Engine error types.

use alloy::primitives::{Bytes, hex};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while assembling engine configuration.
///
/// These are fatal at startup and never surface per query.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The override metadata file could not be read.
    #[error("failed to read override metadata at {path}: {source}")]
    OverrideUnreadable {
        /// Path of the metadata file.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The override metadata file is not valid JSON.
    #[error("override metadata at {path} is not valid JSON: {source}")]
    OverrideMalformed {
        /// Path of the metadata file.
        path: String,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The override metadata carries no bytecode entry.
    #[error("override metadata at {path} has no `{key}` entry")]
    OverrideCodeMissing {
        /// Path of the metadata file.
        path: String,
        /// The JSON key that was expected.
        key: &'static str,
    },
    /// The override bytecode is not valid hex.
    #[error("override bytecode at {path} is not valid hex: {source}")]
    OverrideCodeInvalid {
        /// Path of the metadata file.
        path: String,
        /// Underlying hex failure.
        #[source]
        source: hex::FromHexError,
    },
}

/// Errors that fail an entire batched exchange.
///
/// Nothing partial survives one of these; `eth_call` is idempotent, so the
/// caller may retry the whole batch.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP exchange itself failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The node answered with a non-success status.
    #[error("http status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },
    /// The response body was not a JSON-RPC batch.
    #[error("invalid batch response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    /// The exchange did not complete in time.
    #[error("rpc batch timed out after {timeout:?}")]
    Timeout {
        /// The configured timeout.
        timeout: Duration,
    },
}

/// Per-query failure occupying a single output slot.
///
/// A failed query never disturbs its siblings: every input index resolves
/// to exactly one balance or one of these.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CallError {
    /// The call reverted inside the aggregate. Carries the raw revert data.
    #[error("call failed on chain")]
    Failed(Bytes),
    /// Return data did not decode.
    #[error("decode failed: {0}")]
    Decode(String),
    /// The aggregate answered with a different member count than was sent.
    #[error("expected {expected} member results, got {actual}")]
    UnexpectedResultCount {
        /// Members sent.
        expected: usize,
        /// Members answered.
        actual: usize,
    },
    /// No response carried the request id.
    #[error("no response for request id {0}")]
    MissingResponse(u64),
    /// The node answered the request with an error object.
    #[error("node error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
}

/// Whole-call failures of the read pipeline.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// A request could not be serialized. Raised before any network
    /// activity.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    /// The batched exchange failed as a unit.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A block group failed while group isolation is disabled.
    #[error("group for block {block} failed: {source}")]
    Group {
        /// Block number of the failed group.
        block: u64,
        /// The failure every member of the group hit.
        #[source]
        source: CallError,
    },
}
