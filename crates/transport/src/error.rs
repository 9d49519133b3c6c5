//! Error types for the transport.

use corelib::CodecError;
use http::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Configuration-level problems with an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer's connection string is not a usable base URL.
    #[error("invalid peer address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// Why an outbound call produced no response.
///
/// Carried for logging only. Callers are expected to treat every variant the
/// same way: the peer did not answer.
#[derive(Debug, Error)]
pub enum NoResponse {
    /// The request could not be encoded. Points at a local bug.
    #[error("request encoding failed: {0}")]
    Encode(#[source] CodecError),
    #[error(transparent)]
    Address(#[from] TransportError),
    /// Connection refused, reset, DNS failure and the like.
    #[error("request failed: {0}")]
    Request(#[source] hyper_util::client::legacy::Error),
    /// The call's deadline expired before the exchange completed.
    #[error("no response within {0:?}")]
    Timeout(Duration),
    /// The peer answered with a non-success status.
    #[error("peer replied with status {0}")]
    Status(StatusCode),
    /// The response body could not be read in full.
    #[error("reading response body failed: {0}")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The response body is not a valid message of the expected kind.
    #[error("response decoding failed: {0}")]
    Decode(#[source] CodecError),
}

impl NoResponse {
    /// True when the failure happened before anything reached the network.
    pub fn is_local(&self) -> bool {
        matches!(self, NoResponse::Encode(_) | NoResponse::Address(_))
    }

    /// True when the peer was reached but its answer was unusable.
    pub fn is_remote(&self) -> bool {
        matches!(self, NoResponse::Status(_) | NoResponse::Body(_) | NoResponse::Decode(_))
    }
}
