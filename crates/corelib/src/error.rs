//! Error types for the core library.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised while moving a message to or from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The message could not be serialised.
    #[error("encode failed: {0}")]
    Encode(String),
    /// The bytes did not describe a valid message.
    #[error("decode failed: {0}")]
    Decode(String),
    /// The message exceeds the configured size bound.
    #[error("message exceeds the {limit} byte limit")]
    LimitExceeded { limit: u64 },
}
