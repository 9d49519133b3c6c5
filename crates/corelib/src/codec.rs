//! Codec boundary.
//!
//! The transport never looks inside a payload; it hands messages to a
//! `Codec` and moves the resulting bytes. Swapping the codec changes the wire
//! format without touching the sender or the dispatcher.

use crate::error::{CodecError, Result};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default bound on a single encoded message (64 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: u64 = 64 * 1024 * 1024;

/// Encodes and decodes messages for the wire.
///
/// Codecs are shared by every concurrent call on a transport, so they must be
/// cheap to clone and free of interior mutability.
pub trait Codec: Clone + Send + Sync + 'static {
    /// Media type sent as `Content-Type` on outbound requests and replies.
    fn content_type(&self) -> &'static str;

    /// Serialise `message` into a fresh buffer.
    fn encode<M: Serialize>(&self, message: &M) -> Result<Vec<u8>>;

    /// Deserialise a complete message from `bytes`.
    fn decode<M: DeserializeOwned>(&self, bytes: &[u8]) -> Result<M>;
}

/// Compact binary codec backed by `bincode`.
///
/// Uses variable-length integers and rejects trailing bytes, so a truncated or
/// padded body is reported as a decode failure instead of being half-read.
#[derive(Clone, Copy, Debug)]
pub struct BincodeCodec {
    limit: u64,
}

impl BincodeCodec {
    pub const CONTENT_TYPE: &'static str = "application/x-bincode";

    /// Codec with the default size bound.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Codec that refuses to encode or decode messages larger than `limit` bytes.
    pub fn with_limit(limit: u64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new().with_limit(self.limit)
    }

    fn classify(&self, err: bincode::Error, decoding: bool) -> CodecError {
        match *err {
            bincode::ErrorKind::SizeLimit => CodecError::LimitExceeded { limit: self.limit },
            other if decoding => CodecError::Decode(other.to_string()),
            other => CodecError::Encode(other.to_string()),
        }
    }
}

impl Default for BincodeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for BincodeCodec {
    fn content_type(&self) -> &'static str {
        Self::CONTENT_TYPE
    }

    fn encode<M: Serialize>(&self, message: &M) -> Result<Vec<u8>> {
        self.options()
            .serialize(message)
            .map_err(|err| self.classify(err, false))
    }

    fn decode<M: DeserializeOwned>(&self, bytes: &[u8]) -> Result<M> {
        // bincode only enforces its limit while writing or reading from a stream.
        if bytes.len() as u64 > self.limit {
            return Err(CodecError::LimitExceeded { limit: self.limit });
        }
        self.options()
            .deserialize(bytes)
            .map_err(|err| self.classify(err, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{
        AppendEntriesRequest, LogEntry, RequestVoteResponse, SnapshotRecoveryRequest,
    };

    #[test]
    fn test_encode_decode() {
        let codec = BincodeCodec::new();
        let request = AppendEntriesRequest {
            term: 5,
            leader_name: "A".into(),
            entries: vec![LogEntry {
                index: 1,
                term: 5,
                command_name: "set".into(),
                command: vec![1, 2],
            }],
            ..Default::default()
        };

        let bytes = codec.encode(&request).unwrap();
        let decoded: AppendEntriesRequest = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_limit_exceeded_on_encode() {
        let codec = BincodeCodec::with_limit(8);
        let request = AppendEntriesRequest {
            leader_name: "a-very-long-leader-name".into(),
            ..Default::default()
        };

        assert_eq!(codec.encode(&request), Err(CodecError::LimitExceeded { limit: 8 }));
    }

    #[test]
    fn test_limit_exceeded_on_decode() {
        let request = SnapshotRecoveryRequest {
            leader_name: "A".into(),
            state: vec![7; 1024],
            ..Default::default()
        };
        let bytes = BincodeCodec::new().encode(&request).unwrap();

        let bounded = BincodeCodec::with_limit(64);
        let result: Result<SnapshotRecoveryRequest> = bounded.decode(&bytes);
        assert_eq!(result, Err(CodecError::LimitExceeded { limit: 64 }));

        let exact = BincodeCodec::with_limit(bytes.len() as u64);
        let decoded: SnapshotRecoveryRequest = exact.decode(&bytes).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_empty_buffer_is_decode_error() {
        let codec = BincodeCodec::new();
        let result: Result<RequestVoteResponse> = codec.decode(&[]);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let codec = BincodeCodec::new();
        let response = RequestVoteResponse {
            term: 3,
            vote_granted: true,
        };
        let mut bytes = codec.encode(&response).unwrap();
        bytes.push(0xff);

        let result: Result<RequestVoteResponse> = codec.decode(&bytes);
        assert!(result.is_err());
    }
}
