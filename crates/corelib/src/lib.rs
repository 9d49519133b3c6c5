//! Core library for the Raft HTTP transport.
//!
//! This crate provides the protocol vocabulary shared across the workspace:
//! - Peer addressing
//! - The four RPC kinds and their request/response messages
//! - The codec boundary used to put messages on the wire
//! - The consensus engine contract the transport calls into

pub mod codec;
pub mod error;
pub mod message;
pub mod network;
pub mod peer;

pub use codec::{BincodeCodec, Codec};
pub use error::{CodecError, Result};
pub use message::{
    AppendEntriesRequest, AppendEntriesResponse, LogEntry, Message, RequestVoteRequest,
    RequestVoteResponse, RpcKind, SnapshotPeer, SnapshotRecoveryRequest,
    SnapshotRecoveryResponse, SnapshotRequest, SnapshotResponse,
};
pub use network::{AppendEntries, ConsensusEngine, RequestVote, Rpc, Snapshot, SnapshotRecovery};
pub use peer::Peer;
