//! Transport-agnostic RPC contracts.
//!
//! `ConsensusEngine` is the narrow view of the consensus module the transport
//! needs: one synchronous handler per RPC kind, the live election timeout,
//! and a name for diagnostics. `Rpc` binds a kind to its message types and
//! to the engine operation that serves it, so senders and handlers can be
//! written once and instantiated per kind.

use crate::message::{
    AppendEntriesRequest, AppendEntriesResponse, Message, RequestVoteRequest,
    RequestVoteResponse, RpcKind, SnapshotRecoveryRequest, SnapshotRecoveryResponse,
    SnapshotRequest, SnapshotResponse,
};
use std::time::Duration;

/// The local consensus engine, as seen by the transport.
///
/// # Thread Safety
///
/// Inbound handlers run concurrently with each other and with outbound
/// sends, so implementations must be `Send + Sync` and do their own locking.
pub trait ConsensusEngine: Send + Sync + 'static {
    /// Name of the local server, used in logs only.
    fn name(&self) -> &str;

    /// Current election timeout.
    ///
    /// Read on every `AppendEntries` send and used as that call's deadline, so
    /// changes take effect on the next call.
    fn election_timeout(&self) -> Duration;

    fn handle_append_entries(&self, request: AppendEntriesRequest) -> AppendEntriesResponse;

    fn handle_request_vote(&self, request: RequestVoteRequest) -> RequestVoteResponse;

    fn handle_snapshot(&self, request: SnapshotRequest) -> SnapshotResponse;

    fn handle_snapshot_recovery(
        &self,
        request: SnapshotRecoveryRequest,
    ) -> SnapshotRecoveryResponse;
}

/// Static description of one RPC kind.
pub trait Rpc: Send + Sync + 'static {
    /// Which kind this is; selects the path.
    const KIND: RpcKind;

    type Request: Message;
    type Response: Message;

    /// Invoke the engine operation that serves this kind.
    fn dispatch<E: ConsensusEngine + ?Sized>(engine: &E, request: Self::Request) -> Self::Response;
}

/// `AppendEntries`: log replication and heartbeats.
#[derive(Debug, Clone, Copy)]
pub struct AppendEntries;

/// `RequestVote`: leader election.
#[derive(Debug, Clone, Copy)]
pub struct RequestVote;

/// `Snapshot`: snapshot announcement.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot;

/// `SnapshotRecovery`: snapshot state transfer.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotRecovery;

impl Rpc for AppendEntries {
    const KIND: RpcKind = RpcKind::AppendEntries;
    type Request = AppendEntriesRequest;
    type Response = AppendEntriesResponse;

    fn dispatch<E: ConsensusEngine + ?Sized>(engine: &E, request: Self::Request) -> Self::Response {
        engine.handle_append_entries(request)
    }
}

impl Rpc for RequestVote {
    const KIND: RpcKind = RpcKind::RequestVote;
    type Request = RequestVoteRequest;
    type Response = RequestVoteResponse;

    fn dispatch<E: ConsensusEngine + ?Sized>(engine: &E, request: Self::Request) -> Self::Response {
        engine.handle_request_vote(request)
    }
}

impl Rpc for Snapshot {
    const KIND: RpcKind = RpcKind::Snapshot;
    type Request = SnapshotRequest;
    type Response = SnapshotResponse;

    fn dispatch<E: ConsensusEngine + ?Sized>(engine: &E, request: Self::Request) -> Self::Response {
        engine.handle_snapshot(request)
    }
}

impl Rpc for SnapshotRecovery {
    const KIND: RpcKind = RpcKind::SnapshotRecovery;
    type Request = SnapshotRecoveryRequest;
    type Response = SnapshotRecoveryResponse;

    fn dispatch<E: ConsensusEngine + ?Sized>(engine: &E, request: Self::Request) -> Self::Response {
        engine.handle_snapshot_recovery(request)
    }
}
