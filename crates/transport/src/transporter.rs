//! HTTP transporter.
//!
//! `HttpTransport` owns the configuration, the four route paths derived from
//! it, and the pooled client. Outbound, it exposes one send operation per
//! RPC kind. Inbound, [`HttpTransport::install`] binds one handler per kind
//! onto a router. Both directions use the same paths, which is what lets
//! peers running the same prefix find each other.

use crate::config::TransportConfig;
use crate::dialer::Connector;
use crate::dispatcher::RpcHandler;
use crate::mux::Mux;
use crate::outcome::RpcOutcome;
use crate::path::join_path;
use crate::sender::OutboundSender;
use corelib::{
    AppendEntries, AppendEntriesRequest, AppendEntriesResponse, BincodeCodec, Codec,
    ConsensusEngine, Peer, RequestVote, RequestVoteRequest, RequestVoteResponse, Rpc, RpcKind,
    Snapshot, SnapshotRecovery, SnapshotRecoveryRequest, SnapshotRecoveryResponse,
    SnapshotRequest, SnapshotResponse,
};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The four route paths, computed once from the prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcPaths {
    paths: [String; 4],
}

impl RpcPaths {
    /// Derive every kind's path as `prefix` joined with its suffix.
    ///
    /// Paths are always rooted so they can be used as router paths, even
    /// when `prefix` is empty or relative.
    pub fn new(prefix: &str) -> Self {
        Self {
            paths: RpcKind::ALL.map(|kind| join_path(&["/", prefix, kind.path_suffix()])),
        }
    }

    pub fn get(&self, kind: RpcKind) -> &str {
        &self.paths[Self::slot(kind)]
    }

    /// `(kind, path)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (RpcKind, &str)> {
        RpcKind::ALL
            .into_iter()
            .zip(self.paths.iter().map(String::as_str))
    }

    fn slot(kind: RpcKind) -> usize {
        match kind {
            RpcKind::AppendEntries => 0,
            RpcKind::RequestVote => 1,
            RpcKind::Snapshot => 2,
            RpcKind::SnapshotRecovery => 3,
        }
    }
}

/// Raft RPC transport over HTTP.
///
/// Cheap to clone; clones share the connection pool.
///
/// # Concurrency
///
/// Every send takes its deadline as an argument rather than mutating shared
/// client settings, so concurrent `AppendEntries` calls carrying different
/// election timeouts never observe each other's deadline.
#[derive(Clone)]
pub struct HttpTransport<C: Codec = BincodeCodec> {
    config: TransportConfig,
    paths: RpcPaths,
    codec: C,
    sender: OutboundSender<C>,
}

impl HttpTransport<BincodeCodec> {
    /// Transport using the bincode codec, bounded by `config.max_message_size`.
    pub fn new(config: TransportConfig) -> Self {
        let codec = BincodeCodec::with_limit(config.max_message_size);
        Self::with_codec(config, codec)
    }
}

impl<C: Codec> HttpTransport<C> {
    pub fn with_codec(config: TransportConfig, codec: C) -> Self {
        let paths = RpcPaths::new(&config.prefix);

        let mut builder = Client::builder(TokioExecutor::new());
        builder.pool_timer(TokioTimer::new());
        // A request lost on a stale pooled connection surfaces as absence; the
        // engine decides whether to send again.
        builder.retry_canceled_requests(false);
        if config.disable_keep_alives {
            builder.pool_max_idle_per_host(0);
        }
        let client = builder.build(Connector::new(Arc::clone(&config.dialer)));

        let sender = OutboundSender::new(client, codec.clone(), config.body_limit());
        Self {
            config,
            paths,
            codec,
            sender,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// The configured prefix, as given.
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    pub fn paths(&self) -> &RpcPaths {
        &self.paths
    }

    pub fn path(&self, kind: RpcKind) -> &str {
        self.paths.get(kind)
    }

    pub fn append_entries_path(&self) -> &str {
        self.path(RpcKind::AppendEntries)
    }

    pub fn request_vote_path(&self) -> &str {
        self.path(RpcKind::RequestVote)
    }

    pub fn snapshot_path(&self) -> &str {
        self.path(RpcKind::Snapshot)
    }

    pub fn snapshot_recovery_path(&self) -> &str {
        self.path(RpcKind::SnapshotRecovery)
    }

    // ------------------------------------------------------------------------
    // Installation
    // ------------------------------------------------------------------------

    /// Bind one handler per RPC kind onto `mux`, serving requests with `engine`.
    ///
    /// Exactly four paths are bound. Installing onto another router binds the
    /// same paths there.
    pub fn install<E, M>(&self, engine: Arc<E>, mux: &mut M)
    where
        E: ConsensusEngine + ?Sized,
        M: Mux + ?Sized,
    {
        let limit = self.config.body_limit();
        for (kind, path) in self.paths.iter() {
            let handler = match kind {
                RpcKind::AppendEntries => RpcHandler::new::<AppendEntries, E, C>(
                    Arc::clone(&engine),
                    self.codec.clone(),
                    limit,
                ),
                RpcKind::RequestVote => RpcHandler::new::<RequestVote, E, C>(
                    Arc::clone(&engine),
                    self.codec.clone(),
                    limit,
                ),
                RpcKind::Snapshot => RpcHandler::new::<Snapshot, E, C>(
                    Arc::clone(&engine),
                    self.codec.clone(),
                    limit,
                ),
                RpcKind::SnapshotRecovery => RpcHandler::new::<SnapshotRecovery, E, C>(
                    Arc::clone(&engine),
                    self.codec.clone(),
                    limit,
                ),
            };
            debug!(server = engine.name(), %kind, path, "installing rpc route");
            mux.handle(path, handler);
        }
    }

    // ------------------------------------------------------------------------
    // Outgoing
    // ------------------------------------------------------------------------

    /// Deadline the next `kind` call from `server` will run under.
    ///
    /// `AppendEntries` follows the engine's election timeout as it is right
    /// now, so a heartbeat never outlives the point where the follower would
    /// start an election. A zero election timeout falls back to the request
    /// timeout. Other kinds use the request timeout.
    pub fn deadline_for<E>(&self, kind: RpcKind, server: &E) -> Duration
    where
        E: ConsensusEngine + ?Sized,
    {
        match kind {
            RpcKind::AppendEntries => match server.election_timeout() {
                timeout if timeout.is_zero() => self.config.request_timeout,
                timeout => timeout,
            },
            _ => self.config.request_timeout,
        }
    }

    /// Send any kind of request to `peer`.
    pub async fn send<R, E>(
        &self,
        server: &E,
        peer: &Peer,
        request: &R::Request,
    ) -> RpcOutcome<R::Response>
    where
        R: Rpc,
        E: ConsensusEngine + ?Sized,
    {
        let deadline = self.deadline_for(R::KIND, server);
        self.sender
            .send::<R>(server.name(), peer, self.path(R::KIND), request, deadline)
            .await
    }

    /// Replicate entries to, or heartbeat, `peer`.
    pub async fn send_append_entries<E>(
        &self,
        server: &E,
        peer: &Peer,
        request: &AppendEntriesRequest,
    ) -> RpcOutcome<AppendEntriesResponse>
    where
        E: ConsensusEngine + ?Sized,
    {
        self.send::<AppendEntries, E>(server, peer, request).await
    }

    /// Ask `peer` for its vote.
    pub async fn send_vote_request<E>(
        &self,
        server: &E,
        peer: &Peer,
        request: &RequestVoteRequest,
    ) -> RpcOutcome<RequestVoteResponse>
    where
        E: ConsensusEngine + ?Sized,
    {
        self.send::<RequestVote, E>(server, peer, request).await
    }

    pub async fn send_snapshot_request<E>(
        &self,
        server: &E,
        peer: &Peer,
        request: &SnapshotRequest,
    ) -> RpcOutcome<SnapshotResponse>
    where
        E: ConsensusEngine + ?Sized,
    {
        self.send::<Snapshot, E>(server, peer, request).await
    }

    pub async fn send_snapshot_recovery_request<E>(
        &self,
        server: &E,
        peer: &Peer,
        request: &SnapshotRecoveryRequest,
    ) -> RpcOutcome<SnapshotRecoveryResponse>
    where
        E: ConsensusEngine + ?Sized,
    {
        self.send::<SnapshotRecovery, E>(server, peer, request)
            .await
    }
}
