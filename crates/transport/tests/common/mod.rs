//! Shared fixtures for transport integration tests.

#![allow(dead_code)]

use corelib::{
    AppendEntriesRequest, AppendEntriesResponse, ConsensusEngine, RequestVoteRequest,
    RequestVoteResponse, RpcKind, SnapshotRecoveryRequest, SnapshotRecoveryResponse,
    SnapshotRequest, SnapshotResponse,
};
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Engine that records every call and answers from the request it was given.
pub struct RecordingEngine {
    name: String,
    election_timeout_ms: AtomicU64,
    delay_ms: AtomicU64,
    calls: Mutex<Vec<RpcKind>>,
    last_append: Mutex<Option<AppendEntriesRequest>>,
}

impl RecordingEngine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            election_timeout_ms: AtomicU64::new(150),
            delay_ms: AtomicU64::new(0),
            calls: Mutex::new(Vec::new()),
            last_append: Mutex::new(None),
        }
    }

    pub fn set_election_timeout(&self, timeout: Duration) {
        self.election_timeout_ms
            .store(timeout.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make every handler block for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RpcKind> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, kind: RpcKind) -> usize {
        self.calls.lock().iter().filter(|k| **k == kind).count()
    }

    pub fn last_append(&self) -> Option<AppendEntriesRequest> {
        self.last_append.lock().clone()
    }

    fn record(&self, kind: RpcKind) {
        self.calls.lock().push(kind);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
    }
}

impl ConsensusEngine for RecordingEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn election_timeout(&self) -> Duration {
        Duration::from_millis(self.election_timeout_ms.load(Ordering::SeqCst))
    }

    fn handle_append_entries(&self, request: AppendEntriesRequest) -> AppendEntriesResponse {
        self.record(RpcKind::AppendEntries);
        let response = AppendEntriesResponse {
            term: request.term,
            success: true,
            ..Default::default()
        };
        *self.last_append.lock() = Some(request);
        response
    }

    fn handle_request_vote(&self, request: RequestVoteRequest) -> RequestVoteResponse {
        self.record(RpcKind::RequestVote);
        RequestVoteResponse {
            term: request.term,
            vote_granted: true,
        }
    }

    fn handle_snapshot(&self, request: SnapshotRequest) -> SnapshotResponse {
        self.record(RpcKind::Snapshot);
        if request.leader_name == "panic" {
            panic!("engine refused snapshot");
        }
        SnapshotResponse { success: true }
    }

    fn handle_snapshot_recovery(
        &self,
        request: SnapshotRecoveryRequest,
    ) -> SnapshotRecoveryResponse {
        self.record(RpcKind::SnapshotRecovery);
        SnapshotRecoveryResponse {
            term: request.last_term,
            success: true,
            commit_index: request.last_index,
        }
    }
}

/// Serve `router` on an ephemeral localhost port.
pub async fn serve(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Client addresses seen by a served router. Each connection has its own.
pub type ClientLog = Arc<Mutex<HashSet<SocketAddr>>>;

async fn record_client(
    State(clients): State<ClientLog>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    clients.lock().insert(client);
    next.run(request).await
}

/// Serve `router` like [`serve`], logging the client address of every request.
pub async fn serve_logging_clients(router: axum::Router) -> (SocketAddr, ClientLog) {
    let clients = ClientLog::default();
    let router = router.layer(middleware::from_fn_with_state(
        Arc::clone(&clients),
        record_client,
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let service = router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service).await.unwrap();
    });
    (addr, clients)
}

/// An address nothing is listening on.
pub fn dead_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
