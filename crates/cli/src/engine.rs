//! Follower engine used by the `serve` command.
//!
//! This is not a consensus implementation. It keeps just enough state to give
//! protocol-shaped answers when a node is queried: the highest term seen and
//! the vote cast in it. No log is stored.

use corelib::{
    AppendEntriesRequest, AppendEntriesResponse, ConsensusEngine, RequestVoteRequest,
    RequestVoteResponse, SnapshotRecoveryRequest, SnapshotRecoveryResponse, SnapshotRequest,
    SnapshotResponse,
};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Default)]
struct State {
    term: u64,
    voted_for: Option<String>,
    commit_index: u64,
}

impl State {
    /// Adopt `term` if it is newer, forgetting the previous vote.
    fn observe(&mut self, term: u64) {
        if term > self.term {
            self.term = term;
            self.voted_for = None;
        }
    }
}

#[derive(Debug)]
pub struct FollowerEngine {
    name: String,
    election_timeout: Duration,
    state: Mutex<State>,
}

impl FollowerEngine {
    pub fn new(name: impl Into<String>, election_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            election_timeout,
            state: Mutex::new(State::default()),
        }
    }

    pub fn current_term(&self) -> u64 {
        self.state.lock().term
    }

    pub fn commit_index(&self) -> u64 {
        self.state.lock().commit_index
    }
}

impl ConsensusEngine for FollowerEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn election_timeout(&self) -> Duration {
        self.election_timeout
    }

    fn handle_append_entries(&self, request: AppendEntriesRequest) -> AppendEntriesResponse {
        let mut state = self.state.lock();
        if request.term < state.term {
            return AppendEntriesResponse {
                term: state.term,
                commit_index: state.commit_index,
                ..Default::default()
            };
        }

        state.observe(request.term);
        let index = request
            .entries
            .last()
            .map_or(request.prev_log_index, |entry| entry.index);
        state.commit_index = state.commit_index.max(request.commit_index.min(index));
        AppendEntriesResponse {
            term: state.term,
            index,
            commit_index: state.commit_index,
            success: true,
        }
    }

    fn handle_request_vote(&self, request: RequestVoteRequest) -> RequestVoteResponse {
        let mut state = self.state.lock();
        if request.term < state.term {
            return RequestVoteResponse {
                term: state.term,
                vote_granted: false,
            };
        }

        state.observe(request.term);
        let vote_granted = match state.voted_for.as_deref() {
            Some(candidate) => candidate == request.candidate_name,
            None => true,
        };
        if vote_granted {
            state.voted_for = Some(request.candidate_name.clone());
            info!(
                server = %self.name,
                term = state.term,
                candidate = %request.candidate_name,
                "vote granted"
            );
        }
        RequestVoteResponse {
            term: state.term,
            vote_granted,
        }
    }

    fn handle_snapshot(&self, request: SnapshotRequest) -> SnapshotResponse {
        let state = self.state.lock();
        SnapshotResponse {
            success: request.last_term >= state.term || request.last_index > state.commit_index,
        }
    }

    fn handle_snapshot_recovery(
        &self,
        request: SnapshotRecoveryRequest,
    ) -> SnapshotRecoveryResponse {
        let mut state = self.state.lock();
        state.observe(request.last_term);
        state.commit_index = state.commit_index.max(request.last_index);
        info!(
            server = %self.name,
            leader = %request.leader_name,
            last_index = request.last_index,
            bytes = request.state.len(),
            "snapshot installed"
        );
        SnapshotRecoveryResponse {
            term: state.term,
            success: true,
            commit_index: state.commit_index,
        }
    }
}
