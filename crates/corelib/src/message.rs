//! RPC kinds and the messages they carry.
//!
//! The set of exchanges is closed: four kinds, each with exactly one request
//! shape, one response shape and one path suffix. `Default` on every message
//! is its zero value, which is what an empty response body decodes to.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything the transport can put on the wire.
pub trait Message: Serialize + DeserializeOwned + Default + fmt::Debug + Send + 'static {}

impl<T> Message for T where
    T: Serialize + DeserializeOwned + Default + fmt::Debug + Send + 'static
{
}

/// The four message exchanges carried by the transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RpcKind {
    AppendEntries,
    RequestVote,
    Snapshot,
    SnapshotRecovery,
}

impl RpcKind {
    /// Every kind, in route registration order.
    pub const ALL: [RpcKind; 4] = [
        RpcKind::AppendEntries,
        RpcKind::RequestVote,
        RpcKind::Snapshot,
        RpcKind::SnapshotRecovery,
    ];

    /// Wire name of the kind. Peers must agree on it byte for byte.
    pub fn name(self) -> &'static str {
        match self {
            RpcKind::AppendEntries => "appendEntries",
            RpcKind::RequestVote => "requestVote",
            RpcKind::Snapshot => "snapshot",
            RpcKind::SnapshotRecovery => "snapshotRecovery",
        }
    }

    /// Fixed path suffix, `"/" + name`.
    pub fn path_suffix(self) -> &'static str {
        match self {
            RpcKind::AppendEntries => "/appendEntries",
            RpcKind::RequestVote => "/requestVote",
            RpcKind::Snapshot => "/snapshot",
            RpcKind::SnapshotRecovery => "/snapshotRecovery",
        }
    }
}

impl fmt::Display for RpcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single replicated log entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub index: u64,
    pub term: u64,
    pub command_name: String,
    pub command: Vec<u8>,
}

/// Leader to follower: replicate entries, or heartbeat when `entries` is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendEntriesRequest {
    pub term: u64,
    pub prev_log_index: u64,
    pub prev_log_term: u64,
    pub commit_index: u64,
    pub leader_name: String,
    pub entries: Vec<LogEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendEntriesResponse {
    pub term: u64,
    pub index: u64,
    pub commit_index: u64,
    pub success: bool,
}

/// Candidate to voter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestVoteRequest {
    pub term: u64,
    pub last_log_index: u64,
    pub last_log_term: u64,
    pub candidate_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestVoteResponse {
    pub term: u64,
    pub vote_granted: bool,
}

/// Leader announces a snapshot it is about to ship.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    pub leader_name: String,
    pub last_index: u64,
    pub last_term: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub success: bool,
}

/// Cluster member recorded inside a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPeer {
    pub name: String,
    pub connection_string: String,
}

/// Leader ships the snapshot state itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecoveryRequest {
    pub leader_name: String,
    pub last_index: u64,
    pub last_term: u64,
    pub peers: Vec<SnapshotPeer>,
    pub state: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecoveryResponse {
    pub term: u64,
    pub success: bool,
    pub commit_index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_suffix_is_slash_plus_name() {
        for kind in RpcKind::ALL {
            assert_eq!(kind.path_suffix(), format!("/{}", kind.name()));
        }
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(
            AppendEntriesResponse::default(),
            AppendEntriesResponse {
                term: 0,
                index: 0,
                commit_index: 0,
                success: false
            }
        );
        assert!(!RequestVoteResponse::default().vote_granted);
    }
}
