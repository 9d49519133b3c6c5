//! Peer addressing.
//!
//! A peer is a remote participant in the consensus protocol. The transport
//! only ever borrows peers for the duration of a call; the engine owns them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote participant reachable at a stable base address.
///
/// The connection string is a base URL such as `http://10.0.0.2:4001` or
/// `http://node2.sock/cluster-a`. RPC paths are appended to whatever path it
/// already carries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
    /// Display name, used for diagnostics only.
    pub name: String,
    /// Base endpoint the peer serves its RPC routes under.
    pub connection_string: String,
}

impl Peer {
    /// Construct a new peer.
    pub fn new(name: impl Into<String>, connection_string: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connection_string: connection_string.into(),
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.connection_string)
    }
}
