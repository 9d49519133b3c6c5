//! Transport configuration.

use crate::dialer::{Dialer, TcpDialer};
use corelib::codec::DEFAULT_MAX_MESSAGE_SIZE;
use std::sync::Arc;
use std::time::Duration;

/// Deadline for every kind except `AppendEntries`, which follows the
/// engine's election timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings fixed at transport construction.
///
/// # Example
///
/// ```
/// use transport::TransportConfig;
/// use std::time::Duration;
///
/// let config = TransportConfig::new("/raft")
///     .with_keep_alives(false)
///     .with_request_timeout(Duration::from_secs(2));
/// assert_eq!(config.prefix, "/raft");
/// ```
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Path prefix every RPC route lives under. May be empty.
    pub prefix: String,
    /// Open a fresh connection for every request instead of pooling.
    pub disable_keep_alives: bool,
    /// Deadline for `RequestVote`, `Snapshot` and `SnapshotRecovery` calls,
    /// and the fallback for `AppendEntries` while the election timeout is zero.
    pub request_timeout: Duration,
    /// Largest request or response body accepted, in bytes.
    pub max_message_size: u64,
    /// Opens the connections outbound requests travel over.
    pub dialer: Arc<dyn Dialer>,
}

impl TransportConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_keep_alives(mut self, enabled: bool) -> Self {
        self.disable_keep_alives = !enabled;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_message_size(mut self, bytes: u64) -> Self {
        self.max_message_size = bytes;
        self
    }

    pub fn with_dialer(mut self, dialer: impl Dialer) -> Self {
        self.dialer = Arc::new(dialer);
        self
    }

    /// Body size bound as a `usize`, saturating on narrow targets.
    pub(crate) fn body_limit(&self) -> usize {
        usize::try_from(self.max_message_size).unwrap_or(usize::MAX)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            disable_keep_alives: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            dialer: Arc::new(TcpDialer),
        }
    }
}
