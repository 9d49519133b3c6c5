//! Outcome of an outbound call.

use crate::error::NoResponse;

/// Either the peer's decoded answer or the absence of one.
///
/// There is deliberately no error channel: an engine must react to a lost
/// message, a dead peer and a slow peer in exactly the same way. The
/// [`NoResponse`] reason is there for logs and tests.
#[derive(Debug)]
#[must_use]
pub enum RpcOutcome<T> {
    Response(T),
    NoResponse(NoResponse),
}

impl<T> RpcOutcome<T> {
    pub fn is_response(&self) -> bool {
        matches!(self, RpcOutcome::Response(_))
    }

    /// Discard the reason and keep only the response, if any.
    pub fn into_response(self) -> Option<T> {
        match self {
            RpcOutcome::Response(response) => Some(response),
            RpcOutcome::NoResponse(_) => None,
        }
    }

    pub fn no_response(&self) -> Option<&NoResponse> {
        match self {
            RpcOutcome::Response(_) => None,
            RpcOutcome::NoResponse(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T, NoResponse>> for RpcOutcome<T> {
    fn from(result: Result<T, NoResponse>) -> Self {
        match result {
            Ok(response) => RpcOutcome::Response(response),
            Err(reason) => RpcOutcome::NoResponse(reason),
        }
    }
}
