//! Inbound dispatcher.
//!
//! Each handler decodes a request body, hands it to the engine and encodes
//! the engine's answer. A body over the size limit or one that does not
//! decode never reaches the engine. The reply is encoded into a buffer
//! before anything is written, so a failed encode is a clean 500 with an
//! empty body rather than a partial body under a success status.

use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use corelib::{Codec, ConsensusEngine, Rpc, RpcKind};
use futures::future::BoxFuture;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Status, media type and body produced by a handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcReply {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub body: Bytes,
}

impl RpcReply {
    fn encoded(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some(content_type),
            body: Bytes::from(body),
        }
    }

    fn empty(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Bytes::new(),
        }
    }
}

impl IntoResponse for RpcReply {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();
        match self.content_type {
            Some(content_type) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            None => {
                headers.remove(CONTENT_TYPE);
            }
        }
        response
    }
}

type HandlerFn = dyn Fn(Bytes) -> BoxFuture<'static, RpcReply> + Send + Sync;

/// Router-agnostic handler for one RPC kind.
#[derive(Clone)]
pub struct RpcHandler {
    kind: RpcKind,
    body_limit: usize,
    inner: Arc<HandlerFn>,
}

impl RpcHandler {
    /// Handler that serves `R` requests with `engine`.
    pub fn new<R, E, C>(engine: Arc<E>, codec: C, body_limit: usize) -> Self
    where
        R: Rpc,
        E: ConsensusEngine + ?Sized,
        C: Codec,
    {
        let inner = move |body: Bytes| -> BoxFuture<'static, RpcReply> {
            Box::pin(dispatch::<R, E, C>(
                Arc::clone(&engine),
                codec.clone(),
                body_limit,
                body,
            ))
        };
        Self {
            kind: R::KIND,
            body_limit,
            inner: Arc::new(inner),
        }
    }

    pub fn kind(&self) -> RpcKind {
        self.kind
    }

    /// Largest request body the handler accepts. Routers may enforce it earlier.
    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub async fn call(&self, body: Bytes) -> RpcReply {
        (self.inner)(body).await
    }
}

impl fmt::Debug for RpcHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcHandler")
            .field("kind", &self.kind)
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

async fn dispatch<R, E, C>(engine: Arc<E>, codec: C, body_limit: usize, body: Bytes) -> RpcReply
where
    R: Rpc,
    E: ConsensusEngine + ?Sized,
    C: Codec,
{
    let kind = R::KIND;
    debug!(server = engine.name(), %kind, bytes = body.len(), "RECV");

    if body.len() > body_limit {
        warn!(
            server = engine.name(),
            %kind,
            bytes = body.len(),
            limit = body_limit,
            "rejecting oversized request"
        );
        return RpcReply::empty(StatusCode::BAD_REQUEST);
    }

    let request: R::Request = match codec.decode(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!(
                server = engine.name(),
                %kind,
                error = %err,
                "rejecting undecodable request"
            );
            return RpcReply::empty(StatusCode::BAD_REQUEST);
        }
    };

    // Engine operations are synchronous and may block on the engine's own loop.
    let call_engine = Arc::clone(&engine);
    let call = tokio::task::spawn_blocking(move || R::dispatch(&*call_engine, request));
    let response = match call.await {
        Ok(response) => response,
        Err(err) => {
            error!(
                server = engine.name(),
                %kind,
                error = %err,
                "engine failed to produce a response"
            );
            return RpcReply::empty(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match codec.encode(&response) {
        Ok(bytes) => RpcReply::encoded(codec.content_type(), bytes),
        Err(err) => {
            error!(server = engine.name(), %kind, error = %err, "encoding response failed");
            RpcReply::empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
