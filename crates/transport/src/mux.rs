//! Router abstraction.
//!
//! The transport only needs to bind a handler to a path. [`Mux`] is that one
//! operation; it is implemented for `axum::Router` and for [`RouteTable`], a
//! plain lookup table for hosts that route requests themselves.

use crate::dispatcher::{RpcHandler, RpcReply};
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use bytes::Bytes;
use http::StatusCode;
use std::collections::BTreeMap;

/// Something handlers can be bound onto.
pub trait Mux {
    /// Bind `handler` to POST requests on `path`.
    fn handle(&mut self, path: &str, handler: RpcHandler);
}

/// Binds POST routes. Request bodies are bounded by the handler's limit;
/// larger bodies are refused with `413` before the handler runs.
///
/// Binding a path that is already routed panics, as `Router::route` does.
impl<S> Mux for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn handle(&mut self, path: &str, handler: RpcHandler) {
        let limit = DefaultBodyLimit::max(handler.body_limit());
        let route = post(move |body: Bytes| {
            let handler = handler.clone();
            async move { handler.call(body).await }
        })
        .layer(limit);
        *self = std::mem::take(self).route(path, route);
    }
}

/// Path to handler table.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: BTreeMap<String, RpcHandler>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&RpcHandler> {
        self.routes.get(path)
    }

    /// Bound paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route a request body to the handler bound at `path`.
    ///
    /// Unbound paths answer `404` with an empty body.
    pub async fn dispatch(&self, path: &str, body: Bytes) -> RpcReply {
        match self.routes.get(path) {
            Some(handler) => handler.call(body).await,
            None => RpcReply {
                status: StatusCode::NOT_FOUND,
                content_type: None,
                body: Bytes::new(),
            },
        }
    }
}

impl Mux for RouteTable {
    /// Rebinding a path replaces the previous handler.
    fn handle(&mut self, path: &str, handler: RpcHandler) {
        self.routes.insert(path.to_string(), handler);
    }
}
