//! Outbound sender.
//!
//! One generic exchange serves all four kinds: encode, resolve, POST, decode.
//! Every failure along the way becomes [`RpcOutcome::NoResponse`]; nothing is
//! retried here, since only the engine knows whether a retry still matters.

use crate::dialer::Connector;
use crate::error::{NoResponse, TransportError};
use crate::outcome::RpcOutcome;
use crate::path::resolve;
use bytes::Bytes;
use corelib::{Codec, Message, Peer, Rpc};
use http::header::CONTENT_TYPE;
use http::{Request, Uri};
use http_body_util::{BodyExt, Full, Limited};
use hyper_util::client::legacy::Client;
use std::time::Duration;
use tracing::{debug, error, warn};

pub(crate) type HttpClient = Client<Connector, Full<Bytes>>;

/// Issues encoded requests over a shared connection pool.
///
/// Cloning is cheap and clones share the pool, so one sender can serve
/// concurrent calls to any number of peers.
#[derive(Clone)]
pub struct OutboundSender<C> {
    client: HttpClient,
    codec: C,
    body_limit: usize,
}

impl<C: Codec> OutboundSender<C> {
    pub(crate) fn new(client: HttpClient, codec: C, body_limit: usize) -> Self {
        Self {
            client,
            codec,
            body_limit,
        }
    }

    /// Send one `R` request to `peer` at `path`, giving up after `deadline`.
    ///
    /// # Arguments
    /// * `server` - Local server name, for logs only
    /// * `peer` - Target; its connection string is the base URL
    /// * `path` - Route path for `R`, joined onto the base URL's path
    /// * `deadline` - Bound on the whole exchange: connect, headers and body
    ///
    /// # Returns
    /// The decoded response, or the reason none was obtained.
    pub async fn send<R: Rpc>(
        &self,
        server: &str,
        peer: &Peer,
        path: &str,
        request: &R::Request,
        deadline: Duration,
    ) -> RpcOutcome<R::Response> {
        let kind = R::KIND;
        let exchange = self.exchange::<R::Request, R::Response>(server, peer, path, request);
        let result = match tokio::time::timeout(deadline, exchange).await {
            Ok(result) => result,
            Err(_) => Err(NoResponse::Timeout(deadline)),
        };

        if let Err(reason) = &result {
            if reason.is_local() {
                error!(
                    server,
                    peer = %peer.name,
                    %kind,
                    error = %reason,
                    "rpc abandoned before sending"
                );
            } else if reason.is_remote() {
                warn!(server, peer = %peer.name, %kind, error = %reason, "unusable rpc response");
            } else {
                debug!(server, peer = %peer.name, %kind, error = %reason, "no rpc response");
            }
        }

        result.into()
    }

    async fn exchange<M: Message, N: Message>(
        &self,
        server: &str,
        peer: &Peer,
        path: &str,
        request: &M,
    ) -> Result<N, NoResponse> {
        let body = self.codec.encode(request).map_err(NoResponse::Encode)?;

        let url = resolve(&peer.connection_string, path)?;
        let invalid = |reason: String| TransportError::InvalidAddress {
            address: peer.connection_string.clone(),
            reason,
        };
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|err: http::uri::InvalidUri| invalid(err.to_string()))?;
        let request = Request::post(uri)
            .header(CONTENT_TYPE, self.codec.content_type())
            .body(Full::new(Bytes::from(body)))
            .map_err(|err| invalid(err.to_string()))?;

        debug!(server, peer = %peer.name, %url, "POST");
        let response = self
            .client
            .request(request)
            .await
            .map_err(NoResponse::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NoResponse::Status(status));
        }

        // Dropping the body on any early return hands the connection back.
        let bytes = Limited::new(response.into_body(), self.body_limit)
            .collect()
            .await
            .map_err(NoResponse::Body)?
            .to_bytes();

        if bytes.is_empty() {
            // An empty body is a peer with nothing to say, not a broken one.
            return Ok(N::default());
        }
        self.codec.decode(&bytes).map_err(NoResponse::Decode)
    }
}
