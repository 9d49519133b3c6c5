//! Pluggable dialers.
//!
//! The HTTP client never opens sockets itself; it asks a [`Dialer`] for a
//! stream to the request's authority. [`TcpDialer`] is the usual choice,
//! [`UnixDialer`] keeps HTTP semantics while carrying the bytes over local
//! sockets, one per peer.

use async_trait::async_trait;
use futures::future::BoxFuture;
use http::Uri;
use hyper_util::client::legacy::connect::{Connected, Connection};
use hyper_util::rt::TokioIo;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

const DEFAULT_HTTP_PORT: u16 = 80;

/// Opens a byte stream for an outbound request.
///
/// One dialer is shared by every concurrent call on a transport.
#[async_trait]
pub trait Dialer: fmt::Debug + Send + Sync + 'static {
    async fn dial(&self, uri: &Uri) -> io::Result<DialedStream>;
}

fn host_of(uri: &Uri) -> io::Result<&str> {
    uri.host()
        .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("no host in {uri}")))
}

/// Dials the request's host and port over TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, uri: &Uri) -> io::Result<DialedStream> {
        let host = host_of(uri)?;
        let port = uri.port_u16().unwrap_or(DEFAULT_HTTP_PORT);
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(stream.into())
    }
}

/// Dials a unix socket named after the request's host.
///
/// `http://node2.sock/raft/appendEntries` connects to `<dir>/node2.sock`.
/// The port, if any, is ignored.
#[cfg(unix)]
#[derive(Debug, Clone)]
pub struct UnixDialer {
    dir: std::path::PathBuf,
}

#[cfg(unix)]
impl UnixDialer {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Socket file a URI maps to.
    pub fn socket_path(&self, uri: &Uri) -> io::Result<std::path::PathBuf> {
        let host = host_of(uri)?;
        if host.contains(std::path::MAIN_SEPARATOR) || host == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("socket name {host:?} escapes {}", self.dir.display()),
            ));
        }
        Ok(self.dir.join(host))
    }
}

#[cfg(unix)]
#[async_trait]
impl Dialer for UnixDialer {
    async fn dial(&self, uri: &Uri) -> io::Result<DialedStream> {
        let path = self.socket_path(uri)?;
        Ok(UnixStream::connect(path).await?.into())
    }
}

enum Stream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl AsyncRead for Stream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            #[cfg(unix)]
            Stream::Unix(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Stream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Stream::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            #[cfg(unix)]
            Stream::Unix(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Tcp(s) => Pin::new(s).poll_flush(cx),
            #[cfg(unix)]
            Stream::Unix(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            #[cfg(unix)]
            Stream::Unix(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// A connected stream handed to the HTTP client.
pub struct DialedStream {
    io: TokioIo<Stream>,
}

impl From<TcpStream> for DialedStream {
    fn from(stream: TcpStream) -> Self {
        Self {
            io: TokioIo::new(Stream::Tcp(stream)),
        }
    }
}

#[cfg(unix)]
impl From<UnixStream> for DialedStream {
    fn from(stream: UnixStream) -> Self {
        Self {
            io: TokioIo::new(Stream::Unix(stream)),
        }
    }
}

impl fmt::Debug for DialedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.io.inner() {
            Stream::Tcp(_) => "tcp",
            #[cfg(unix)]
            Stream::Unix(_) => "unix",
        };
        f.debug_struct("DialedStream").field("kind", &kind).finish()
    }
}

impl hyper::rt::Read for DialedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: hyper::rt::ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        hyper::rt::Read::poll_read(Pin::new(&mut self.io), cx, buf)
    }
}

impl hyper::rt::Write for DialedStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        hyper::rt::Write::poll_write(Pin::new(&mut self.io), cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        hyper::rt::Write::poll_flush(Pin::new(&mut self.io), cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        hyper::rt::Write::poll_shutdown(Pin::new(&mut self.io), cx)
    }
}

impl Connection for DialedStream {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

/// Adapts a [`Dialer`] to the connector interface of the pooled client.
#[derive(Clone, Debug)]
pub struct Connector {
    dialer: Arc<dyn Dialer>,
}

impl Connector {
    pub fn new(dialer: Arc<dyn Dialer>) -> Self {
        Self { dialer }
    }
}

impl tower::Service<Uri> for Connector {
    type Response = DialedStream;
    type Error = io::Error;
    type Future = BoxFuture<'static, io::Result<DialedStream>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let dialer = Arc::clone(&self.dialer);
        Box::pin(async move { dialer.dial(&uri).await })
    }
}
