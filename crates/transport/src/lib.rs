//! HTTP transport for Raft peer RPCs.
//!
//! This crate carries the four consensus exchanges over plain HTTP POSTs:
//! - Path resolution against a peer's base address
//! - Outbound senders that fold every failure into "no response"
//! - Inbound handlers that decode, call the engine and encode the reply
//! - Installation of those handlers onto a router
//!
//! Consensus itself lives behind [`corelib::ConsensusEngine`]; the transport
//! never inspects the messages it moves.

pub mod config;
pub mod dialer;
pub mod dispatcher;
pub mod error;
pub mod mux;
pub mod outcome;
pub mod path;
pub mod sender;
pub mod transporter;

pub use config::TransportConfig;
pub use dialer::{Connector, DialedStream, Dialer, TcpDialer};
#[cfg(unix)]
pub use dialer::UnixDialer;
pub use dispatcher::{RpcHandler, RpcReply};
pub use error::{NoResponse, TransportError};
pub use mux::{Mux, RouteTable};
pub use outcome::RpcOutcome;
pub use path::{join_path, resolve};
pub use transporter::{HttpTransport, RpcPaths};
