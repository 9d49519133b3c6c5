//! CLI commands.

use crate::config::CliConfig;
use anyhow::Context;
use clap::Subcommand;
use corelib::{
    AppendEntriesRequest, Peer, RequestVoteRequest, RpcKind, SnapshotRecoveryRequest,
    SnapshotRequest,
};
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use transport::{HttpTransport, RpcOutcome, TransportConfig};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the RPC routes for a local follower engine until interrupted.
    Serve {
        /// TCP address to listen on.
        #[arg(long, default_value = "127.0.0.1:4001", conflicts_with = "socket")]
        listen: SocketAddr,
        /// Listen on this unix socket instead of TCP.
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Send one RPC to a peer and print the outcome.
    Send {
        /// Base address of the peer, e.g. http://127.0.0.1:4002
        #[arg(long)]
        peer: String,
        #[command(subcommand)]
        rpc: RpcCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum RpcCommand {
    /// Heartbeat the peer as leader.
    AppendEntries {
        #[arg(long)]
        term: u64,
        #[arg(long, default_value_t = 0)]
        prev_log_index: u64,
        #[arg(long, default_value_t = 0)]
        prev_log_term: u64,
        #[arg(long, default_value_t = 0)]
        commit_index: u64,
    },
    /// Ask the peer for its vote.
    RequestVote {
        #[arg(long)]
        term: u64,
        #[arg(long, default_value_t = 0)]
        last_log_index: u64,
        #[arg(long, default_value_t = 0)]
        last_log_term: u64,
    },
    /// Announce a snapshot.
    Snapshot {
        #[arg(long)]
        last_index: u64,
        #[arg(long)]
        last_term: u64,
    },
    /// Ship snapshot state.
    SnapshotRecovery {
        #[arg(long)]
        last_index: u64,
        #[arg(long)]
        last_term: u64,
        /// File holding the snapshot state to ship.
        #[arg(long)]
        state_file: Option<PathBuf>,
    },
}

/// What a command produced.
#[derive(Debug)]
pub enum CommandResult {
    Stopped { name: String },
    Response {
        kind: RpcKind,
        body: serde_json::Value,
    },
    NoResponse { kind: RpcKind, reason: String },
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Stopped { name } => write!(f, "{name} stopped"),
            CommandResult::Response { kind, body } => write!(f, "{kind}: {body}"),
            CommandResult::NoResponse { kind, reason } => {
                write!(f, "{kind}: no response ({reason})")
            }
        }
    }
}

impl Command {
    pub async fn execute(
        &self,
        config: &CliConfig,
        transport_config: TransportConfig,
    ) -> anyhow::Result<CommandResult> {
        let transport = HttpTransport::new(transport_config);
        let engine = config.engine();

        match self {
            Command::Serve { listen, socket } => {
                let engine = Arc::new(engine);
                let mut router: axum::Router = axum::Router::new();
                transport.install(Arc::clone(&engine), &mut router);
                serve(router, *listen, socket.as_deref()).await?;
                Ok(CommandResult::Stopped {
                    name: config.name.clone(),
                })
            }
            Command::Send { peer, rpc } => {
                let peer = Peer::new("peer", peer.clone());
                rpc.send(&transport, &engine, &peer, &config.name).await
            }
        }
    }
}

impl RpcCommand {
    async fn send(
        &self,
        transport: &HttpTransport,
        engine: &crate::engine::FollowerEngine,
        peer: &Peer,
        name: &str,
    ) -> anyhow::Result<CommandResult> {
        match self {
            RpcCommand::AppendEntries {
                term,
                prev_log_index,
                prev_log_term,
                commit_index,
            } => {
                let request = AppendEntriesRequest {
                    term: *term,
                    prev_log_index: *prev_log_index,
                    prev_log_term: *prev_log_term,
                    commit_index: *commit_index,
                    leader_name: name.to_string(),
                    entries: Vec::new(),
                };
                let outcome = transport.send_append_entries(engine, peer, &request).await;
                report(RpcKind::AppendEntries, outcome)
            }
            RpcCommand::RequestVote {
                term,
                last_log_index,
                last_log_term,
            } => {
                let request = RequestVoteRequest {
                    term: *term,
                    last_log_index: *last_log_index,
                    last_log_term: *last_log_term,
                    candidate_name: name.to_string(),
                };
                let outcome = transport.send_vote_request(engine, peer, &request).await;
                report(RpcKind::RequestVote, outcome)
            }
            RpcCommand::Snapshot {
                last_index,
                last_term,
            } => {
                let request = SnapshotRequest {
                    leader_name: name.to_string(),
                    last_index: *last_index,
                    last_term: *last_term,
                };
                let outcome = transport
                    .send_snapshot_request(engine, peer, &request)
                    .await;
                report(RpcKind::Snapshot, outcome)
            }
            RpcCommand::SnapshotRecovery {
                last_index,
                last_term,
                state_file,
            } => {
                let state = match state_file {
                    Some(path) => tokio::fs::read(path).await.with_context(|| {
                        format!("reading snapshot state from {}", path.display())
                    })?,
                    None => Vec::new(),
                };
                let request = SnapshotRecoveryRequest {
                    leader_name: name.to_string(),
                    last_index: *last_index,
                    last_term: *last_term,
                    peers: Vec::new(),
                    state,
                };
                let outcome = transport
                    .send_snapshot_recovery_request(engine, peer, &request)
                    .await;
                report(RpcKind::SnapshotRecovery, outcome)
            }
        }
    }
}

fn report<T: Serialize>(kind: RpcKind, outcome: RpcOutcome<T>) -> anyhow::Result<CommandResult> {
    Ok(match outcome {
        RpcOutcome::Response(response) => CommandResult::Response {
            kind,
            body: serde_json::to_value(&response)?,
        },
        RpcOutcome::NoResponse(reason) => CommandResult::NoResponse {
            kind,
            reason: reason.to_string(),
        },
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}

async fn serve(
    router: axum::Router,
    listen: SocketAddr,
    socket: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    match socket {
        #[cfg(unix)]
        Some(path) => {
            let listener = tokio::net::UnixListener::bind(path)
                .with_context(|| format!("binding {}", path.display()))?;
            info!(socket = %path.display(), "serving raft rpc");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        #[cfg(not(unix))]
        Some(path) => anyhow::bail!("unix sockets are not supported here ({})", path.display()),
        None => {
            let listener = tokio::net::TcpListener::bind(listen)
                .await
                .with_context(|| format!("binding {listen}"))?;
            info!(%listen, "serving raft rpc");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }
    Ok(())
}
