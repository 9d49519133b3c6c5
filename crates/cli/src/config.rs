//! Command-line configuration.

use crate::commands::{Command, CommandResult};
use crate::engine::FollowerEngine;
use anyhow::Context;
use clap::Parser;
use corelib::codec::DEFAULT_MAX_MESSAGE_SIZE;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use transport::TransportConfig;

/// Run or query a Raft HTTP transport node.
#[derive(Debug, Parser)]
#[command(name = "raftnet", version)]
pub struct CliConfig {
    /// Name of the local server.
    #[arg(long, default_value = "node")]
    pub name: String,

    /// Path prefix the RPC routes live under.
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Open a new connection for every request.
    #[arg(long)]
    pub no_keep_alive: bool,

    /// Election timeout of the local engine; also the AppendEntries deadline.
    #[arg(long, default_value_t = 150)]
    pub election_timeout_ms: u64,

    /// Deadline for every other RPC kind.
    #[arg(long, default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Largest message accepted or sent, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: u64,

    /// Dial peers through unix sockets in this directory instead of TCP.
    #[arg(long)]
    pub socket_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Install a stderr log subscriber. `RUST_LOG` wins over `--log-level`.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn transport_config(&self) -> anyhow::Result<TransportConfig> {
        let mut config = TransportConfig::new(self.prefix.clone())
            .with_keep_alives(!self.no_keep_alive)
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
            .with_max_message_size(self.max_message_size);

        if let Some(dir) = &self.socket_dir {
            config = with_socket_dir(config, dir)?;
        }
        Ok(config)
    }

    pub fn engine(&self) -> FollowerEngine {
        FollowerEngine::new(self.name.clone(), Duration::from_millis(self.election_timeout_ms))
    }

    /// Execute the selected command on a fresh runtime.
    pub fn run(self) -> anyhow::Result<CommandResult> {
        let transport_config = self.transport_config()?;
        let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
        runtime.block_on(self.command.execute(&self, transport_config))
    }
}

#[cfg(unix)]
fn with_socket_dir(
    config: TransportConfig,
    dir: &std::path::Path,
) -> anyhow::Result<TransportConfig> {
    Ok(config.with_dialer(transport::UnixDialer::new(dir)))
}

#[cfg(not(unix))]
fn with_socket_dir(
    _config: TransportConfig,
    dir: &std::path::Path,
) -> anyhow::Result<TransportConfig> {
    anyhow::bail!("unix sockets are not supported here ({})", dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::RpcCommand;

    #[test]
    fn test_parse_send() {
        let config = CliConfig::try_parse_from([
            "raftnet",
            "--name",
            "A",
            "--prefix",
            "/raft",
            "--no-keep-alive",
            "send",
            "--peer",
            "http://127.0.0.1:4002",
            "append-entries",
            "--term",
            "5",
        ])
        .unwrap();

        assert_eq!(config.name, "A");
        let transport = config.transport_config().unwrap();
        assert_eq!(transport.prefix, "/raft");
        assert!(transport.disable_keep_alives);
        match config.command {
            Command::Send {
                peer,
                rpc: RpcCommand::AppendEntries { term, .. },
            } => {
                assert_eq!(peer, "http://127.0.0.1:4002");
                assert_eq!(term, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::try_parse_from(["raftnet", "serve"]).unwrap();
        let transport = config.transport_config().unwrap();

        assert!(!transport.disable_keep_alives);
        assert_eq!(transport.request_timeout, Duration::from_secs(10));
        assert_eq!(transport.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.engine().current_term(), 0);
    }
}
