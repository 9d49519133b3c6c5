//! CLI tool for running and probing Raft HTTP transport nodes.
//!
//! Provides commands for:
//! - Serving the four RPC routes for a local follower engine
//! - Sending a single RPC to a peer and printing the outcome

pub mod commands;
pub mod config;
pub mod engine;

pub use commands::{Command, CommandResult, RpcCommand};
pub use config::CliConfig;
pub use engine::FollowerEngine;
