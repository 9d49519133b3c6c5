//! CLI entry point for raftnet.

use clap::Parser;
use cli::CliConfig;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    config.init_tracing();
    let result = config.run()?;
    println!("{result}");
    Ok(())
}
