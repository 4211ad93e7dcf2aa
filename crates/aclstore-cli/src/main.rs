//! ACL store CLI
//!
//! Server and command-line administration for the ACL store.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use aclstore_cli::cli::Cli;
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("aclstore {}", env!("CARGO_PKG_VERSION"));
    aclstore_cli::commands::run(cli).await?;
    Ok(())
}
