//! Issuelog server binary.

use clap::Parser;
use issuelog_server::{ServerArgs, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Example: RUST_LOG=issuelog=debug,tower_http=debug issuelog-server
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("issuelog=info,issuelog_server=info,tower_http=info")
        }))
        .with_target(false)
        .init();

    let args = ServerArgs::parse();
    let config = ServerConfig::resolve(&args).await?;
    tracing::debug!(?config, "Resolved configuration");

    issuelog_server::serve(config).await?;
    Ok(())
}
