//! bwbridge proxy server
//!
//! Listens for the engine's TCP connection and serves game sessions with
//! the example mining agent. Configuration comes from the environment:
//! - `BWBRIDGE_ADDR`: listen address (default 127.0.0.1:12345)
//! - `BWBRIDGE_CATALOGS`: path to a catalog JSON document (optional; without
//!   it every type id resolves to the unknown descriptor)
//! - `RUST_LOG`: log filter (default info)

mod miner;

use anyhow::{Context, Result};
use bwbridge_core::Catalogs;
use bwbridge_core::agent::AgentFactory;
use bwbridge_net::{Server, ServerConfig};
use miner::MinerAgent;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = ServerConfig::default();
    if let Ok(addr) = std::env::var("BWBRIDGE_ADDR") {
        config.bind_addr = addr;
    }

    let catalogs = match std::env::var_os("BWBRIDGE_CATALOGS") {
        Some(path) => {
            let path = PathBuf::from(path);
            let catalogs = Catalogs::from_file(&path)
                .with_context(|| format!("loading catalogs from {}", path.display()))?;
            info!(
                path = %path.display(),
                unit_types = catalogs.unit_type_count(),
                "catalogs loaded"
            );
            catalogs
        }
        None => {
            info!("no catalog file configured; unit types resolve to the unknown descriptor");
            Catalogs::empty()
        }
    };

    let factory: AgentFactory = Box::new(|| Box::new(MinerAgent));
    let server = Server::new(config, Arc::new(catalogs), factory);
    server.run().await?;
    Ok(())
}
