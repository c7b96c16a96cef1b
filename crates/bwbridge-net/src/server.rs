//! TCP accept loop
//!
//! One game session at a time, by design: the engine hosts a single game,
//! and a fresh session (and fresh state model) starts with every
//! connection. Session failures never take the server down.

use crate::session::{SessionConfig, run_session};
use bwbridge_core::Catalogs;
use bwbridge_core::agent::AgentFactory;
use bwbridge_core::error::{BridgeError, Result};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the engine connects to.
    pub bind_addr: String,
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:12345".into(),
            session: SessionConfig::default(),
        }
    }
}

/// Accepts engine connections and serves sessions sequentially.
///
/// The agent is injected as a factory so every session gets a fresh
/// instance; swapping in a different agent (or a null one for testing) is a
/// constructor argument, not global state.
pub struct Server {
    config: ServerConfig,
    catalogs: Arc<Catalogs>,
    factory: AgentFactory,
}

impl Server {
    pub fn new(config: ServerConfig, catalogs: Arc<Catalogs>, factory: AgentFactory) -> Self {
        Self {
            config,
            catalogs,
            factory,
        }
    }

    /// Bind and serve forever. Only a bind/accept failure returns.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, "waiting for engine connection");

        loop {
            let (stream, peer) = listener.accept().await?;
            info!(%peer, "engine connected");

            // Frame traffic is small and latency-sensitive.
            if let Err(e) = stream.set_nodelay(true) {
                warn!(error = %e, "failed to set TCP_NODELAY");
            }

            let (read_half, write_half) = stream.into_split();
            let outcome = run_session(
                BufReader::new(read_half),
                write_half,
                self.config.session.clone(),
                Arc::clone(&self.catalogs),
                &self.factory,
            )
            .await;

            match outcome {
                Ok(()) => info!(%peer, "session ended"),
                // Disconnects and transport errors are a normal session end.
                Err(BridgeError::Disconnect) => info!(%peer, "engine disconnected"),
                Err(BridgeError::Io(e)) => info!(%peer, error = %e, "connection lost"),
                Err(e) => warn!(%peer, error = %e, "session aborted"),
            }

            info!("waiting for engine connection");
        }
    }
}
