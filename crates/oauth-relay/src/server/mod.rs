//! HTTP server for the relay.

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::oauth::OAuth2Client;
use crate::store::{MemoryTokenStore, TokenStore};

pub use routes::{AppState, create_router};

/// OAuth relay server.
pub struct RelayServer {
    state: AppState,
    port: u16,
}

impl RelayServer {
    /// Create a server for the configured provider with an empty in-memory store.
    ///
    /// # Errors
    ///
    /// Returns error if the provider HTTP client cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let provider = OAuth2Client::new(config)?;
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        Ok(Self::with_state(AppState::new(Arc::new(provider), store), config.port))
    }

    /// Create a server around existing state.
    #[must_use]
    pub fn with_state(state: AppState, port: u16) -> Self {
        Self { state, port }
    }

    /// Run until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run(self) -> anyhow::Result<()> {
        let router = create_router(self.state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for RelayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayServer").field("port", &self.port).finish_non_exhaustive()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
