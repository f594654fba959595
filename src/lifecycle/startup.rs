//! Startup orchestration.

use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::loader::ConfigError;
use crate::config::{GatewayConfig, ObservabilityConfig, StorageConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};
use crate::provider::{GeminiProvider, ProviderError};
use crate::storage::{FileStore, KvStore, MemoryStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Logging first, then the metrics exporter when enabled.
pub fn start_observability(config: &ObservabilityConfig) {
    logging::init_tracing(config);

    if config.metrics_enabled {
        match config.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }
}

/// File-backed store when a path is configured, in-memory otherwise.
pub fn open_store(config: &StorageConfig) -> Arc<dyn KvStore> {
    match &config.path {
        Some(path) => {
            tracing::info!(path = %path, "Using file-backed store");
            Arc::new(FileStore::open(path))
        }
        None => {
            tracing::info!("Using in-memory store; state is lost on restart");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Boot every subsystem and serve until a shutdown signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    start_observability(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "nexus-gateway starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        text_model = %config.provider.text_model,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    let store = open_store(&config.storage);
    let provider = GeminiProvider::from_config(&config.provider)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, provider, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
