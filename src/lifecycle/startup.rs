//! Startup orchestration.
//!
//! # Responsibilities
//! - Merge and validate configuration
//! - Start the metrics exporter when configured
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, including a missing backend
//! - Listener binds last (traffic only when ready)

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::loader;
use crate::config::{validate_config, ConfigError, ConfigOverrides, GatewayConfig};
use crate::http::GatewayServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(String),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the effective configuration: file (if any), then overrides, then validation.
pub fn load_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => loader::load_config(path)?,
        None => GatewayConfig::default(),
    };
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Bring the gateway up and serve until `shutdown` fires.
pub async fn launch(config: GatewayConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    // Unparseable addresses were already rejected by validation.
    if let Some(Ok(addr)) = config.observability.metrics_socket_addr() {
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let address = config.listener.socket_address();
    let server = GatewayServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %address, "Listening for connections");

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
