//! API Gateway
//!
//! Forwards `/api/*` traffic to a single backend and serves a few fixed
//! endpoints of its own.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────┐
//!                              │                     API GATEWAY                       │
//!                              │                                                       │
//!     Client Request           │  ┌─────────┐    ┌──────────┐    ┌──────────────┐      │
//!     ─────────────────────────┼─▶│  cors   │───▶│   http   │───▶│   routing    │      │
//!                              │  │preflight│    │  server  │    │ prefix table │      │
//!                              │  └─────────┘    └────┬─────┘    └──────┬───────┘      │
//!                              │                      │                 │              │
//!                              │          /, /health, │                 ▼              │
//!                              │        /test-backend ▼          ┌──────────────┐      │
//!                              │                 ┌──────────┐    │  forwarder   │      │
//!                              │                 │ handlers │    │ rewrite +    │      │
//!                              │                 └──────────┘    │ X-Forwarded-*│      │
//!                              │                                 └──────┬───────┘      │
//!     Client Response          │  ┌──────────┐                          ▼              │
//!     ◀────────────────────────┼──│ response │◀──── relay / 502 ── upstream client ◀───┼──── Backend
//!                              │  └──────────┘                   (deadline, pool)      │
//!                              └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_gateway::config::{ConfigOverrides, Environment, PrefixRewrite};
use api_gateway::lifecycle::{self, signals, Shutdown};
use api_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Reverse-proxy gateway in front of a single backend", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Backend origin, e.g. http://127.0.0.1:3000.
    #[arg(short, long, env = "BACKEND_URL")]
    backend_url: Option<String>,

    /// Deployment mode; only `development` relaxes CORS and error details.
    #[arg(short, long, env = "APP_ENV")]
    environment: Option<String>,

    /// Deadline for backend response headers, in milliseconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// `strip` or `preserve` the matched prefix when forwarding.
    #[arg(long, env = "API_PREFIX_MODE")]
    prefix_mode: Option<PrefixRewrite>,

    /// Allowed CORS origins in production (comma-separated).
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Prometheus endpoint address, e.g. 0.0.0.0:9090.
    #[arg(long, env = "METRICS_ADDRESS")]
    metrics_address: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let environment = self
            .environment
            .clone()
            .or_else(|| std::env::var("NODE_ENV").ok())
            .map(Environment::from);

        ConfigOverrides {
            port: self.port,
            backend_url: self.backend_url.clone(),
            environment,
            upstream_timeout_ms: self.timeout_ms,
            prefix_mode: self.prefix_mode,
            cors_origins: self.cors_origins.clone(),
            log_level: self.log_level.clone(),
            metrics_address: self.metrics_address.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Config errors are reported before logging exists, so they go to stderr.
    let config = match lifecycle::load_config(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("api-gateway: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability, config.environment);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.listener.port,
        backend = config.backend.url.as_deref().unwrap_or_default(),
        environment = %config.environment,
        upstream_timeout_ms = config.timeouts.upstream_ms,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    lifecycle::launch(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
