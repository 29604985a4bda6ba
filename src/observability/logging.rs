//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick output format from config / environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Environment, LogFormat, ObservabilityConfig};

/// Resolve the output format for this process.
pub fn log_format(config: &ObservabilityConfig, environment: Environment) -> LogFormat {
    config.log_format.unwrap_or(if environment.is_development() {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    })
}

fn default_directives(level: &str) -> String {
    format!("api_gateway={level},tower_http={level}")
}

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(config: &ObservabilityConfig, environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    match log_format(config, environment) {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}
