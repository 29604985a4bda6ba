//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// The single backend all proxied traffic goes to.
    pub backend: BackendConfig,

    /// Path prefixes forwarded to the backend.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Deployment mode. Gates error details and CORS strictness.
    pub environment: Environment,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backend: BackendConfig::default(),
            routes: vec![RouteConfig::api()],
            timeouts: TimeoutConfig::default(),
            environment: Environment::default(),
            cors: CorsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_address: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// Full socket address string, e.g. `0.0.0.0:4000`.
    pub fn socket_address(&self) -> String {
        if self.bind_address.contains(':') && !self.bind_address.starts_with('[') {
            format!("[{}]:{}", self.bind_address, self.port)
        } else {
            format!("{}:{}", self.bind_address, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

/// Backend (target origin) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Absolute origin URL, e.g. "http://127.0.0.1:3000". Required.
    pub url: Option<String>,

    /// Path probed by `/test-backend`.
    pub health_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            health_path: "/health".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match.
    pub match_prefix: String,

    /// Whether the prefix is removed before forwarding. No default: every
    /// route must say which one it wants.
    pub rewrite: PrefixRewrite,

    /// Prefix removed under `rewrite = "strip"` (default: `match_prefix`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,
}

impl RouteConfig {
    /// The built-in `/api` route.
    pub fn api() -> Self {
        Self {
            name: "api".to_string(),
            match_prefix: "/api".to_string(),
            rewrite: PrefixRewrite::Strip,
            strip_prefix: None,
        }
    }

    /// Literal prefix removed from inbound paths; empty when preserving.
    pub fn effective_strip_prefix(&self) -> &str {
        match self.rewrite {
            PrefixRewrite::Strip => self.strip_prefix.as_deref().unwrap_or(&self.match_prefix),
            PrefixRewrite::Preserve => "",
        }
    }
}

/// What happens to the matched prefix on the way to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixRewrite {
    /// `/api/upload` is forwarded as `/upload`.
    Strip,
    /// `/api/upload` is forwarded as `/api/upload`.
    Preserve,
}

impl FromStr for PrefixRewrite {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strip" => Ok(Self::Strip),
            "preserve" | "keep" => Ok(Self::Preserve),
            other => Err(ConfigError::InvalidPrefixMode(other.to_string())),
        }
    }
}

impl fmt::Display for PrefixRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strip => f.write_str("strip"),
            Self::Preserve => f.write_str("preserve"),
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Deadline from connection attempt to backend response headers, in milliseconds.
    pub upstream_ms: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn upstream(&self) -> Duration {
        Duration::from_millis(self.upstream_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 10_000,
            upstream_ms: 30_000,
        }
    }
}

/// Deployment mode.
///
/// Only `development` relaxes anything; every other value is treated as
/// production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn from_mode(mode: &str) -> Self {
        match mode.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl From<String> for Environment {
    fn from(mode: String) -> Self {
        Self::from_mode(&mode)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-origin policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed in production. `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format; follows the environment when unset.
    pub log_format: Option<LogFormat>,

    /// Prometheus endpoint bind address. Metrics are off when unset.
    pub metrics_address: Option<String>,
}

impl ObservabilityConfig {
    pub fn metrics_socket_addr(&self) -> Option<Result<SocketAddr, std::net::AddrParseError>> {
        self.metrics_address.as_deref().map(str::parse)
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: None,
            metrics_address: None,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}
