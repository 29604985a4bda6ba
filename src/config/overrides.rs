//! Command-line and environment overrides layered over the config file.

use crate::config::schema::{Environment, GatewayConfig, PrefixRewrite};

/// Values supplied outside the config file. `None` leaves the file (or
/// default) value in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub backend_url: Option<String>,
    pub environment: Option<Environment>,
    pub upstream_timeout_ms: Option<u64>,
    /// Applied to every configured route.
    pub prefix_mode: Option<PrefixRewrite>,
    /// Replaces the configured list when non-empty.
    pub cors_origins: Vec<String>,
    pub log_level: Option<String>,
    pub metrics_address: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut GatewayConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(url) = self.backend_url {
            config.backend.url = Some(url);
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(ms) = self.upstream_timeout_ms {
            config.timeouts.upstream_ms = ms;
        }
        if let Some(mode) = self.prefix_mode {
            for route in &mut config.routes {
                route.rewrite = mode;
            }
        }
        if !self.cors_origins.is_empty() {
            config.cors.allowed_origins = self.cors_origins;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(addr) = self.metrics_address {
            config.observability.metrics_address = Some(addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = GatewayConfig::default();
        config.backend.url = Some("http://file-backend:3000".into());

        ConfigOverrides {
            port: Some(9000),
            backend_url: Some("http://env-backend:3000".into()),
            prefix_mode: Some(PrefixRewrite::Preserve),
            cors_origins: vec!["https://a.example".into()],
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.backend.url.as_deref(), Some("http://env-backend:3000"));
        assert!(config.routes.iter().all(|r| r.rewrite == PrefixRewrite::Preserve));
        assert_eq!(config.cors.allowed_origins, vec!["https://a.example"]);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = GatewayConfig::default();
        config.timeouts.upstream_ms = 1234;
        ConfigOverrides::default().apply(&mut config);
        assert_eq!(config.timeouts.upstream_ms, 1234);
        assert_eq!(config.listener.port, 4000);
        assert!(config.backend.url.is_none());
    }
}
