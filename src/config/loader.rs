//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("invalid prefix mode `{0}` (expected `strip` or `preserve`)")]
    InvalidPrefixMode(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file. Validation happens once all
/// override sources are merged, see [`crate::lifecycle::startup`].
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{Environment, PrefixRewrite};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.port, 4000);
        assert_eq!(config.timeouts.upstream_ms, 30_000);
        assert_eq!(config.environment, Environment::Production);
        assert!(config.backend.url.is_none());
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].match_prefix, "/api");
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            environment = "development"

            [listener]
            port = 8088

            [backend]
            url = "http://127.0.0.1:3000"
            health_path = "/status"

            [[routes]]
            name = "api"
            match_prefix = "/api"
            rewrite = "preserve"

            [[routes]]
            name = "files"
            match_prefix = "/files"
            rewrite = "strip"
            strip_prefix = "/files/v1"

            [timeouts]
            upstream_ms = 1500

            [cors]
            allowed_origins = ["https://app.example.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.listener.port, 8088);
        assert_eq!(config.backend.url.as_deref(), Some("http://127.0.0.1:3000"));
        assert_eq!(config.backend.health_path, "/status");
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].rewrite, PrefixRewrite::Preserve);
        assert_eq!(config.routes[1].effective_strip_prefix(), "/files/v1");
        assert_eq!(config.timeouts.upstream_ms, 1500);
        assert_eq!(config.timeouts.connect_ms, 10_000);
        assert_eq!(config.cors.allowed_origins, vec!["https://app.example.com"]);
    }

    #[test]
    fn test_route_requires_rewrite_choice() {
        let err = parse_config(
            r#"
            [[routes]]
            name = "api"
            match_prefix = "/api"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_environment_is_production() {
        let config = parse_config(r#"environment = "staging""#).unwrap();
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
