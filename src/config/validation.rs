//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a well-formed backend origin
//! - Validate value ranges (timeouts > 0)
//! - Detect conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::TargetOrigin;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend url is required (set BACKEND_URL or backend.url)")]
    MissingBackendUrl,

    #[error("backend url `{url}` is invalid: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("backend url scheme `{0}` is not supported (use http or https)")]
    UnsupportedScheme(String),

    #[error("route `{route}` has an empty match prefix")]
    EmptyRoutePrefix { route: String },

    #[error("route `{route}` prefix `{prefix}` must start with '/'")]
    RelativeRoutePrefix { route: String, prefix: String },

    #[error("match prefix `{0}` is used by more than one route")]
    DuplicateRoutePrefix(String),

    #[error("timeout `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("health path `{0}` must start with '/'")]
    RelativeHealthPath(String),

    #[error("cors origin `{0}` is not a valid header value")]
    InvalidCorsOrigin(String),

    #[error("metrics address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a merged configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.backend.url.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError::MissingBackendUrl),
        Some(url) => {
            if let Err(e) = TargetOrigin::parse(url) {
                errors.push(e);
            }
        }
    }

    if !config.backend.health_path.starts_with('/') {
        errors.push(ValidationError::RelativeHealthPath(
            config.backend.health_path.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if route.match_prefix.is_empty() {
            errors.push(ValidationError::EmptyRoutePrefix {
                route: route.name.clone(),
            });
            continue;
        }
        if !route.match_prefix.starts_with('/') {
            errors.push(ValidationError::RelativeRoutePrefix {
                route: route.name.clone(),
                prefix: route.match_prefix.clone(),
            });
        }
        if !seen.insert(route.match_prefix.as_str()) {
            errors.push(ValidationError::DuplicateRoutePrefix(
                route.match_prefix.clone(),
            ));
        }
    }

    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_ms"));
    }
    if config.timeouts.upstream_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_ms"));
    }

    for origin in &config.cors.allowed_origins {
        if origin != "*" && HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::InvalidCorsOrigin(origin.clone()));
        }
    }

    if let Some(Err(_)) = config.observability.metrics_socket_addr() {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone().unwrap_or_default(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
