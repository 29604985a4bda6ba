//! Cross-origin policy.
//!
//! Development allows every origin. Production only reflects origins from
//! `cors.allowed_origins`; others get no `access-control-allow-origin` and
//! the browser blocks them. Preflights (`OPTIONS`) are always answered by
//! the layer itself with an empty 200.

use axum::http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{CorsConfig, Environment};
use crate::http::request::X_REQUEST_ID;

pub fn cors_layer(config: &CorsConfig, environment: Environment) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(X_REQUEST_ID)]);

    if environment.is_development() || config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::info!("No CORS origins configured; cross-origin requests will be refused");
    }

    layer.allow_origin(AllowOrigin::list(origins))
}
