//! Response translation.
//!
//! # Responsibilities
//! - Pass successful backend responses through untouched
//! - Map forwarding failures to 502 (backend) or 500 (gateway) JSON bodies
//! - Turn handler panics into the generic 500 body
//!
//! # Design Decisions
//! - Raw error text only appears under `details` in development mode
//! - Exactly one response per request: failures after headers were sent
//!   end the stream instead (see `proxy::forwarder`)

use std::any::Any;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::config::Environment;
use crate::proxy::{ForwardError, RelayResult};

/// Body of a 502 response.
#[derive(Debug, Serialize)]
pub struct BadGatewayBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Body of 500 and 404 responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Turn a forward result into what the client receives.
pub fn relay(result: RelayResult, environment: Environment, backend_url: &str) -> Response {
    match result {
        Ok(response) => response,
        Err(e) => upstream_error(&e, environment, backend_url),
    }
}

pub fn upstream_error(err: &ForwardError, environment: Environment, backend_url: &str) -> Response {
    if err.status() == StatusCode::INTERNAL_SERVER_ERROR {
        let message = if environment.is_development() {
            err.to_string()
        } else {
            err.public_message().to_string()
        };
        return internal_error(message);
    }

    let body = BadGatewayBody {
        error: "Bad Gateway",
        message: err.public_message().to_string(),
        backend_url: Some(backend_url.to_string()),
        details: environment.is_development().then(|| err.to_string()),
    };
    (StatusCode::BAD_GATEWAY, Json(body)).into_response()
}

pub fn internal_error(message: String) -> Response {
    let body = ErrorBody {
        error: "Internal server error",
        message,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

pub fn not_found(path: &str) -> Response {
    let body = ErrorBody {
        error: "Not Found",
        message: format!("No route for {path}"),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Response for a panicking handler.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>, environment: Environment) -> Response<Body> {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    let message = if environment.is_development() {
        detail
    } else {
        "An unexpected error occurred".to_string()
    };
    internal_error(message)
}
