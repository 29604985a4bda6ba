//! Fixed endpoints served by the gateway itself.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::config::Environment;
use crate::http::response;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct GatewayInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub environment: Environment,
    pub backend_url: String,
    pub routes: Vec<RouteSummary>,
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct RouteSummary {
    pub name: String,
    pub match_prefix: String,
    pub strip_prefix: Option<String>,
}

#[derive(Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub test_backend: &'static str,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub environment: Environment,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct BackendTestReport {
    pub status: &'static str,
    pub backend_url: String,
    pub backend_status: u16,
    pub backend_response: Value,
}

pub async fn index(State(state): State<AppState>) -> Json<GatewayInfo> {
    let routes = state
        .routes
        .rules()
        .iter()
        .map(|rule| RouteSummary {
            name: rule.name.clone(),
            match_prefix: rule.match_prefix.clone(),
            strip_prefix: (!rule.strip_prefix.is_empty()).then(|| rule.strip_prefix.clone()),
        })
        .collect();

    Json(GatewayInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment(),
        backend_url: state.backend_url.to_string(),
        routes,
        endpoints: Endpoints {
            health: "/health",
            test_backend: "/test-backend",
        },
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        environment: state.environment(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Probe the backend and relay its status and body.
pub async fn test_backend(State(state): State<AppState>) -> Response {
    let backend_url = state.probe.target().to_string();

    match state.probe.probe().await {
        Ok(report) => {
            let backend_response = serde_json::from_slice::<Value>(&report.body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&report.body).into_owned())
            });
            let body = BackendTestReport {
                status: if report.status.is_success() { "success" } else { "error" },
                backend_url,
                backend_status: report.status.as_u16(),
                backend_response,
            };
            (report.status, Json(body)).into_response()
        }
        Err(e) => {
            tracing::warn!(backend = %backend_url, kind = e.kind(), error = %e, "Backend test failed");
            response::upstream_error(&e, state.environment(), &backend_url)
        }
    }
}
