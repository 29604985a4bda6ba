//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_upstream_failures_total` (counter): failed forwards by kind
//! - `gateway_client_disconnects_total` (counter): clients gone before the backend answered
//!
//! Without an installed exporter every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(kind: &'static str) {
    ::metrics::counter!("gateway_upstream_failures_total", "kind" => kind).increment(1);
}

pub fn record_client_disconnect() {
    ::metrics::counter!("gateway_client_disconnects_total").increment(1);
}
