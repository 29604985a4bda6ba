//! On-demand backend probe.
//!
//! # Responsibilities
//! - GET the backend's health path under the upstream deadline
//! - Report status and (bounded) body back to the caller

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use http_body_util::{BodyExt, Limited};

use crate::config::TimeoutConfig;
use crate::proxy::client::UpstreamClient;
use crate::proxy::ForwardError;
use crate::resilience::timeouts::with_deadline;
use crate::routing::TargetOrigin;

/// Largest probe body kept for the report.
const MAX_PROBE_BODY: usize = 64 * 1024;

/// What the backend answered.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Issues the gateway's own health request to the backend.
#[derive(Clone)]
pub struct BackendProbe {
    client: UpstreamClient,
    target: TargetOrigin,
    path: String,
    timeouts: TimeoutConfig,
}

impl BackendProbe {
    pub fn new(
        client: UpstreamClient,
        target: TargetOrigin,
        path: String,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            client,
            target,
            path,
            timeouts,
        }
    }

    pub fn target(&self) -> &TargetOrigin {
        &self.target
    }

    pub async fn probe(&self) -> Result<ProbeReport, ForwardError> {
        let uri = self.target.join(&self.path, None)?;
        let request = Request::builder()
            .method("GET")
            .uri(uri.clone())
            .header(header::HOST, self.target.host_header())
            .header(header::USER_AGENT, "api-gateway-probe")
            .body(Body::empty())?;

        let response = with_deadline(&self.timeouts, self.client.request(request)).await?;
        let status = response.status();

        // Body read is bounded by the same deadline.
        let limit = self.timeouts.upstream();
        let body = match tokio::time::timeout(
            limit,
            Limited::new(response.into_body(), MAX_PROBE_BODY).collect(),
        )
        .await
        {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => return Err(ForwardError::Transport(e.to_string())),
            Err(_) => return Err(ForwardError::Timeout(limit)),
        };

        if status.is_success() {
            tracing::debug!(uri = %uri, status = %status, "Backend probe succeeded");
        } else {
            tracing::warn!(uri = %uri, status = %status, "Backend probe returned non-success status");
        }

        Ok(ProbeReport { status, body })
    }
}
