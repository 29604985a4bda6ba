//! Request forwarding to the backend.
//!
//! # State Machine (per forward call)
//! ```text
//! Idle → Sending → Relaying        (backend answered; body streams to client)
//!           └────→ Failed          (unreachable, transport error, timeout)
//! ```
//!
//! `Sending` covers connect, request write and waiting for response headers,
//! all under one deadline. If the client goes away while `Sending`, the
//! handler future is dropped, which drops the outbound request and closes
//! its connection. Once `Relaying`, status and headers are already on their
//! way to the client; a body error only terminates the stream.

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use http_body_util::BodyExt;
use hyper::body::Incoming;

use crate::config::TimeoutConfig;
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::proxy::client::{build_client, UpstreamClient};
use crate::proxy::error::ForwardError;
use crate::resilience::timeouts::with_deadline;
use crate::routing::RouteRule;
use crate::security::headers::{amend_request_headers, strip_hop_by_hop, ForwardedContext};

/// Outcome of one forward attempt.
pub type RelayResult = Result<Response<Body>, ForwardError>;

/// Progress of a single forward call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardState {
    Idle,
    Sending,
    Relaying,
    Failed,
}

/// Tracks one forward call and notices when it is abandoned mid-flight.
struct ForwardAttempt {
    request_id: String,
    state: ForwardState,
}

impl ForwardAttempt {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            state: ForwardState::Idle,
        }
    }

    fn advance(&mut self, next: ForwardState) {
        tracing::trace!(
            request_id = %self.request_id,
            from = ?self.state,
            to = ?next,
            "Forward state change"
        );
        self.state = next;
    }
}

impl Drop for ForwardAttempt {
    fn drop(&mut self) {
        if self.state == ForwardState::Sending {
            metrics::record_client_disconnect();
            tracing::info!(
                request_id = %self.request_id,
                "Client disconnected before backend responded, outbound request cancelled"
            );
        }
    }
}

/// Forwards inbound requests to the backend named by a [`RouteRule`].
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    timeouts: TimeoutConfig,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        Self::with_client(build_client(timeouts), timeouts.clone())
    }

    pub fn with_client(client: UpstreamClient, timeouts: TimeoutConfig) -> Self {
        Self { client, timeouts }
    }

    /// Forward `request` under `rule` and hand back the backend response.
    ///
    /// Never retries. Fails with [`ForwardError::Timeout`] if response
    /// headers do not arrive within the configured deadline.
    pub async fn forward(
        &self,
        request: Request<Body>,
        rule: &RouteRule,
        client_addr: Option<SocketAddr>,
    ) -> RelayResult {
        let mut attempt = ForwardAttempt::new(request_id(&request));
        let method = request.method().clone();

        let outbound = match build_outbound(request, rule, client_addr) {
            Ok(req) => req,
            Err(e) => {
                attempt.advance(ForwardState::Failed);
                tracing::error!(request_id = %attempt.request_id, error = %e, "Could not build outbound request");
                return Err(e);
            }
        };
        let target = outbound.uri().clone();

        tracing::debug!(
            request_id = %attempt.request_id,
            method = %method,
            route = %rule.name,
            upstream = %target,
            "Forwarding request"
        );

        attempt.advance(ForwardState::Sending);
        match with_deadline(&self.timeouts, self.client.request(outbound)).await {
            Ok(response) => {
                attempt.advance(ForwardState::Relaying);
                tracing::debug!(
                    request_id = %attempt.request_id,
                    status = %response.status(),
                    "Backend responded"
                );
                Ok(relay_response(response, attempt.request_id.clone()))
            }
            Err(e) => {
                attempt.advance(ForwardState::Failed);
                metrics::record_upstream_failure(e.kind());
                tracing::error!(
                    request_id = %attempt.request_id,
                    upstream = %target,
                    kind = e.kind(),
                    error = %e,
                    "Upstream error"
                );
                Err(e)
            }
        }
    }
}

/// Turn an inbound request into the request sent to the backend.
pub fn build_outbound(
    request: Request<Body>,
    rule: &RouteRule,
    client_addr: Option<SocketAddr>,
) -> Result<Request<Body>, ForwardError> {
    let (parts, body) = request.into_parts();
    let forwarded = ForwardedContext::capture(&parts, client_addr);
    let uri = rule.target_uri(parts.uri.path(), parts.uri.query())?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    amend_request_headers(&mut headers, &forwarded);
    headers.insert(header::HOST, rule.target_origin.host_header());

    let body = if parts.method == Method::GET || parts.method == Method::HEAD {
        headers.remove(header::CONTENT_LENGTH);
        Body::empty()
    } else {
        body
    };

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = uri;
    *outbound.headers_mut() = headers;
    Ok(outbound)
}

fn relay_response(response: Response<Incoming>, request_id: String) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);

    let body = body.map_err(move |e| {
        tracing::warn!(
            request_id = %request_id,
            error = %e,
            "Backend body failed mid-stream, closing client connection"
        );
        e
    });
    Response::from_parts(parts, Body::new(body))
}
