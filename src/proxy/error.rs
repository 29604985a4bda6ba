//! Forwarding failures.

use std::error::Error as StdError;
use std::time::Duration;

use axum::http::StatusCode;
use hyper_util::client::legacy;
use thiserror::Error;

/// Why a forward attempt produced no backend response.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Connection refused, DNS failure, TLS handshake failure.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The connection was established but the exchange failed.
    #[error("backend connection failed: {0}")]
    Transport(String),

    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),

    /// The outbound request could not be assembled.
    #[error("invalid outbound request: {0}")]
    InvalidRequest(String),
}

impl ForwardError {
    /// Classify a client error. Connect attempts that ran out of
    /// `connect_timeout` count as timeouts, not as an unreachable backend.
    pub(crate) fn from_client(err: &legacy::Error, connect_timeout: Duration) -> Self {
        classify(err, err.is_connect(), connect_timeout)
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "unreachable",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Status returned to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show any client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "Backend service is unreachable",
            Self::Transport(_) => "Connection to backend service failed",
            Self::Timeout(_) => "Backend service did not respond in time",
            Self::InvalidRequest(_) => "Request could not be forwarded",
        }
    }
}

impl From<axum::http::Error> for ForwardError {
    fn from(err: axum::http::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

fn classify(err: &(dyn StdError + 'static), is_connect: bool, connect_timeout: Duration) -> ForwardError {
    if is_connect && timed_out(err) {
        return ForwardError::Timeout(connect_timeout);
    }
    let detail = describe(err);
    if is_connect {
        ForwardError::Unreachable(detail)
    } else {
        ForwardError::Transport(detail)
    }
}

fn timed_out(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
            || cause.is::<tokio::time::error::Elapsed>()
        {
            return true;
        }
        current = cause.source();
    }
    false
}

/// Flatten an error and its sources into one line.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
