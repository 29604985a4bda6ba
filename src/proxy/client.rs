//! Shared HTTP client for backend requests.
//!
//! One pooled client per process; it is cheap to clone and safe to use
//! from every request task at once.

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::TimeoutConfig;

/// Pooled client speaking http and https to the backend.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the upstream client with the configured connect timeout.
pub fn build_client(timeouts: &TimeoutConfig) -> UpstreamClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(timeouts.connect()));
    http.set_nodelay(true);

    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new()).build(https)
}
