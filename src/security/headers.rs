//! Header manipulation for forwarded traffic.
//!
//! # Responsibilities
//! - Add X-Forwarded-Host, X-Forwarded-Proto, X-Forwarded-For
//! - Mark requests as coming through the gateway
//! - Strip hop-by-hop headers in both directions
//!
//! # Design Decisions
//! - Gateway-owned headers overwrite client-supplied copies
//! - X-Forwarded-For is appended to, not replaced
//! - Content-Encoding is never touched; the body is relayed as received

use std::net::SocketAddr;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::request::Parts;

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_ORIGINAL_HOST: HeaderName = HeaderName::from_static("x-original-host");
pub const X_GATEWAY_REQUEST: HeaderName = HeaderName::from_static("x-gateway-request");

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    KEEP_ALIVE,
    PROXY_CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// What the backend can no longer see directly once a request is proxied.
#[derive(Debug, Clone)]
pub struct ForwardedContext {
    pub original_host: Option<HeaderValue>,
    pub proto: &'static str,
    pub client_addr: Option<SocketAddr>,
}

impl ForwardedContext {
    /// Capture the inbound Host and scheme before the request is rewritten.
    pub fn capture(parts: &Parts, client_addr: Option<SocketAddr>) -> Self {
        let original_host = parts.headers.get(header::HOST).cloned().or_else(|| {
            parts
                .uri
                .authority()
                .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
        });
        let proto = match parts.uri.scheme_str() {
            Some("https") => "https",
            _ => "http",
        };

        Self {
            original_host,
            proto,
            client_addr,
        }
    }
}

/// Add forwarding metadata to an outbound request's headers.
pub fn amend_request_headers(headers: &mut HeaderMap, ctx: &ForwardedContext) {
    if let Some(host) = &ctx.original_host {
        headers.insert(X_FORWARDED_HOST, host.clone());
        headers.insert(X_ORIGINAL_HOST, host.clone());
    }
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static(ctx.proto));
    headers.insert(X_GATEWAY_REQUEST, HeaderValue::from_static("true"));

    if let Some(addr) = ctx.client_addr {
        let ip = addr.ip().to_string();
        let chain = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) if !existing.trim().is_empty() => format!("{existing}, {ip}"),
            _ => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&chain) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }
}

/// Remove headers that only describe the current connection.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, host: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_amend_adds_forwarding_metadata() {
        let parts = parts("/api/upload", Some("gateway.example.com"));
        let ctx = ForwardedContext::capture(&parts, Some("10.0.0.7:51000".parse().unwrap()));

        let mut headers = parts.headers.clone();
        headers.insert("x-custom", HeaderValue::from_static("kept"));
        amend_request_headers(&mut headers, &ctx);

        assert_eq!(headers[X_FORWARDED_HOST], "gateway.example.com");
        assert_eq!(headers[X_ORIGINAL_HOST], "gateway.example.com");
        assert_eq!(headers[X_FORWARDED_PROTO], "http");
        assert_eq!(headers[X_GATEWAY_REQUEST], "true");
        assert_eq!(headers[X_FORWARDED_FOR], "10.0.0.7");
        assert_eq!(headers["x-custom"], "kept");
    }

    #[test]
    fn test_forwarded_for_is_appended() {
        let mut parts = parts("/api", Some("gw"));
        parts
            .headers
            .insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9"));
        let ctx = ForwardedContext::capture(&parts, Some("10.0.0.7:1".parse().unwrap()));

        let mut headers = parts.headers.clone();
        amend_request_headers(&mut headers, &ctx);
        assert_eq!(headers[X_FORWARDED_FOR], "203.0.113.9, 10.0.0.7");
    }

    #[test]
    fn test_host_falls_back_to_authority() {
        let parts = parts("https://h2.example.com/api", None);
        let ctx = ForwardedContext::capture(&parts, None);
        assert_eq!(ctx.original_host.unwrap(), "h2.example.com");
        assert_eq!(ctx.proto, "https");
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-session-hop"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-session-hop", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("x-session-hop").is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(headers[header::CONTENT_ENCODING], "gzip");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }
}
