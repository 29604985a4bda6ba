//! Route rules and path rewriting.
//!
//! # Design Decisions
//! - Prefix match is case-sensitive and respects segment boundaries:
//!   `/api` matches `/api` and `/api/x`, never `/apix`
//! - Rewrite removes the strip prefix once; an absent prefix is a no-op
//! - The query string is carried over untouched

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderValue, Uri};
use url::Url;

use crate::config::validation::ValidationError;
use crate::config::RouteConfig;

/// Absolute backend origin (scheme, authority, optional base path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOrigin {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
}

impl TargetOrigin {
    /// Parse and check a backend URL such as `http://127.0.0.1:3000`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidBackendUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        };
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("credentials are not allowed in the backend url"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed in the backend url"));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            scheme,
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Value for the outbound `Host` header.
    pub fn host_header(&self) -> HeaderValue {
        // Authority has already been validated as header-safe text.
        HeaderValue::from_str(self.authority.as_str())
            .unwrap_or_else(|_| HeaderValue::from_static("localhost"))
    }

    /// Build the absolute outbound URI for an already rewritten path.
    pub fn join(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let mut path_and_query = String::with_capacity(
            self.base_path.len() + path.len() + query.map_or(0, |q| q.len() + 1),
        );
        path_and_query.push_str(&self.base_path);
        path_and_query.push_str(path);
        if let Some(query) = query {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)
    }
}

/// A compiled route: which paths it takes and how it rewrites them.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub name: String,
    pub match_prefix: String,
    pub strip_prefix: String,
    pub target_origin: TargetOrigin,
}

impl RouteRule {
    pub fn from_config(config: &RouteConfig, target_origin: TargetOrigin) -> Self {
        Self {
            name: config.name.clone(),
            match_prefix: config.match_prefix.clone(),
            strip_prefix: config.effective_strip_prefix().to_string(),
            target_origin,
        }
    }

    /// Returns true if `path` falls under this rule's prefix.
    pub fn matches(&self, path: &str) -> bool {
        let prefix = self.match_prefix.as_str();
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || prefix.ends_with('/') || rest.starts_with('/'),
            None => false,
        }
    }

    pub fn rewrite_path<'a>(&self, path: &'a str) -> Cow<'a, str> {
        rewrite_path(path, &self.strip_prefix)
    }

    /// Outbound URI for an inbound path and query.
    pub fn target_uri(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        self.target_origin.join(&self.rewrite_path(path), query)
    }
}

/// Remove `strip_prefix` from the front of `path` exactly once.
///
/// The result always starts with `/`. A path that does not carry the
/// prefix is returned unchanged.
pub fn rewrite_path<'a>(path: &'a str, strip_prefix: &str) -> Cow<'a, str> {
    if strip_prefix.is_empty() {
        return Cow::Borrowed(path);
    }
    match path.strip_prefix(strip_prefix) {
        None => Cow::Borrowed(path),
        Some("") => Cow::Borrowed("/"),
        Some(rest) if rest.starts_with('/') => Cow::Borrowed(rest),
        Some(rest) => Cow::Owned(format!("/{rest}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrefixRewrite;

    fn rule(prefix: &str, rewrite: PrefixRewrite) -> RouteRule {
        let config = RouteConfig {
            name: "test".into(),
            match_prefix: prefix.into(),
            rewrite,
            strip_prefix: None,
        };
        RouteRule::from_config(&config, TargetOrigin::parse("http://backend:3000").unwrap())
    }

    #[test]
    fn test_rewrite_strips_once() {
        assert_eq!(rewrite_path("/api/upload", "/api"), "/upload");
        assert_eq!(rewrite_path("/api/api/upload", "/api"), "/api/upload");
        assert_eq!(rewrite_path("/api", "/api"), "/");
        assert_eq!(rewrite_path("/api/", "/api"), "/");
        assert_eq!(rewrite_path("/api/file/42", "/api/"), "/file/42");
    }

    #[test]
    fn test_rewrite_absent_prefix_is_noop() {
        assert_eq!(rewrite_path("/upload", "/api"), "/upload");
        assert_eq!(rewrite_path("/other/api", "/api"), "/other/api");
        assert_eq!(rewrite_path("/api/upload", ""), "/api/upload");

        let once = rewrite_path("/api/health", "/api").into_owned();
        let twice = rewrite_path(&once, "/api");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_path_matcher() {
        let api = rule("/api", PrefixRewrite::Strip);
        assert!(api.matches("/api"));
        assert!(api.matches("/api/"));
        assert!(api.matches("/api/file/1"));
        assert!(!api.matches("/apix"));
        assert!(!api.matches("/API/file"));
        assert!(!api.matches("/health"));

        let root = rule("/", PrefixRewrite::Preserve);
        assert!(root.matches("/anything/at/all"));
    }

    #[test]
    fn test_target_uri_strip_and_preserve() {
        let strip = rule("/api", PrefixRewrite::Strip);
        assert_eq!(
            strip.target_uri("/api/upload", Some("a=1&b=2")).unwrap().to_string(),
            "http://backend:3000/upload?a=1&b=2"
        );

        let keep = rule("/api", PrefixRewrite::Preserve);
        assert_eq!(
            keep.target_uri("/api/upload", None).unwrap().to_string(),
            "http://backend:3000/api/upload"
        );
    }

    #[test]
    fn test_target_origin_parse() {
        let origin = TargetOrigin::parse("https://files.internal:8443/v1/").unwrap();
        assert_eq!(origin.authority().as_str(), "files.internal:8443");
        assert_eq!(origin.to_string(), "https://files.internal:8443/v1");
        assert_eq!(
            origin.join("/upload", None).unwrap().to_string(),
            "https://files.internal:8443/v1/upload"
        );

        let plain = TargetOrigin::parse("http://localhost").unwrap();
        assert_eq!(plain.host_header(), "localhost");

        assert!(matches!(
            TargetOrigin::parse("http://user:pw@backend"),
            Err(ValidationError::InvalidBackendUrl { .. })
        ));
        assert!(matches!(
            TargetOrigin::parse("http://backend:3000/?token=abc"),
            Err(ValidationError::InvalidBackendUrl { .. })
        ));
        assert!(matches!(
            TargetOrigin::parse("http://backend:3000#section"),
            Err(ValidationError::InvalidBackendUrl { .. })
        ));
        assert_eq!(
            TargetOrigin::parse("ws://backend"),
            Err(ValidationError::UnsupportedScheme("ws".into()))
        );
    }
}
