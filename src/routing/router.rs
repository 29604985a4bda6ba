//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for an inbound path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest prefix wins; O(n) scan is fine for a handful of prefixes
//! - Explicit None rather than silent default

use crate::config::RouteConfig;
use crate::routing::rule::{RouteRule, TargetOrigin};

/// Compiled, read-only route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Compile route configs against the single backend origin.
    pub fn from_config(routes: &[RouteConfig], target: &TargetOrigin) -> Self {
        let mut rules: Vec<RouteRule> = routes
            .iter()
            .map(|route| RouteRule::from_config(route, target.clone()))
            .collect();
        rules.sort_by(|a, b| b.match_prefix.len().cmp(&a.match_prefix.len()));

        for rule in &rules {
            tracing::debug!(
                route = %rule.name,
                match_prefix = %rule.match_prefix,
                strip_prefix = %rule.strip_prefix,
                upstream = %rule.target_origin,
                "Route compiled"
            );
        }

        Self { rules }
    }

    /// Find the rule responsible for `path`.
    pub fn match_path(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrefixRewrite;

    fn route(name: &str, prefix: &str) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            match_prefix: prefix.into(),
            rewrite: PrefixRewrite::Strip,
            strip_prefix: None,
        }
    }

    #[test]
    fn test_longest_prefix_wins() {
        let target = TargetOrigin::parse("http://127.0.0.1:3000").unwrap();
        let table = RouteTable::from_config(
            &[route("api", "/api"), route("uploads", "/api/upload"), route("root", "/")],
            &target,
        );

        assert_eq!(table.match_path("/api/upload/big").unwrap().name, "uploads");
        assert_eq!(table.match_path("/api/file/7").unwrap().name, "api");
        assert_eq!(table.match_path("/elsewhere").unwrap().name, "root");
    }

    #[test]
    fn test_no_match() {
        let target = TargetOrigin::parse("http://127.0.0.1:3000").unwrap();
        let table = RouteTable::from_config(&[route("api", "/api")], &target);
        assert!(table.match_path("/apidocs").is_none());
        assert!(table.match_path("/").is_none());
        assert_eq!(table.rules().len(), 1);
    }
}
