//! The `Rule` abstraction and the simple rules built on it.
//!
//! # Responsibilities
//! - Decide whether a request belongs to a route (`matches`)
//! - Rewrite the public path into a backend path (`process`)
//! - Restore backend-authored paths to public ones (`revert`)
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - Rules are immutable once built and shared across request tasks
//! - `revert(process(p)) == p` for every path a rule matches

use axum::body::Body;
use axum::http::{header, uri::Authority, Request};

use crate::routing::error::RuleResult;

/// A routing predicate paired with a reversible path transformation.
pub trait Rule: Send + Sync + std::fmt::Debug {
    /// Returns true if the request belongs to this rule.
    fn matches(&self, req: &Request<Body>) -> bool;

    /// Rewrites a matched public path into the path the backend sees.
    fn process(&self, path: &str) -> RuleResult<String> {
        Ok(path.to_string())
    }

    /// Restores a backend-relative path to its public form.
    fn revert(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Matches every request and leaves paths untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptEverythingRule;

impl Rule for AcceptEverythingRule {
    fn matches(&self, _req: &Request<Body>) -> bool {
        true
    }
}

/// Matches the Host header.
#[derive(Debug, Clone)]
pub struct HostRule {
    expected_host: String,
    has_port: bool,
}

impl HostRule {
    /// Create a new host rule.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        let expected_host = host.into().to_lowercase();
        let has_port = expected_host
            .parse::<Authority>()
            .map(|a| a.port().is_some())
            .unwrap_or(false);
        Self { expected_host, has_port }
    }

    /// The lowercase host this rule matches.
    pub fn host(&self) -> &str {
        &self.expected_host
    }

    fn matches_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        if host == self.expected_host {
            return true;
        }
        // "example.com" also matches "example.com:8080"
        !self.has_port
            && host
                .parse::<Authority>()
                .map(|a| a.host() == self.expected_host)
                .unwrap_or(false)
    }
}

impl Rule for HostRule {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.headers()
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| req.uri().authority().map(|a| a.as_str()))
            .map(|h| self.matches_host(h))
            .unwrap_or(false)
    }
}

/// Combines multiple rules with AND semantics.
///
/// Paths are processed through the rules in order and reverted in the
/// opposite order, so the pair stays an identity on matching paths.
#[derive(Debug)]
pub struct CompositeRule {
    rules: Vec<Box<dyn Rule>>,
}

impl CompositeRule {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Rule for CompositeRule {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.rules.iter().all(|r| r.matches(req))
    }

    fn process(&self, path: &str) -> RuleResult<String> {
        self.rules
            .iter()
            .try_fold(path.to_string(), |path, rule| rule.process(&path))
    }

    fn revert(&self, path: &str) -> String {
        self.rules
            .iter()
            .rev()
            .fold(path.to_string(), |path, rule| rule.revert(&path))
    }
}
