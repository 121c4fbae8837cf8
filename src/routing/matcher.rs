//! Request matching logic.
//!
//! # Responsibilities
//! - Match the target hostname (exact match, case-insensitive)
//! - Match the target path prefix (case-insensitive)
//!
//! # Design Decisions
//! - Hostnames are compared case-insensitively
//! - Path prefixes are also case-insensitive so `/IMAGE` is intercepted too
//! - No regex to guarantee O(n) matching

use crate::http::ProxyRequest;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &ProxyRequest) -> bool;
}

/// Matches the hostname of an absolute request target.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_ascii_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &ProxyRequest) -> bool {
        req.host()
            .map(|h| h.eq_ignore_ascii_case(&self.expected_host))
            .unwrap_or(false)
    }
}

/// Matches the request path prefix, ignoring ASCII case.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_ascii_lowercase(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &ProxyRequest) -> bool {
        let path = req.path().as_bytes();
        path.len() >= self.prefix.len()
            && path[..self.prefix.len()].eq_ignore_ascii_case(self.prefix.as_bytes())
    }
}
