//! URL matching logic.
//!
//! # Responsibilities
//! - Decide whether a logger observes a given outbound URL
//! - Regular expression search over the full URL
//! - Cheap prefix and host checks for the common cases
//!
//! # Design Decisions
//! - Matchers see the URL exactly as logged (`scheme://host[:port]/path?query`)
//! - Host matching is case-insensitive (RFC 3986 hosts)
//! - Regex matching is an unanchored search, anchors are up to the pattern

use regex::Regex;
use url::Url;

/// Trait for matching outbound URLs.
pub trait UrlMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if calls to this URL should be logged.
    fn matches(&self, url: &str) -> bool;
}

/// Matches URLs against a regular expression.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pattern: Regex,
}

impl RegexMatcher {
    /// Compile a new regex matcher.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl UrlMatcher for RegexMatcher {
    fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

/// Matches URLs starting with a fixed prefix.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefix: String,
}

impl PrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl UrlMatcher for PrefixMatcher {
    fn matches(&self, url: &str) -> bool {
        url.starts_with(&self.prefix)
    }
}

/// Matches the URL host.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl UrlMatcher for HostMatcher {
    fn matches(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h == self.expected_host))
            .unwrap_or(false)
    }
}
