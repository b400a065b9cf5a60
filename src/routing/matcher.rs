//! Route matching logic.
//!
//! # Responsibilities
//! - Match a request path exactly (case-insensitive)
//! - Match a request path against a pattern (case-insensitive)
//!
//! # Design Decisions
//! - Paths are lowercased once by the table; exact matchers store lowercased text
//! - Patterns are compiled case-insensitive so their source casing is irrelevant
//! - A matcher looks at the path only, never at host or headers

use regex::{Regex, RegexBuilder};

/// A path condition of a route entry.
#[derive(Debug, Clone)]
pub enum RouteMatcher {
    /// Whole-path equality, case-folded.
    Exact(String),
    /// Regular expression searched in the path.
    Pattern(Regex),
}

impl RouteMatcher {
    pub fn exact(path: &str) -> Self {
        RouteMatcher::Exact(path.to_lowercase())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(RouteMatcher::Pattern)
    }

    /// `lowered_path` must already be lowercase.
    pub fn matches(&self, lowered_path: &str) -> bool {
        match self {
            RouteMatcher::Exact(path) => path == lowered_path,
            RouteMatcher::Pattern(regex) => regex.is_match(lowered_path),
        }
    }
}

impl std::fmt::Display for RouteMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteMatcher::Exact(path) => write!(f, "{path}"),
            RouteMatcher::Pattern(regex) => write!(f, "/{}/i", regex.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matcher_is_case_folded() {
        let matcher = RouteMatcher::exact("/Robots.TXT");
        assert!(matcher.matches("/robots.txt"));
        assert!(!matcher.matches("/robots.txt/extra"));
    }

    #[test]
    fn pattern_matcher_ignores_case() {
        let matcher = RouteMatcher::pattern(r"^/redirectTo/").unwrap();
        assert!(matcher.matches("/redirectto/mylistdetailpage"));
        assert!(!matcher.matches("/catalog/redirectto/"));
    }

    #[test]
    fn relay_style_pattern_requires_segment_boundary() {
        let matcher = RouteMatcher::pattern(r"^/api(/|$)").unwrap();
        assert!(matcher.matches("/api"));
        assert!(matcher.matches("/api/v1/carts"));
        assert!(!matcher.matches("/apiary"));
    }
}
