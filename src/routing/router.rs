//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store route entries in registration order
//! - Look up the first entry whose matcher accepts the path
//! - Return the matched handler or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) scan; first match wins, so specific paths go before broad patterns
//! - Duplicate registrations are kept; the earlier one shadows the later
//! - No match means the caller falls back to the page renderer

use crate::routing::matcher::RouteMatcher;

/// One (matcher, handler) pair.
#[derive(Debug, Clone)]
pub struct RouteEntry<H> {
    pub matcher: RouteMatcher,
    pub handler: H,
}

/// Ordered route table.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    entries: Vec<RouteEntry<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, matcher: RouteMatcher, handler: H) -> &mut Self {
        self.entries.push(RouteEntry { matcher, handler });
        self
    }

    pub fn add_exact(&mut self, path: &str, handler: H) -> &mut Self {
        self.add(RouteMatcher::exact(path), handler)
    }

    pub fn add_pattern(&mut self, pattern: &str, handler: H) -> Result<&mut Self, regex::Error> {
        Ok(self.add(RouteMatcher::pattern(pattern)?, handler))
    }

    /// The handler of the first entry matching `path`.
    pub fn match_path(&self, path: &str) -> Option<&H> {
        let lowered = path.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.matcher.matches(&lowered))
            .map(|entry| &entry.handler)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RouteEntry<H>] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        table.add_exact("/robots.txt", "robots");
        table.add_pattern(r"^/sitemap.*\.xml", "sitemap").unwrap();
        table.add_pattern(r"^/api(/|$)", "relay").unwrap();
        table.add_pattern(r"^/api/v1/special", "special").unwrap();
        table.add_exact("/robots.txt", "shadowed");
        table
    }

    #[test]
    fn first_registered_match_wins() {
        let table = table();
        assert_eq!(table.match_path("/api/v1/special"), Some(&"relay"));
        assert_eq!(table.match_path("/ROBOTS.TXT"), Some(&"robots"));
    }

    #[test]
    fn patterns_match_case_insensitively() {
        let table = table();
        assert_eq!(table.match_path("/SiteMap-Products.XML"), Some(&"sitemap"));
    }

    #[test]
    fn unmatched_paths_fall_through() {
        let table = table();
        assert_eq!(table.match_path("/Catalog/Shoes"), None);
        assert_eq!(table.len(), 5);
    }
}
