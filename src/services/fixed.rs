//! In-memory page resolver for crawl tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::error::{AppError, Result};
use crate::models::Page;
use crate::services::PageResolver;

/// Serves pages from a fixed map and counts how often each URL is resolved.
///
/// Unknown URLs resolve to an error.
#[derive(Debug, Default)]
pub struct StaticResolver {
    pages: HashMap<String, Page>,
    hits: DashMap<String, usize>,
    total_hits: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page with the given words and links.
    pub fn with_page(mut self, url: &str, words: &[(&str, u64)], links: &[&str]) -> Self {
        let word_counts = words.iter().map(|(w, c)| (w.to_string(), *c)).collect();
        let links = links.iter().map(|l| l.to_string()).collect();
        self.pages.insert(url.to_string(), Page::new(word_counts, links));
        self
    }

    /// How many times `url` was resolved.
    pub fn hits(&self, url: &str) -> usize {
        self.hits.get(url).map(|h| *h).unwrap_or(0)
    }

    /// Resolutions across all URLs.
    pub fn total_hits(&self) -> usize {
        self.total_hits.load(Ordering::SeqCst)
    }
}

impl PageResolver for StaticResolver {
    fn resolve(&self, url: &str) -> Result<Page> {
        *self.hits.entry(url.to_string()).or_insert(0) += 1;
        self.total_hits.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::resolve(url, "no such page"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serves_known_pages_and_counts_hits() {
        let resolver = StaticResolver::new().with_page("a", &[("x", 2)], &["b"]);

        let page = resolver.resolve("a").unwrap();
        assert_eq!(page.word_counts.get("x"), Some(&2));
        assert_eq!(page.links, vec!["b".to_string()]);

        assert!(matches!(resolver.resolve("b"), Err(AppError::Resolve { .. })));
        assert_eq!(resolver.hits("a"), 1);
        assert_eq!(resolver.hits("b"), 1);
        assert_eq!(resolver.total_hits(), 2);
    }
}
