//! Concurrent structures shared by every task of one crawl.

use std::collections::HashMap;

use dashmap::{DashMap, DashSet};

use crate::models::CrawlResult;

/// URLs that some task has claimed.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: DashSet<String>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `url`. Returns `true` for exactly one caller per URL; that
    /// caller owns processing it.
    pub fn mark(&self, url: &str) -> bool {
        // Cheap read first: most links point at pages already claimed.
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Running word totals.
#[derive(Debug, Default)]
pub struct WordAggregator {
    counts: DashMap<String, u64>,
}

impl WordAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to `word`'s total.
    pub fn add(&self, word: String, count: u64) {
        *self.counts.entry(word).or_insert(0) += count;
    }

    /// Add every count from one page.
    pub fn merge(&self, page_counts: HashMap<String, u64>) {
        for (word, count) in page_counts {
            self.add(word, count);
        }
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts.get(word).map(|c| *c)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Consume the aggregator, yielding every `(word, total)`.
    pub fn into_totals(self) -> impl Iterator<Item = (String, u64)> {
        self.counts.into_iter()
    }
}

/// Registry and aggregator for one `crawl` call.
#[derive(Debug, Default)]
pub struct CrawlState {
    pub visited: VisitedRegistry,
    pub words: WordAggregator,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the final result once every task has finished.
    pub fn into_result(self, popular_word_count: usize) -> CrawlResult {
        let urls_visited = self.visited.len();
        CrawlResult::new(self.words.into_totals(), urls_visited, popular_word_count)
    }
}
