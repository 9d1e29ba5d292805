//! Crawl result and popular-word ranking.

use std::cmp::Ordering;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Outcome of one crawl. Built once, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    word_counts: Vec<(String, u64)>,
    urls_visited: usize,
}

impl CrawlResult {
    /// Build a result from raw totals, keeping the `popular_word_count`
    /// highest-ranked words.
    pub fn new(
        totals: impl IntoIterator<Item = (String, u64)>,
        urls_visited: usize,
        popular_word_count: usize,
    ) -> Self {
        Self {
            word_counts: top_words(totals, popular_word_count),
            urls_visited,
        }
    }

    /// Ranked `(word, count)` pairs, most popular first.
    pub fn word_counts(&self) -> &[(String, u64)] {
        &self.word_counts
    }

    /// Number of distinct URLs processed.
    pub fn urls_visited(&self) -> usize {
        self.urls_visited
    }
}

impl Serialize for CrawlResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // `wordCounts` is written as a JSON object in rank order.
        struct Ranked<'a>(&'a [(String, u64)]);

        impl Serialize for Ranked<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_map(self.0.iter().map(|(w, c)| (w, c)))
            }
        }

        let mut state = serializer.serialize_struct("CrawlResult", 2)?;
        state.serialize_field("wordCounts", &Ranked(&self.word_counts))?;
        state.serialize_field("urlsVisited", &self.urls_visited)?;
        state.end()
    }
}

/// Ranking order for popular words: higher count first, then longer word
/// (in characters) first, then lexicographic.
pub fn rank(a: &(String, u64), b: &(String, u64)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| b.0.chars().count().cmp(&a.0.chars().count()))
        .then_with(|| a.0.cmp(&b.0))
}

/// Select the `limit` highest-ranked words.
pub fn top_words(totals: impl IntoIterator<Item = (String, u64)>, limit: usize) -> Vec<(String, u64)> {
    let mut words: Vec<(String, u64)> = totals.into_iter().collect();
    words.sort_unstable_by(rank);
    words.truncate(limit);
    words
}
