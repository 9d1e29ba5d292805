//! Parsed page data.

use std::collections::HashMap;

/// What a page resolver returns for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Occurrences of each word on the page
    pub word_counts: HashMap<String, u64>,

    /// Absolute outbound links, in document order
    pub links: Vec<String>,
}

impl Page {
    /// Create a page from its parts.
    pub fn new(word_counts: HashMap<String, u64>, links: Vec<String>) -> Self {
        Self { word_counts, links }
    }
}
