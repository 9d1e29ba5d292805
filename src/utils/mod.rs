//! Utility functions and helpers.

pub mod clock;
pub mod http;

use regex::Regex;
use url::Url;

use crate::error::Result;

pub use clock::{Clock, ManualClock, SystemClock};

/// Resolve a potentially relative link against a base URL.
///
/// Returns `None` when the link does not parse or its scheme is not in
/// `schemes`. The fragment is dropped.
pub fn resolve_link(base: &Url, href: &str, schemes: &[&str]) -> Option<String> {
    let mut link = base.join(href.trim()).ok()?;
    if !schemes.contains(&link.scheme()) {
        return None;
    }
    link.set_fragment(None);
    Some(link.to_string())
}

/// Compile a pattern so that it only matches an entire input string.
pub fn compile_full_match(pattern: &str) -> Result<Regex> {
    // Validate the pattern alone first so the error points at the user's text.
    Regex::new(pattern)?;
    Ok(Regex::new(&format!("^(?:{pattern})$"))?)
}

/// Whether `text` fully matches any of the given patterns.
pub fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}
