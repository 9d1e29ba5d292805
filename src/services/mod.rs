//! Page resolution services.
//!
//! - `PageResolver`: the capability the crawl engine reads pages through
//! - `HtmlPageResolver`: fetches `http(s)://` and `file:` URLs and parses HTML

mod html;
#[cfg(test)]
mod fixed;

use std::sync::Arc;

use crate::error::Result;
use crate::models::Page;
use crate::profiler::{CapabilitySet, Operation, Profiled};

#[cfg(test)]
pub use fixed::StaticResolver;
pub use html::{HtmlPageResolver, parse_page};

const RESOLVE: &str = "resolve(&str)";

/// Operations of [`PageResolver`] as seen by the profiler.
pub static PAGE_RESOLVER: CapabilitySet =
    CapabilitySet::new("PageResolver", &[Operation::measured(RESOLVE)]);

/// Turns a URL into its words and outbound links.
///
/// Implementations must not touch crawl state and may be called from many
/// threads at once for different URLs.
pub trait PageResolver: Send + Sync {
    fn resolve(&self, url: &str) -> Result<Page>;
}

impl<T: PageResolver + ?Sized> PageResolver for Arc<T> {
    fn resolve(&self, url: &str) -> Result<Page> {
        (**self).resolve(url)
    }
}

impl<T: PageResolver> PageResolver for Profiled<T> {
    fn resolve(&self, url: &str) -> Result<Page> {
        self.call(RESOLVE, |inner| inner.resolve(url))
    }
}
