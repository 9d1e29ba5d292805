//! Crawl engines.
//!
//! Both implementations follow the same per-URL rules (see [`Frontier`]):
//! a URL is processed only while depth remains, before the deadline, when
//! it matches no ignore pattern, and only by the first task to claim it.

mod parallel;
mod sequential;
mod state;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::error::Result;
use crate::models::{Config, CrawlResult, Implementation};
use crate::profiler::{CapabilitySet, Operation, Profiled};
use crate::services::PageResolver;
use crate::utils::{Clock, matches_any};

pub use parallel::{CrawlTask, ParallelCrawler};
pub use sequential::SequentialCrawler;
pub use state::{CrawlState, VisitedRegistry, WordAggregator};

const CRAWL: &str = "crawl(&[String])";
const MAX_PARALLELISM: &str = "max_parallelism()";

/// Operations of [`WebCrawler`] as seen by the profiler.
pub static WEB_CRAWLER: CapabilitySet = CapabilitySet::new(
    "WebCrawler",
    &[
        Operation::measured(CRAWL),
        Operation::passthrough(MAX_PARALLELISM),
    ],
);

/// Crawls from seed URLs and reports popular words.
pub trait WebCrawler: Send + Sync {
    /// Crawl every seed in order and collect the result.
    fn crawl(&self, seeds: &[String]) -> CrawlResult;

    /// Worker threads this crawler uses.
    fn max_parallelism(&self) -> usize;
}

impl<T: WebCrawler + ?Sized> WebCrawler for Box<T> {
    fn crawl(&self, seeds: &[String]) -> CrawlResult {
        (**self).crawl(seeds)
    }

    fn max_parallelism(&self) -> usize {
        (**self).max_parallelism()
    }
}

impl<T: WebCrawler> WebCrawler for Profiled<T> {
    fn crawl(&self, seeds: &[String]) -> CrawlResult {
        self.call(CRAWL, |inner| inner.crawl(seeds))
    }

    fn max_parallelism(&self) -> usize {
        self.call(MAX_PARALLELISM, |inner| inner.max_parallelism())
    }
}

/// Crawl limits shared by both implementations.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub timeout: Duration,
    pub max_depth: usize,
    pub popular_word_count: usize,
    pub ignored_urls: Vec<Regex>,
    /// Requested worker count; 0 means available parallelism
    pub parallelism: usize,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            timeout: config.timeout(),
            max_depth: config.max_depth,
            popular_word_count: config.popular_word_count,
            ignored_urls: config.ignored_url_patterns()?,
            parallelism: config.parallelism,
        })
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_depth: 10,
            popular_word_count: 10,
            ignored_urls: Vec::new(),
            parallelism: 0,
        }
    }
}

/// Build the crawler selected by `implementation`.
pub fn build_crawler(
    implementation: Implementation,
    settings: CrawlSettings,
    clock: Arc<dyn Clock>,
    resolver: Arc<dyn PageResolver>,
) -> Result<Box<dyn WebCrawler>> {
    Ok(match implementation {
        Implementation::Parallel => Box::new(ParallelCrawler::new(settings, clock, resolver)?),
        Implementation::Sequential => Box::new(SequentialCrawler::new(settings, clock, resolver)),
    })
}

/// Hardware threads available to this process.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Everything a crawl task borrows from its crawl call.
pub struct Frontier<'a> {
    pub clock: &'a dyn Clock,
    pub resolver: &'a dyn PageResolver,
    pub ignored_urls: &'a [Regex],
    pub state: &'a CrawlState,
    pub deadline: Instant,
}

impl Frontier<'_> {
    /// Decide whether the caller may process `url`, claiming it if so.
    ///
    /// Only the claim itself mutates state; every rejected URL leaves the
    /// registry and aggregator untouched.
    pub fn admit(&self, url: &str, remaining_depth: usize) -> bool {
        if remaining_depth == 0 || self.clock.now() > self.deadline {
            return false;
        }
        if matches_any(self.ignored_urls, url) {
            log::debug!("Ignoring {url}");
            return false;
        }
        self.state.visited.mark(url)
    }

    /// Resolve a claimed URL, merge its words and return its links.
    ///
    /// A failed or panicking resolution is logged and yields no links; it
    /// never reaches sibling tasks.
    pub fn visit(&self, url: &str) -> Vec<String> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.resolver.resolve(url)));
        match outcome {
            Ok(Ok(page)) => {
                log::debug!("Visited {url} ({} links)", page.links.len());
                self.state.words.merge(page.word_counts);
                page.links
            }
            Ok(Err(e)) => {
                log::warn!("Failed to resolve {url}: {e}");
                Vec::new()
            }
            Err(payload) => {
                log::warn!("Resolver panicked on {url}: {}", panic_message(payload));
                Vec::new()
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic payload".to_string()
    }
}
