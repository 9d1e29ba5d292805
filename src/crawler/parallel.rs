//! Fork-join crawler on a fixed worker pool.

use std::sync::Arc;

use crate::crawler::{CrawlSettings, CrawlState, Frontier, WebCrawler, available_parallelism};
use crate::error::{AppError, Result};
use crate::models::CrawlResult;
use crate::services::PageResolver;
use crate::utils::Clock;

/// Crawls each seed's link tree in parallel on a `rayon` pool.
///
/// Seeds are handled one at a time; within a seed every page queues one
/// task per outbound link, and the seed finishes once its whole link tree
/// has drained.
pub struct ParallelCrawler {
    settings: CrawlSettings,
    clock: Arc<dyn Clock>,
    resolver: Arc<dyn PageResolver>,
    pool: rayon::ThreadPool,
    parallelism: usize,
}

impl ParallelCrawler {
    /// Create a crawler with `min(settings.parallelism, available)` workers.
    pub fn new(
        settings: CrawlSettings,
        clock: Arc<dyn Clock>,
        resolver: Arc<dyn PageResolver>,
    ) -> Result<Self> {
        let available = available_parallelism();
        let requested = match settings.parallelism {
            0 => available,
            n => n,
        };
        let parallelism = requested.min(available).max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|i| format!("crawl-worker-{i}"))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build worker pool: {e}")))?;

        Ok(Self {
            settings,
            clock,
            resolver,
            pool,
            parallelism,
        })
    }
}

impl WebCrawler for ParallelCrawler {
    fn crawl(&self, seeds: &[String]) -> CrawlResult {
        let deadline = self.clock.now() + self.settings.timeout;
        let state = CrawlState::new();
        let frontier = Frontier {
            clock: self.clock.as_ref(),
            resolver: self.resolver.as_ref(),
            ignored_urls: &self.settings.ignored_urls,
            state: &state,
            deadline,
        };

        log::info!(
            "Crawling {} seed(s) with {} worker(s), max depth {}",
            seeds.len(),
            self.parallelism,
            self.settings.max_depth
        );

        for seed in seeds {
            let root = CrawlTask::new(seed.clone(), self.settings.max_depth, &frontier);
            self.pool.install(|| root.run());
            log::debug!(
                "Seed {seed} finished; {} URL(s) visited so far",
                state.visited.len()
            );
        }

        let result = state.into_result(self.settings.popular_word_count);
        log::info!("Crawl finished: {} URL(s) visited", result.urls_visited());
        result
    }

    fn max_parallelism(&self) -> usize {
        self.parallelism
    }
}

/// One URL visit attempt and, through its children, the subtree below it.
pub struct CrawlTask<'a> {
    url: String,
    remaining_depth: usize,
    frontier: &'a Frontier<'a>,
}

impl<'a> CrawlTask<'a> {
    pub fn new(url: String, remaining_depth: usize, frontier: &'a Frontier<'a>) -> Self {
        Self {
            url,
            remaining_depth,
            frontier,
        }
    }

    /// Process this URL and block until every descendant task has finished.
    ///
    /// Runs on the current `rayon` pool (the global one outside `install`).
    pub fn run(self) {
        rayon::scope(|scope| self.process(scope));
    }

    /// Visit this URL and queue one task per link on `scope`.
    ///
    /// Children are spawned rather than called, so the worker stack stays
    /// flat however long a chain of links gets; the enclosing scope is the
    /// join point for the whole subtree.
    fn process<'s>(self, scope: &rayon::Scope<'s>)
    where
        'a: 's,
    {
        let frontier = self.frontier;
        if !frontier.admit(&self.url, self.remaining_depth) {
            return;
        }

        let child_depth = self.remaining_depth - 1;
        for link in frontier.visit(&self.url) {
            scope.spawn(move |scope| CrawlTask::new(link, child_depth, frontier).process(scope));
        }
    }
}
