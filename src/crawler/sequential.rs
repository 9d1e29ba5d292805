//! Single-threaded crawler.

use std::sync::Arc;

use crate::crawler::{CrawlSettings, CrawlState, Frontier, WebCrawler};
use crate::models::CrawlResult;
use crate::services::PageResolver;
use crate::utils::Clock;

/// Depth-first crawl on the calling thread.
///
/// Pages are visited in the same order a recursive walk would visit them,
/// but pending links live on an explicit stack, so depth is not limited by
/// the thread's call stack.
pub struct SequentialCrawler {
    settings: CrawlSettings,
    clock: Arc<dyn Clock>,
    resolver: Arc<dyn PageResolver>,
}

impl SequentialCrawler {
    pub fn new(
        settings: CrawlSettings,
        clock: Arc<dyn Clock>,
        resolver: Arc<dyn PageResolver>,
    ) -> Self {
        Self {
            settings,
            clock,
            resolver,
        }
    }
}

impl WebCrawler for SequentialCrawler {
    fn crawl(&self, seeds: &[String]) -> CrawlResult {
        let state = CrawlState::new();
        let frontier = Frontier {
            clock: self.clock.as_ref(),
            resolver: self.resolver.as_ref(),
            ignored_urls: &self.settings.ignored_urls,
            state: &state,
            deadline: self.clock.now() + self.settings.timeout,
        };

        log::info!(
            "Crawling {} seed(s) sequentially, max depth {}",
            seeds.len(),
            self.settings.max_depth
        );

        let mut pending: Vec<(String, usize)> = Vec::new();
        for seed in seeds {
            pending.push((seed.clone(), self.settings.max_depth));
            while let Some((url, remaining_depth)) = pending.pop() {
                if !frontier.admit(&url, remaining_depth) {
                    continue;
                }
                let links = frontier.visit(&url);
                // Reversed so the first link is popped first.
                pending.extend(links.into_iter().rev().map(|link| (link, remaining_depth - 1)));
            }
        }

        let result = state.into_result(self.settings.popular_word_count);
        log::info!("Crawl finished: {} URL(s) visited", result.urls_visited());
        result
    }

    fn max_parallelism(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::Result;
    use crate::models::Page;
    use crate::services::StaticResolver;
    use crate::utils::SystemClock;

    fn crawler(resolver: Arc<dyn PageResolver>, max_depth: usize) -> SequentialCrawler {
        let settings = CrawlSettings {
            max_depth,
            ..CrawlSettings::default()
        };
        SequentialCrawler::new(settings, Arc::new(SystemClock), resolver)
    }

    /// Remembers the order URLs are resolved in.
    struct Recording {
        inner: StaticResolver,
        order: Mutex<Vec<String>>,
    }

    impl PageResolver for Recording {
        fn resolve(&self, url: &str) -> Result<Page> {
            self.order.lock().unwrap().push(url.to_string());
            self.inner.resolve(url)
        }
    }

    #[test]
    fn test_visits_depth_first_in_link_order() {
        let resolver = Arc::new(Recording {
            inner: StaticResolver::new()
                .with_page("a", &[], &["b", "e"])
                .with_page("b", &[], &["c", "d"])
                .with_page("c", &[], &[])
                .with_page("d", &[], &["a"])
                .with_page("e", &[], &["c"]),
            order: Mutex::new(Vec::new()),
        });

        let result = crawler(resolver.clone(), 10).crawl(&["a".to_string()]);

        assert_eq!(result.urls_visited(), 5);
        assert_eq!(*resolver.order.lock().unwrap(), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_long_chains_do_not_need_deep_recursion() {
        let names: Vec<String> = (0..20_000).map(|i| format!("p{i}")).collect();
        let mut resolver = StaticResolver::new();
        for (i, name) in names.iter().enumerate() {
            let links: Vec<&str> = names.get(i + 1).map(String::as_str).into_iter().collect();
            resolver = resolver.with_page(name, &[("step", 1)], &links);
        }

        let result = crawler(Arc::new(resolver), 50_000).crawl(&[names[0].clone()]);

        assert_eq!(result.urls_visited(), 20_000);
        assert_eq!(result.word_counts(), [("step".to_string(), 20_000)]);
    }

    #[test]
    fn test_seeds_share_one_registry() {
        let resolver = Arc::new(
            StaticResolver::new()
                .with_page("A", &[], &["X"])
                .with_page("B", &[], &["X"])
                .with_page("X", &[("x", 1)], &[]),
        );

        let result = crawler(resolver.clone(), 3).crawl(&["A".to_string(), "B".to_string()]);

        assert_eq!(result.urls_visited(), 3);
        assert_eq!(result.word_counts(), [("x".to_string(), 1)]);
        assert_eq!(resolver.hits("X"), 1);
    }

    #[test]
    fn test_reports_single_worker() {
        assert_eq!(crawler(Arc::new(StaticResolver::new()), 1).max_parallelism(), 1);
    }
}
