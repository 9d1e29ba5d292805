// src/pipeline/crawl.rs

//! Word-count crawling pipeline.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::crawler::{
    CrawlSettings, ParallelCrawler, SequentialCrawler, WEB_CRAWLER, WebCrawler, build_crawler,
};
use crate::error::Result;
use crate::models::{Config, CrawlResult, Implementation};
use crate::profiler::{CapabilitySet, Profiler};
use crate::services::{HtmlPageResolver, PAGE_RESOLVER, PageResolver};
use crate::storage::LocalStorage;
use crate::utils::{Clock, SystemClock};

/// Run a crawl as described by `config`.
///
/// Must be called on a multi-threaded tokio runtime: the crawl itself runs
/// on a blocking thread and drives page fetches back on this runtime.
pub async fn run_crawler(config: &Config, storage: &LocalStorage) -> Result<CrawlResult> {
    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let profiler = Profiler::new(Arc::clone(&clock));

    let resolver = build_resolver(config, &profiler)?;
    let crawler = build_profiled_crawler(config, clock, resolver, &profiler)?;

    log::info!(
        "Starting {:?} crawl of {} seed(s), timeout {}s",
        config.implementation()?,
        config.start_pages.len(),
        config.timeout_secs
    );

    let seeds = config.start_pages.clone();
    let result = tokio::task::spawn_blocking(move || crawler.crawl(&seeds)).await?;

    log::info!(
        "Visited {} URL(s); top word: {}",
        result.urls_visited(),
        result
            .word_counts()
            .first()
            .map_or("<none>", |(word, _)| word.as_str())
    );

    storage.write_result(&result).await?;
    storage.write_profile(&profiler.report()).await?;

    Ok(result)
}

/// Whether `config.profile` names `capability`.
fn is_profiled(config: &Config, capability: &CapabilitySet) -> bool {
    config.profile.iter().any(|name| name == capability.name)
}

fn build_resolver(config: &Config, profiler: &Profiler) -> Result<Arc<dyn PageResolver>> {
    let resolver = HtmlPageResolver::new(config, Handle::current())?;
    if is_profiled(config, &PAGE_RESOLVER) {
        Ok(Arc::new(profiler.wrap(Some(&PAGE_RESOLVER), resolver)?))
    } else {
        Ok(Arc::new(resolver))
    }
}

/// Build the configured crawler, wrapping the concrete type so profile
/// entries name the implementation that ran.
fn build_profiled_crawler(
    config: &Config,
    clock: Arc<dyn Clock>,
    resolver: Arc<dyn PageResolver>,
    profiler: &Profiler,
) -> Result<Box<dyn WebCrawler>> {
    let settings = CrawlSettings::from_config(config)?;
    let implementation = config.implementation()?;
    if !is_profiled(config, &WEB_CRAWLER) {
        return build_crawler(implementation, settings, clock, resolver);
    }

    Ok(match implementation {
        Implementation::Parallel => {
            let crawler = ParallelCrawler::new(settings, clock, resolver)?;
            Box::new(profiler.wrap(Some(&WEB_CRAWLER), crawler)?)
        }
        Implementation::Sequential => {
            let crawler = SequentialCrawler::new(settings, clock, resolver);
            Box::new(profiler.wrap(Some(&WEB_CRAWLER), crawler)?)
        }
    })
}
