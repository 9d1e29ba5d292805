//! Pipeline entry points.
//!
//! - `run_crawler`: crawl the configured seeds, then write the result and
//!   the profile report

pub mod crawl;

pub use crawl::run_crawler;
