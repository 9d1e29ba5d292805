// src/models/mod.rs

//! Domain models for the crawler application.

mod config;
mod page;
mod result;

// Re-export all public types
pub use config::{Config, HttpConfig, Implementation};
pub use page::Page;
pub use result::{CrawlResult, rank, top_words};
