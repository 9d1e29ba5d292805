// src/lib.rs

//! wordcrawl: deadline-bounded parallel crawler with word statistics and
//! call profiling.

pub mod crawler;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod profiler;
pub mod services;
pub mod storage;
pub mod utils;

use profiler::CapabilitySet;

/// Every interface that can be named in `Config::profile`.
pub static CAPABILITIES: &[&CapabilitySet] = &[&crawler::WEB_CRAWLER, &services::PAGE_RESOLVER];
