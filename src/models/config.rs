//! Crawl configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::CAPABILITIES;
use crate::error::{AppError, Result};
use crate::profiler::CapabilitySet;
use crate::utils::compile_full_match;

/// Root crawl configuration.
///
/// Field names are snake_case in TOML; JSON files may also use the
/// camelCase spellings (`startPages`, `timeoutSeconds`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seed URLs, crawled one after another
    #[serde(default, alias = "startPages")]
    pub start_pages: Vec<String>,

    /// Regular expressions; a URL matching one in full is never visited
    #[serde(default, alias = "ignoredUrls")]
    pub ignored_urls: Vec<String>,

    /// Regular expressions; a word matching one in full is not counted
    #[serde(default, alias = "ignoredWords")]
    pub ignored_words: Vec<String>,

    /// Desired worker count (0 = available parallelism)
    #[serde(default)]
    pub parallelism: usize,

    /// Crawler implementation to use: "parallel" (default) or "sequential"
    #[serde(default, alias = "implementationOverride")]
    pub implementation_override: String,

    /// Maximum link depth followed from each seed
    #[serde(default = "defaults::max_depth", alias = "maxDepth")]
    pub max_depth: usize,

    /// Wall-clock budget for the whole crawl, in seconds
    #[serde(default = "defaults::timeout", alias = "timeoutSeconds")]
    pub timeout_secs: u64,

    /// Number of words reported in the result
    #[serde(default = "defaults::popular_word_count", alias = "popularWordCount")]
    pub popular_word_count: usize,

    /// Result JSON destination (empty = stdout)
    #[serde(default, alias = "resultPath")]
    pub result_path: String,

    /// Profile report destination (empty = stdout)
    #[serde(default, alias = "profileOutputPath")]
    pub profile_output_path: String,

    /// Interfaces to profile, by capability name
    #[serde(default = "defaults::profile")]
    pub profile: Vec<String>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a TOML or JSON file.
    ///
    /// The format is chosen by extension: `.json` is parsed as JSON,
    /// anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.start_pages.is_empty() {
            return Err(AppError::validation("start_pages is empty"));
        }
        if let Some(page) = self.start_pages.iter().find(|p| p.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "start_pages contains a blank entry: {page:?}"
            )));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(AppError::validation(
                "http.request_timeout_secs must be > 0",
            ));
        }
        if let Some(name) = self
            .profile
            .iter()
            .find(|name| CapabilitySet::lookup(CAPABILITIES, name).is_none())
        {
            return Err(AppError::validation(format!(
                "profile names unknown interface '{name}'"
            )));
        }
        self.implementation()?;
        self.ignored_url_patterns()?;
        self.ignored_word_patterns()?;
        Ok(())
    }

    /// Crawl time budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The crawler implementation selected by `implementation_override`.
    pub fn implementation(&self) -> Result<Implementation> {
        self.implementation_override.parse()
    }

    /// Compile `ignored_urls` with full-string match semantics.
    pub fn ignored_url_patterns(&self) -> Result<Vec<Regex>> {
        self.ignored_urls
            .iter()
            .map(|p| compile_full_match(p))
            .collect()
    }

    /// Compile `ignored_words` with full-string match semantics.
    pub fn ignored_word_patterns(&self) -> Result<Vec<Regex>> {
        self.ignored_words
            .iter()
            .map(|p| compile_full_match(p))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_pages: Vec::new(),
            ignored_urls: Vec::new(),
            ignored_words: Vec::new(),
            parallelism: 0,
            implementation_override: String::new(),
            max_depth: defaults::max_depth(),
            timeout_secs: defaults::timeout(),
            popular_word_count: defaults::popular_word_count(),
            result_path: String::new(),
            profile_output_path: String::new(),
            profile: defaults::profile(),
            http: HttpConfig::default(),
        }
    }
}

/// Crawler implementation choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Implementation {
    /// Fork-join crawl on a worker pool
    #[default]
    Parallel,
    /// Single-threaded crawl with an explicit work stack
    Sequential,
}

impl std::str::FromStr for Implementation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "parallel" => Ok(Implementation::Parallel),
            "sequential" => Ok(Implementation::Sequential),
            other => Err(AppError::config(format!(
                "Unknown implementation_override '{other}' (expected 'parallel' or 'sequential')"
            ))),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            request_timeout_secs: defaults::request_timeout(),
        }
    }
}

mod defaults {
    // Crawl defaults
    pub fn max_depth() -> usize {
        10
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn popular_word_count() -> usize {
        10
    }
    pub fn profile() -> Vec<String> {
        vec!["WebCrawler".into(), "PageResolver".into()]
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; wordcrawl/0.1)".into()
    }
    pub fn request_timeout() -> u64 {
        30
    }
}
