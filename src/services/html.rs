// src/services/html.rs

//! HTML page resolver.
//!
//! Fetches a page over HTTP (or from disk for `file:` URLs), then extracts
//! the visible words and the outbound links.

use std::collections::HashMap;

use regex::Regex;
use scraper::{Html, Node, Selector};
use tokio::runtime::Handle;
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, Page};
use crate::services::PageResolver;
use crate::utils::http::{create_async_client, fetch_text_async};
use crate::utils::{matches_any, resolve_link};

/// Elements whose text never counts as page words.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Link schemes worth following.
const FOLLOWED_SCHEMES: &[&str] = &["http", "https", "file"];

/// Resolver backed by an async HTTP client.
///
/// `resolve` is blocking: it drives the fetch on the given runtime handle,
/// so it must be called from outside that runtime's async context (a
/// worker-pool thread or `spawn_blocking`).
pub struct HtmlPageResolver {
    client: reqwest::Client,
    runtime: Handle,
    ignored_words: Vec<Regex>,
}

impl HtmlPageResolver {
    /// Build a resolver from crawl configuration.
    pub fn new(config: &Config, runtime: Handle) -> Result<Self> {
        Ok(Self {
            client: create_async_client(&config.http)?,
            runtime,
            ignored_words: config.ignored_word_patterns()?,
        })
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| AppError::resolve(url.as_str(), "not a local file path"))?;
            return Ok(tokio::fs::read_to_string(path).await?);
        }
        fetch_text_async(&self.client, url.as_str()).await
    }
}

impl PageResolver for HtmlPageResolver {
    fn resolve(&self, url: &str) -> Result<Page> {
        let parsed = Url::parse(url)?;
        let html = self.runtime.block_on(self.fetch(&parsed))?;
        parse_page(&parsed, &html, &self.ignored_words)
    }
}

/// Extract word counts and absolute links from an HTML document.
///
/// Words are lowercased Unicode words; any word fully matching one of
/// `ignored_words` is dropped. Links lose their fragment and keep document
/// order; only http(s) and file links are kept.
pub fn parse_page(base: &Url, html: &str, ignored_words: &[Regex]) -> Result<Page> {
    let document = Html::parse_document(html);

    let mut word_counts: HashMap<String, u64> = HashMap::new();
    for text in visible_text(&document) {
        for word in text.unicode_words() {
            let word = word.to_lowercase();
            if matches_any(ignored_words, &word) {
                continue;
            }
            *word_counts.entry(word).or_insert(0) += 1;
        }
    }

    let link_sel = Selector::parse("a[href]")
        .map_err(|e| AppError::resolve(base.as_str(), format!("{e:?}")))?;
    let links = document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(base, href, FOLLOWED_SCHEMES))
        .collect();

    Ok(Page::new(word_counts, links))
}

fn visible_text(document: &Html) -> impl Iterator<Item = &str> {
    document.tree.root().descendants().filter_map(|node| {
        let Node::Text(text) = node.value() else {
            return None;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()));
        (!hidden).then_some(&**text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::compile_full_match;

    const DOC: &str = r#"
        <html>
          <head><title>Crab facts</title><style>.crab { color: red; }</style></head>
          <body>
            <h1>Crabs crabs CRABS</h1>
            <p>The crab walks sideways. A crab is a crustacean.</p>
            <script>var crab = "hidden";</script>
            <a href="/about#team">About</a>
            <a href="https://other.test/page">Elsewhere</a>
            <a href="mailto:crab@example.com">Mail</a>
            <a href="relative/page.html">Relative</a>
          </body>
        </html>
    "#;

    fn base() -> Url {
        Url::parse("https://example.com/docs/index.html").unwrap()
    }

    #[test]
    fn test_counts_visible_words_case_insensitively() {
        let page = parse_page(&base(), DOC, &[]).unwrap();

        assert_eq!(page.word_counts.get("crabs"), Some(&3));
        assert_eq!(page.word_counts.get("crab"), Some(&3)); // title + paragraph, not script
        assert_eq!(page.word_counts.get("sideways"), Some(&1));
        assert_eq!(page.word_counts.get("color"), None);
        assert_eq!(page.word_counts.get("hidden"), None);
    }

    #[test]
    fn test_drops_ignored_words() {
        let ignored = vec![compile_full_match("^.{1,3}$").unwrap()];
        let page = parse_page(&base(), DOC, &ignored).unwrap();

        assert_eq!(page.word_counts.get("the"), None);
        assert_eq!(page.word_counts.get("a"), None);
        assert_eq!(page.word_counts.get("walks"), Some(&1));
    }

    #[test]
    fn test_extracts_absolute_followable_links_in_order() {
        let page = parse_page(&base(), DOC, &[]).unwrap();

        assert_eq!(
            page.links,
            vec![
                "https://example.com/about".to_string(),
                "https://other.test/page".to_string(),
                "https://example.com/docs/relative/page.html".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolves_file_urls_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<body>hello hello <a href=\"next.html\">world</a></body>").unwrap();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let resolver = HtmlPageResolver::new(&Config::default(), runtime.handle().clone()).unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let page = resolver.resolve(url.as_str()).unwrap();

        assert_eq!(page.word_counts.get("hello"), Some(&2));
        assert_eq!(page.word_counts.get("world"), Some(&1));
        assert_eq!(page.links.len(), 1);
        assert!(page.links[0].ends_with("/next.html"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let resolver = HtmlPageResolver::new(&Config::default(), runtime.handle().clone()).unwrap();
        let url = Url::from_file_path(dir.path().join("absent.html")).unwrap();

        assert!(matches!(resolver.resolve(url.as_str()), Err(AppError::Io(_))));
    }
}
