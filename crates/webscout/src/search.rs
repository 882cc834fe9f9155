//! Search provider
//!
//! Scrapes result links from a search engine's static HTML results
//! page. Engines implement [`SearchEngine`]; [`DuckDuckGo`] is the
//! default. All hrefs go through the shared normalizer, so redirect
//! wrappers are unwrapped rather than followed.

use crate::client::FetchClient;
use crate::normalize::normalize_url;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;

/// DuckDuckGo static HTML results endpoint
const DUCKDUCKGO_ENDPOINT: &str = "https://duckduckgo.com/html/";

/// A search engine that can be scraped for result URLs
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Return up to `limit` distinct result URLs in discovery order
    async fn search(&self, client: &FetchClient, query: &str, limit: usize) -> Vec<String>;
}

/// DuckDuckGo HTML search
pub struct DuckDuckGo {
    endpoint: String,
}

impl DuckDuckGo {
    /// Search against the public endpoint
    pub fn new() -> Self {
        Self {
            endpoint: DUCKDUCKGO_ENDPOINT.to_string(),
        }
    }

    /// Search against a custom endpoint (tests, proxies)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGo {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, client: &FetchClient, query: &str, limit: usize) -> Vec<String> {
        if limit == 0 {
            return Vec::new();
        }

        let q = query.replace(' ', "+");
        let url = format!("{}?q={}", self.endpoint, q);
        let Some(resp) = client.get(&url).await else {
            debug!(query, "search fetch failed, returning no results");
            return Vec::new();
        };

        let doc = Html::parse_document(&resp.body);
        let mut seen: HashSet<String> = HashSet::new();
        let mut links: Vec<String> = Vec::new();

        // result anchors first: most precise
        let result_selector = Selector::parse("a.result__a, a.result-link").unwrap();
        for anchor in doc.select(&result_selector) {
            if let Some(href) = anchor.value().attr("href") {
                if let Some(final_url) = normalize_url(href, None) {
                    if seen.insert(final_url.clone()) {
                        links.push(final_url);
                    }
                }
            }
            if links.len() >= limit {
                return links;
            }
        }

        // fall back to every anchor on the page to fill remaining slots
        let any_selector = Selector::parse("a[href]").unwrap();
        for anchor in doc.select(&any_selector) {
            if links.len() >= limit {
                break;
            }
            if let Some(href) = anchor.value().attr("href") {
                if let Some(final_url) = normalize_url(href, None) {
                    if seen.insert(final_url.clone()) {
                        links.push(final_url);
                    }
                }
            }
        }

        links.truncate(limit);
        links
    }
}
