//! Pipeline facade
//!
//! Validates request parameters, dispatches to search or docs mode, and
//! assembles the final response. This is the only layer that can fail a
//! whole request, and only for invalid arguments; everything downstream
//! degrades to per-item markers.

use crate::client::FetchClient;
use crate::crawl::crawl_docs;
use crate::error::ScoutError;
use crate::extract::extract_page;
use crate::search::{DuckDuckGo, SearchEngine};
use crate::types::{
    DocItem, DocsResponse, ProcessRequest, ProcessResponse, SearchResponse, SearchResult,
};
use tracing::info;

/// Default result count in search mode
const DEFAULT_SEARCH_LIMIT: u64 = 5;

/// Default snippet length in search mode
const DEFAULT_SNIPPET_LEN: usize = 300;

/// Default content length, both modes
const DEFAULT_CONTENT_LEN: u64 = 2000;

/// Default and maximum result count in docs mode
const DOCS_LIMIT_CAP: u64 = 10;

/// The fetch/normalize/extract/crawl pipeline
///
/// Each invocation builds its own crawl state; the client and engine
/// are reusable but carry no request state.
pub struct Pipeline {
    client: FetchClient,
    engine: Box<dyn SearchEngine>,
}

impl Pipeline {
    /// Pipeline with the default client and search engine
    pub fn new() -> Self {
        Self {
            client: FetchClient::new(),
            engine: Box::new(DuckDuckGo::new()),
        }
    }

    /// Pipeline with a custom search engine
    pub fn with_engine(engine: Box<dyn SearchEngine>) -> Self {
        Self {
            client: FetchClient::new(),
            engine,
        }
    }

    /// Process a request, dispatching on its mode
    pub async fn process(&self, params: ProcessRequest) -> Result<ProcessResponse, ScoutError> {
        match params.mode.as_str() {
            "search" => self.run_search(params).await.map(ProcessResponse::Search),
            "docs" => self.run_docs(params).await.map(ProcessResponse::Docs),
            other => Err(ScoutError::InvalidMode(other.to_string())),
        }
    }

    async fn run_search(&self, params: ProcessRequest) -> Result<SearchResponse, ScoutError> {
        let query = params
            .query
            .filter(|q| !q.is_empty())
            .ok_or(ScoutError::MissingQuery)?;
        let limit = resolve_limit(params.limit, DEFAULT_SEARCH_LIMIT)?;
        let snippet_len = params
            .snippet_len
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_SNIPPET_LEN);
        let content_len = resolve_length(params.content_len);

        let links = self.engine.search(&self.client, &query, limit).await;

        let mut results = Vec::with_capacity(links.len());
        for link in links {
            info!(url = %link, "extracting");
            match extract_page(&self.client, &link, content_len).await {
                Some(page) => {
                    let snippet = if let Some(first) = page.blocks.first() {
                        truncate_chars(&first.render(), snippet_len)
                    } else if page.content.chars().count() > snippet_len {
                        format!("{}...", truncate_chars(&page.content, snippet_len))
                    } else {
                        page.content.clone()
                    };
                    results.push(SearchResult {
                        url: link,
                        title: Some(page.title.unwrap_or_default()),
                        snippet: Some(snippet),
                        content: Some(page.content),
                        favicon: page.favicon,
                        preview_image: page.preview_image,
                    });
                }
                None => {
                    results.push(SearchResult {
                        url: link,
                        ..Default::default()
                    });
                }
            }
        }

        Ok(SearchResponse { query, results })
    }

    async fn run_docs(&self, params: ProcessRequest) -> Result<DocsResponse, ScoutError> {
        let base_url = params
            .url
            .filter(|u| !u.is_empty())
            .ok_or(ScoutError::MissingUrl)?;
        let limit = resolve_limit(params.limit, DOCS_LIMIT_CAP)?.min(DOCS_LIMIT_CAP as usize);
        let include_content = params.include_content.unwrap_or(true);
        let content_limit = resolve_length(params.content_limit);

        let mut links = crawl_docs(&self.client, &base_url, limit).await;
        links.truncate(limit);

        if links.is_empty() {
            // no discoverable doc links: the seed itself is the result
            links = vec![base_url.clone()];
        } else if !links.contains(&base_url) {
            // the seed is always the first result
            links.truncate(limit.saturating_sub(1));
            links.insert(0, base_url.clone());
        }

        let total = links.len();
        let mut results = Vec::with_capacity(total);
        for (i, link) in links.into_iter().enumerate() {
            info!(n = i + 1, total, url = %link, "processing");
            let item = if include_content {
                match extract_page(&self.client, &link, content_limit).await {
                    Some(page) => DocItem {
                        url: link,
                        title: Some(page.title.unwrap_or_default()),
                        content: Some(page.content),
                        favicon: page.favicon,
                        preview_image: page.preview_image,
                        fetched: Some(true),
                        error: None,
                    },
                    None => DocItem {
                        url: link,
                        fetched: Some(false),
                        error: Some("failed to fetch or parse".to_string()),
                        ..Default::default()
                    },
                }
            } else {
                DocItem {
                    url: link,
                    ..Default::default()
                }
            };
            results.push(item);
        }

        Ok(DocsResponse { base_url, results })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Process a request with the default pipeline
///
/// Convenience wrapper; for a custom search engine use [`Pipeline`]
/// directly.
pub async fn process_request(params: ProcessRequest) -> Result<ProcessResponse, ScoutError> {
    Pipeline::new().process(params).await
}

/// Apply a default and reject zero
fn resolve_limit(value: Option<u64>, default: u64) -> Result<usize, ScoutError> {
    let v = value.unwrap_or(default);
    if v == 0 {
        return Err(ScoutError::InvalidParameter {
            name: "limit".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(v as usize)
}

/// Absent means the default; explicit null means unbounded
fn resolve_length(value: Option<Option<u64>>) -> Option<usize> {
    match value {
        None => Some(DEFAULT_CONTENT_LEN as usize),
        Some(None) => None,
        Some(Some(n)) => Some(n as usize),
    }
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
