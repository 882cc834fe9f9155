//! Request and response model for the pipeline

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Request processed by the pipeline
///
/// `mode` selects between `"search"` and `"docs"`; the remaining fields
/// are mode-specific and optional, with defaults applied inside the
/// pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProcessRequest {
    /// Operation mode: "search" or "docs" (required)
    pub mode: String,

    /// Search terms (search mode, required there)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Seed URL to crawl (docs mode, required there)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Maximum result count (search default 5, docs default 10 and hard-capped at 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Maximum snippet characters (search mode, default 300)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_len: Option<u64>,

    /// Maximum content characters (search mode, default 2000; explicit
    /// null means unbounded)
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_len: Option<Option<u64>>,

    /// Whether to extract page content (docs mode, default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_content: Option<bool>,

    /// Maximum content characters per page (docs mode, default 2000;
    /// explicit null means unbounded)
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_limit: Option<Option<u64>>,
}

/// Distinguishes an absent field from an explicit JSON null
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl ProcessRequest {
    /// Create a search-mode request for the given query
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            mode: "search".to_string(),
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// Create a docs-mode request for the given seed URL
    pub fn docs(url: impl Into<String>) -> Self {
        Self {
            mode: "docs".to_string(),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Set the maximum result count
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the maximum snippet length (search mode)
    pub fn snippet_len(mut self, len: u64) -> Self {
        self.snippet_len = Some(len);
        self
    }

    /// Set the maximum content length; `None` means unbounded
    pub fn content_len(mut self, len: Option<u64>) -> Self {
        self.content_len = Some(len);
        self
    }

    /// Set whether docs mode extracts page content
    pub fn include_content(mut self, include: bool) -> Self {
        self.include_content = Some(include);
        self
    }

    /// Set the per-page content limit (docs mode); `None` means unbounded
    pub fn content_limit(mut self, len: Option<u64>) -> Self {
        self.content_limit = Some(len);
        self
    }
}

/// One entry in a search-mode response
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    /// Result page URL
    pub url: String,

    /// Page title; null when extraction failed
    pub title: Option<String>,

    /// First extracted block, truncated; null when extraction failed
    pub snippet: Option<String>,

    /// Assembled page content; null when extraction failed
    pub content: Option<String>,

    /// Favicon URL, if the page declared one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,

    /// Open-Graph or Twitter-card preview image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
}

/// One entry in a docs-mode response
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocItem {
    /// Crawled page URL
    pub url: String,

    /// Page title, when content was extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Assembled page content, when extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Favicon URL, if the page declared one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,

    /// Open-Graph or Twitter-card preview image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,

    /// True when extraction succeeded; false with an error string when
    /// it failed; absent when content was not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched: Option<bool>,

    /// Failure description for this URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Search-mode response
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    /// The query that was searched
    pub query: String,
    /// Results in discovery order, at most the requested limit
    pub results: Vec<SearchResult>,
}

/// Docs-mode response
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocsResponse {
    /// The seed URL the crawl started from
    pub base_url: String,
    /// Crawled pages, seed URL first
    pub results: Vec<DocItem>,
}

/// Response from a pipeline request
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ProcessResponse {
    /// Search-mode result set
    Search(SearchResponse),
    /// Docs-mode result set
    Docs(DocsResponse),
}
