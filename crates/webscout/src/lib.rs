//! Webscout - web search and documentation crawling toolkit
//!
//! This crate provides a small pipeline for retrieving and normalizing
//! web content:
//!
//! - keyword search across the open web, scraped from a search engine's
//!   static HTML results page, with per-result content extraction
//! - bounded breadth-first crawling of a documentation site, collecting
//!   readable pages under a result limit
//!
//! The entry point is [`process_request`] (or [`Pipeline`] for custom
//! wiring), which dispatches on the request's `mode` and returns a
//! structured response. Network and parse failures degrade to per-item
//! markers; only invalid arguments fail the whole request.

pub mod client;
pub mod crawl;
mod error;
pub mod extract;
pub mod normalize;
mod pipeline;
pub mod search;
mod types;

pub use client::{FetchClient, FetchResult};
pub use crawl::crawl_docs;
pub use error::ScoutError;
pub use extract::{extract_page, ExtractedPage, TextBlock};
pub use normalize::normalize_url;
pub use pipeline::{process_request, Pipeline};
pub use search::{DuckDuckGo, SearchEngine};
pub use types::{DocItem, DocsResponse, ProcessRequest, ProcessResponse, SearchResponse, SearchResult};

/// Default User-Agent string sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; webscout/1.0)";

/// Tool description for MCP consumption
pub const TOOL_DESCRIPTION: &str = r#"Searches the web or crawls a documentation site and extracts readable page content.

- search mode: scrapes search-engine results and extracts title, snippet and content per hit
- docs mode: breadth-first crawl of same-domain documentation links from a seed URL
- Tolerates malformed pages; per-URL failures never fail the whole request"#;
