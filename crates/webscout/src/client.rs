//! HTTP fetch client with transient-failure retry
//!
//! Wraps a reqwest client behind a single `get` entry point. Connection
//! failures, read timeouts and retryable 5xx statuses are retried with
//! exponential backoff; anything else (including a non-200 status) is
//! reported as `None`, which callers treat as "skip this URL".

use crate::DEFAULT_USER_AGENT;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

/// Per-attempt connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total body read timeout
const BODY_TIMEOUT: Duration = Duration::from_secs(30);

/// Additional attempts after the first failed one
const MAX_RETRIES: u32 = 3;

/// Backoff base; doubled per attempt
const BACKOFF_BASE_MS: u64 = 300;

/// Statuses worth retrying
const RETRY_STATUSES: &[u16] = &[500, 502, 503, 504];

/// Result of a successful fetch
///
/// Ephemeral, owned by the caller, discarded after extraction.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL after following redirects
    pub final_url: String,
    /// HTTP status code (always 200 here)
    pub status_code: u16,
    /// Response body, lossily decoded as UTF-8
    pub body: String,
    /// Content-Type header value
    pub content_type: Option<String>,
}

/// Retrying HTTP GET client
///
/// Connection-pool reuse across calls is an optimization only; a fresh
/// client per call produces identical observable results.
pub struct FetchClient {
    http: reqwest::Client,
}

impl FetchClient {
    /// Create a client with the default identifying User-Agent
    pub fn new() -> Self {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a client with a custom User-Agent
    pub fn with_user_agent(user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { http }
    }

    /// Fetch a URL, retrying transient failures
    ///
    /// Returns `None` on a non-200 status, a non-retryable error, or
    /// after retries are exhausted. Never fails the caller's request.
    pub async fn get(&self, url: &str) -> Option<FetchResult> {
        for attempt in 0..=MAX_RETRIES {
            match self.http.get(url).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if RETRY_STATUSES.contains(&status) && attempt < MAX_RETRIES {
                        debug!(url, status, attempt, "retryable status, backing off");
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        continue;
                    }
                    if status != 200 {
                        debug!(url, status, "non-200 status, skipping");
                        return None;
                    }

                    let final_url = response.url().to_string();
                    let content_type = response
                        .headers()
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .map(|s| s.to_string());

                    let body = read_body_with_timeout(response, BODY_TIMEOUT).await;
                    return Some(FetchResult {
                        final_url,
                        status_code: status,
                        body: String::from_utf8_lossy(&body).to_string(),
                        content_type,
                    });
                }
                Err(e) => {
                    let transient = e.is_connect() || e.is_timeout();
                    if transient && attempt < MAX_RETRIES {
                        debug!(url, attempt, error = %e, "transient error, backing off");
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        continue;
                    }
                    debug!(url, error = %e, "fetch failed, skipping");
                    return None;
                }
            }
        }
        None
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential backoff: 300ms, 600ms, 1200ms, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS << attempt)
}

/// Read the response body, returning whatever arrived before the
/// deadline or a stream error
async fn read_body_with_timeout(response: reqwest::Response, timeout: Duration) -> Bytes {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let chunk_future = stream.next();
        let timeout_future = tokio::time::sleep_until(deadline);

        tokio::select! {
            chunk = chunk_future => {
                match chunk {
                    Some(Ok(bytes)) => {
                        body.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        warn!("error reading body chunk: {}", e);
                        return Bytes::from(body);
                    }
                    None => {
                        return Bytes::from(body);
                    }
                }
            }
            _ = timeout_future => {
                warn!("body timeout reached, returning partial content");
                return Bytes::from(body);
            }
        }
    }
}
