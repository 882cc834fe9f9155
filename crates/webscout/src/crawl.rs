//! Bounded breadth-first documentation crawler
//!
//! Starting from a seed URL, follows same-domain links whose path
//! contains `/doc`, up to a result limit. The `/doc` substring is a
//! zero-configuration approximation of "documentation page"; false
//! positives and negatives are an accepted tradeoff.

use crate::client::FetchClient;
use crate::normalize::normalize_url;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};
use url::Url;

/// Crawl a site for documentation links
///
/// Returns at most `limit` URLs, sorted lexicographically. Every
/// returned URL shares the seed's host and has `/doc` in its path.
/// Per-URL fetch and parse failures are skipped, never fatal.
pub async fn crawl_docs(client: &FetchClient, seed: &str, limit: usize) -> Vec<String> {
    let Ok(seed_url) = Url::parse(seed) else {
        debug!(seed, "unparseable seed URL, nothing to crawl");
        return Vec::new();
    };

    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut visited: HashSet<String> = HashSet::new();
    let mut frontier: VecDeque<String> = VecDeque::from([seed.to_string()]);
    // acceptance set: insertion-ordered, distinct from `visited`
    let mut accepted: HashSet<String> = HashSet::new();
    let mut found: Vec<String> = Vec::new();

    info!(seed, "starting crawl");

    while found.len() < limit {
        let Some(url) = frontier.pop_front() else {
            break;
        };
        // several pages may have enqueued the same URL; de-dup at dequeue
        if !visited.insert(url.clone()) {
            continue;
        }

        let Some(resp) = client.get(&url).await else {
            debug!(url, "skipping: fetch failed");
            continue;
        };
        let content_type = resp.content_type.as_deref().unwrap_or("");
        if !content_type.contains("text/html") {
            debug!(url, content_type, "skipping: not HTML");
            continue;
        }

        let doc = Html::parse_document(&resp.body);
        let base = Url::parse(&url).ok();

        for anchor in doc.select(&anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(link) = normalize_url(href, base.as_ref()) else {
                continue;
            };
            if !accepts(&seed_url, &link) {
                continue;
            }
            if visited.contains(&link) || found.len() >= limit {
                continue;
            }
            if accepted.insert(link.clone()) {
                found.push(link.clone());
                frontier.push_back(link);
            }
        }
    }

    info!(count = found.len(), "crawl finished");
    found.sort();
    found
}

/// Same network location as the seed, and a documentation-looking path
fn accepts(seed: &Url, link: &str) -> bool {
    let Ok(parsed) = Url::parse(link) else {
        return false;
    };
    parsed.host_str() == seed.host_str()
        && parsed.port_or_known_default() == seed.port_or_known_default()
        && parsed.path().contains("/doc")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_same_host_doc_path() {
        let seed = Url::parse("https://example.com/docs").unwrap();
        assert!(accepts(&seed, "https://example.com/docs/intro"));
        assert!(accepts(&seed, "https://example.com/documentation/api"));
        assert!(accepts(&seed, "https://example.com/guides/docs"));
    }

    #[test]
    fn test_rejects_other_hosts() {
        let seed = Url::parse("https://example.com/docs").unwrap();
        assert!(!accepts(&seed, "https://other.com/docs/intro"));
        assert!(!accepts(&seed, "https://sub.example.com/docs/intro"));
    }

    #[test]
    fn test_rejects_non_doc_paths() {
        let seed = Url::parse("https://example.com/docs").unwrap();
        assert!(!accepts(&seed, "https://example.com/blog/post"));
        assert!(!accepts(&seed, "https://example.com/"));
    }

    #[test]
    fn test_port_is_part_of_the_location() {
        let seed = Url::parse("http://127.0.0.1:8080/docs").unwrap();
        assert!(accepts(&seed, "http://127.0.0.1:8080/docs/a"));
        assert!(!accepts(&seed, "http://127.0.0.1:9090/docs/a"));
    }
}
