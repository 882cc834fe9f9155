//! HTML content extraction
//!
//! Parses a fetched page into a structured form: title, ordered
//! text/code blocks, an assembled content string, favicon and preview
//! image. Parsing is best-effort over an immutable tree; malformed
//! markup degrades the extracted fields, it never fails the call.

use crate::client::FetchClient;
use crate::normalize::normalize_url;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Tags whose subtrees carry no readable content
const STRIP_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "svg", "noscript",
];

/// Minimum trimmed length for a code block to be kept
const MIN_CODE_LEN: usize = 10;

/// Minimum collapsed length for a heading block
const MIN_HEADING_LEN: usize = 10;

/// Minimum collapsed length for any other text block
const MIN_TEXT_LEN: usize = 20;

/// Minimum length for an inline code span
const MIN_INLINE_CODE_LEN: usize = 20;

/// One content block, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextBlock {
    /// Whitespace-collapsed prose
    Text(String),
    /// Preformatted code, internal line breaks preserved
    Code(String),
    /// Inline code span found outside any `pre`
    InlineCode(String),
}

impl TextBlock {
    /// Render the block the way it appears in assembled content
    pub fn render(&self) -> String {
        match self {
            TextBlock::Text(text) => text.clone(),
            TextBlock::Code(code) => format!("```\n{code}\n```"),
            TextBlock::InlineCode(code) => format!("`{code}`"),
        }
    }
}

/// Structured result of extracting one page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// Document title, whitespace-collapsed
    pub title: Option<String>,
    /// Surviving content blocks in document order
    pub blocks: Vec<TextBlock>,
    /// Blocks joined into a markdown-ish string, optionally truncated
    pub content: String,
    /// First favicon link, resolved against the page URL
    pub favicon: Option<String>,
    /// Open-Graph image, falling back to the Twitter-card image
    pub preview_image: Option<String>,
}

/// Fetch a URL and extract its readable content
///
/// Returns `None` only on fetch failure; a page that parses to nothing
/// still yields an (empty) `ExtractedPage`.
pub async fn extract_page(
    client: &FetchClient,
    url: &str,
    max_len: Option<usize>,
) -> Option<ExtractedPage> {
    let resp = client.get(url).await?;
    Some(extract_from_html(&resp.body, &resp.final_url, max_len))
}

/// Extract structured content from an HTML document
///
/// `page_url` is the base for resolving favicon and preview-image URLs.
pub fn extract_from_html(html: &str, page_url: &str, max_len: Option<usize>) -> ExtractedPage {
    let doc = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let title = extract_title(&doc);
    let favicon = extract_favicon(&doc, base.as_ref());
    let preview_image = extract_preview_image(&doc, base.as_ref());
    let blocks = extract_blocks(&doc);

    let assembled = assemble_content(&blocks);
    let content = match max_len {
        Some(n) => truncate_chars(&assembled, n),
        None => assembled,
    };

    ExtractedPage {
        title,
        blocks,
        content,
        favicon,
        preview_image,
    }
}

fn extract_title(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").unwrap();
    doc.select(&selector)
        .next()
        .map(|el| collapse_whitespace(&element_text(&el, " ")))
}

fn extract_favicon(doc: &Html, base: Option<&Url>) -> Option<String> {
    let selector = Selector::parse("link[href]").unwrap();
    for link in doc.select(&selector) {
        let Some(rel) = link.value().attr("rel") else {
            continue;
        };
        // rel is a space-separated token list
        let is_icon = rel
            .split_whitespace()
            .any(|token| token.to_lowercase().contains("icon"));
        if !is_icon {
            continue;
        }
        if let Some(href) = link.value().attr("href") {
            if let Some(resolved) = normalize_url(href, base) {
                return Some(resolved);
            }
        }
    }
    None
}

fn extract_preview_image(doc: &Html, base: Option<&Url>) -> Option<String> {
    let og = Selector::parse(r#"meta[property="og:image"], meta[name="og:image"]"#).unwrap();
    let twitter =
        Selector::parse(r#"meta[property="twitter:image"], meta[name="twitter:image"]"#).unwrap();

    for selector in [og, twitter] {
        let image = doc
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .find_map(|content| normalize_url(content, base));
        if image.is_some() {
            return image;
        }
    }
    None
}

/// Walk content elements in document order, producing blocks
fn extract_blocks(doc: &Html) -> Vec<TextBlock> {
    let block_selector =
        Selector::parse("h1, h2, h3, h4, h5, h6, p, li, pre, code, blockquote").unwrap();
    let mut blocks = Vec::new();

    for el in doc.select(&block_selector) {
        if inside_stripped(&el) {
            continue;
        }
        let name = el.value().name();
        if name == "pre" || name == "code" {
            // a code child of a pre is already covered by the pre
            if name == "code" && inside_pre(&el) {
                continue;
            }
            let code = element_text(&el, "\n").trim().to_string();
            if code.len() >= MIN_CODE_LEN {
                blocks.push(TextBlock::Code(code));
            }
        } else {
            let text = collapse_whitespace(&element_text(&el, " "));
            if text.is_empty() {
                continue;
            }
            let min_len = if name.starts_with('h') {
                MIN_HEADING_LEN
            } else {
                MIN_TEXT_LEN
            };
            if text.len() < min_len {
                continue;
            }
            blocks.push(TextBlock::Text(text));
        }
    }

    // pick up substantial inline code spans not already captured above
    let code_selector = Selector::parse("code").unwrap();
    for el in doc.select(&code_selector) {
        if inside_stripped(&el) || inside_pre(&el) {
            continue;
        }
        let code = collapse_whitespace(&element_text(&el, " "));
        if code.len() < MIN_INLINE_CODE_LEN {
            continue;
        }
        let already_captured = blocks
            .iter()
            .any(|b| matches!(b, TextBlock::Code(c) if *c == code));
        if !already_captured {
            blocks.push(TextBlock::InlineCode(code));
        }
    }

    blocks
}

/// Join blocks with blank lines, promoting short title-cased lines to
/// markdown headings, then collapse newline runs and trim
fn assemble_content(blocks: &[TextBlock]) -> String {
    let rendered: Vec<String> = blocks
        .iter()
        .map(|block| match block {
            TextBlock::Text(text) if looks_like_heading(text) => format!("\n## {text}\n"),
            other => other.render(),
        })
        .collect();

    filter_excessive_newlines(&rendered.join("\n\n"))
        .trim()
        .to_string()
}

/// A short title-cased line of at most 6 words reads as a section
/// heading; approximates document structure without site knowledge
fn looks_like_heading(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    if text.chars().count() < 3 {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c.is_whitespace()) {
        return false;
    }
    text.split_whitespace().count() <= 6
}

/// Concatenated text of an element's descendants
fn element_text(el: &ElementRef, separator: &str) -> String {
    el.text().collect::<Vec<_>>().join(separator)
}

/// True if any ancestor is a non-content tag
fn inside_stripped(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| STRIP_TAGS.contains(&a.value().name()))
}

/// True if any ancestor is a `pre`
fn inside_pre(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == "pre")
}

/// Collapse all whitespace runs to single spaces and trim
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most 2 consecutive newlines
fn filter_excessive_newlines(s: &str) -> String {
    let mut result = String::new();
    let mut newline_count = 0;

    for c in s.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push(c);
            }
        } else {
            newline_count = 0;
            result.push(c);
        }
    }

    result
}

/// Char-boundary-safe truncation
fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://example.com/docs/page";

    #[test]
    fn test_title_whitespace_collapsed() {
        let html = "<html><head><title>  My \n  Page   Title </title></head><body></body></html>";
        let page = extract_from_html(html, PAGE_URL, None);
        assert_eq!(page.title.as_deref(), Some("My Page Title"));
    }

    #[test]
    fn test_missing_title_is_none() {
        let page = extract_from_html("<html><body><p>hi</p></body></html>", PAGE_URL, None);
        assert_eq!(page.title, None);
    }

    #[test]
    fn test_favicon_rel_token_match() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/style.css">
            <link rel="shortcut icon" href="/favicon.ico">
        </head><body></body></html>"#;
        let page = extract_from_html(html, PAGE_URL, None);
        assert_eq!(
            page.favicon.as_deref(),
            Some("https://example.com/favicon.ico")
        );
    }

    #[test]
    fn test_preview_image_prefers_og_over_twitter() {
        let html = r#"<html><head>
            <meta name="twitter:image" content="/tw.png">
            <meta property="og:image" content="/og.png">
        </head><body></body></html>"#;
        let page = extract_from_html(html, PAGE_URL, None);
        assert_eq!(
            page.preview_image.as_deref(),
            Some("https://example.com/og.png")
        );
    }

    #[test]
    fn test_preview_image_twitter_fallback() {
        let html = r#"<html><head>
            <meta name="twitter:image" content="https://cdn.example.com/tw.png">
        </head><body></body></html>"#;
        let page = extract_from_html(html, PAGE_URL, None);
        assert_eq!(
            page.preview_image.as_deref(),
            Some("https://cdn.example.com/tw.png")
        );
    }

    #[test]
    fn test_strips_non_content_subtrees() {
        let html = r#"<html><body>
            <nav><p>Navigation links that are long enough to keep</p></nav>
            <script>var x = "should never appear in output";</script>
            <p>This paragraph is the only real content on the page.</p>
            <footer><p>Copyright notice long enough to pass the filter</p></footer>
        </body></html>"#;
        let page = extract_from_html(html, PAGE_URL, None);
        assert_eq!(page.blocks.len(), 1);
        assert!(page.content.contains("only real content"));
        assert!(!page.content.contains("Navigation"));
        assert!(!page.content.contains("Copyright"));
        assert!(!page.content.contains("should never appear"));
    }

    #[test]
    fn test_code_block_fenced_and_newlines_preserved() {
        let html = "<html><body><pre>fn main() {\n    println!(\"hi\");\n}</pre></body></html>";
        let page = extract_from_html(html, PAGE_URL, None);
        assert_eq!(page.blocks.len(), 1);
        assert!(matches!(&page.blocks[0], TextBlock::Code(c) if c.contains('\n')));
        assert!(page.content.starts_with("```\n"));
        assert!(page.content.ends_with("\n```"));
    }

    #[test]
    fn test_pre_code_not_double_counted() {
        let html =
            "<html><body><pre><code>let value = compute_something();</code></pre></body></html>";
        let page = extract_from_html(html, PAGE_URL, None);
        assert_eq!(page.blocks.len(), 1);
    }

    #[test]
    fn test_short_code_dropped() {
        let html = "<html><body><pre>x = 1</pre></body></html>";
        let page = extract_from_html(html, PAGE_URL, None);
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_minimum_lengths_for_text_blocks() {
        let html = r#"<html><body>
            <h2>Routing</h2>
            <h2>Data Fetching</h2>
            <p>short one</p>
            <p>This paragraph comfortably exceeds twenty characters.</p>
        </body></html>"#;
        let page = extract_from_html(html, PAGE_URL, None);
        // "Routing" (7 chars) misses the 10-char heading minimum,
        // "short one" misses the 20-char paragraph minimum
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(
            page.blocks[0],
            TextBlock::Text("Data Fetching".to_string())
        );
    }

    #[test]
    fn test_inline_code_captured() {
        let html = r#"<html><body>
            <p>Call the function like this: <code>collection.insert_many(documents)</code> today.</p>
        </body></html>"#;
        let page = extract_from_html(html, PAGE_URL, None);
        assert!(page
            .blocks
            .iter()
            .any(|b| matches!(b, TextBlock::InlineCode(_))));
        assert!(page.content.contains("`collection.insert_many(documents)`"));
    }

    #[test]
    fn test_short_inline_code_dropped() {
        let html = "<html><body><p>Use <code>ls -la</code> to list files in a directory.</p></body></html>";
        let page = extract_from_html(html, PAGE_URL, None);
        assert!(!page
            .blocks
            .iter()
            .any(|b| matches!(b, TextBlock::InlineCode(_))));
    }

    #[test]
    fn test_heading_heuristic_in_content() {
        let html = r#"<html><body>
            <p>Getting Started Guide</p>
            <p>Regular prose that is definitely not a heading because it runs on and on.</p>
        </body></html>"#;
        let page = extract_from_html(html, PAGE_URL, None);
        assert!(page.content.contains("## Getting Started Guide"));
        assert!(!page.content.contains("## Regular prose"));
    }

    #[test]
    fn test_looks_like_heading() {
        assert!(looks_like_heading("Getting Started"));
        assert!(looks_like_heading("API Reference"));
        assert!(looks_like_heading("Error-Handling Basics"));
        // lowercase start
        assert!(!looks_like_heading("getting started"));
        // too many words
        assert!(!looks_like_heading("One Two Three Four Five Six Seven"));
        // punctuation outside the allowed set
        assert!(!looks_like_heading("What is this?"));
        // too short
        assert!(!looks_like_heading("Ab"));
    }

    #[test]
    fn test_newline_runs_collapsed() {
        assert_eq!(filter_excessive_newlines("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(filter_excessive_newlines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_truncation_applied() {
        let html = "<html><body><p>This paragraph comfortably exceeds twenty characters and keeps going for a while.</p></body></html>";
        let page = extract_from_html(html, PAGE_URL, Some(30));
        assert_eq!(page.content.chars().count(), 30);

        let unbounded = extract_from_html(html, PAGE_URL, None);
        assert!(unbounded.content.chars().count() > 30);
    }

    #[test]
    fn test_malformed_html_degrades_quietly() {
        let html = "<html><body><p>Unclosed paragraph that still has enough characters<div><h1>Broken <nesting";
        let page = extract_from_html(html, PAGE_URL, None);
        assert!(page
            .content
            .contains("Unclosed paragraph that still has enough characters"));
    }
}
