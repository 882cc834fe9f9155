//! URL normalization
//!
//! Single normalization point shared by the search provider and the doc
//! crawler: raw hrefs scraped from pages become absolute URLs, or `None`
//! when unusable. Pure and deterministic.

use url::Url;

/// Normalize an href found on a page to an absolute URL when possible
///
/// Handles search-engine redirect wrappers (the `uddg` query parameter)
/// and protocol-relative URLs. Returns `None` for javascript and
/// fragment links, and for relative references when no base is given.
pub fn normalize_url(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") || href.starts_with('#') {
        return None;
    }

    // redirect wrappers like /l/?uddg=<url> carry the real target in the
    // query string; unwrap without following
    if let Some(target) = unwrap_redirect(href) {
        return Some(target);
    }

    if href.starts_with("//") {
        return Some(format!("https:{href}"));
    }

    if let Ok(parsed) = Url::parse(href) {
        if matches!(parsed.scheme(), "http" | "https") {
            return Some(href.to_string());
        }
    }

    if let Some(base) = base {
        return base.join(href).ok().map(|u| u.to_string());
    }

    None
}

/// Extract the decoded `uddg` query parameter, if present
fn unwrap_redirect(href: &str) -> Option<String> {
    let query_start = href.find('?')? + 1;
    let query = &href[query_start..];
    let query = query.split('#').next().unwrap_or(query);
    if !query.contains("uddg=") {
        return None;
    }
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/guide/").unwrap()
    }

    #[test]
    fn test_rejects_empty_javascript_and_fragments() {
        assert_eq!(normalize_url("", None), None);
        assert_eq!(normalize_url("   ", None), None);
        assert_eq!(normalize_url("javascript:void(0)", None), None);
        assert_eq!(normalize_url("#section", None), None);
        assert_eq!(normalize_url("#", Some(&base())), None);
    }

    #[test]
    fn test_unwraps_redirect_wrapper() {
        assert_eq!(
            normalize_url("/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc", None),
            Some("https://example.com/page".to_string())
        );
        assert_eq!(
            normalize_url(
                "https://duckduckgo.com/l/?uddg=https%3A%2F%2Fdocs.rs%2F",
                None
            ),
            Some("https://docs.rs/".to_string())
        );
    }

    #[test]
    fn test_redirect_wrapper_ignores_other_params() {
        // the wrapper wins regardless of the rest of the URL
        assert_eq!(
            normalize_url("/l/?kh=1&uddg=https%3A%2F%2Ftarget.dev%2Fa%20b", Some(&base())),
            Some("https://target.dev/a b".to_string())
        );
    }

    #[test]
    fn test_protocol_relative_gets_https() {
        assert_eq!(
            normalize_url("//cdn.example.com/icon.png", None),
            Some("https://cdn.example.com/icon.png".to_string())
        );
    }

    #[test]
    fn test_absolute_urls_unchanged() {
        assert_eq!(
            normalize_url("https://example.com/a?x=1", None),
            Some("https://example.com/a?x=1".to_string())
        );
        assert_eq!(
            normalize_url("http://example.com/", None),
            Some("http://example.com/".to_string())
        );
    }

    #[test]
    fn test_relative_resolution_against_base() {
        assert_eq!(
            normalize_url("intro.html", Some(&base())),
            Some("https://example.com/docs/guide/intro.html".to_string())
        );
        assert_eq!(
            normalize_url("../api/", Some(&base())),
            Some("https://example.com/docs/api/".to_string())
        );
        assert_eq!(
            normalize_url("/root.html", Some(&base())),
            Some("https://example.com/root.html".to_string())
        );
    }

    #[test]
    fn test_relative_without_base_is_absent() {
        assert_eq!(normalize_url("page.html", None), None);
        assert_eq!(normalize_url("/page.html", None), None);
    }

    #[test]
    fn test_deterministic() {
        let href = "/l/?uddg=https%3A%2F%2Fexample.com%2F";
        assert_eq!(normalize_url(href, None), normalize_url(href, None));
    }
}
