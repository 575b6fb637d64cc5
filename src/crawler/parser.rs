//! HTML parser for extracting links
//!
//! Only `<a href="...">` anchors are considered. Hrefs are resolved against
//! the page URL and anything that does not resolve to http(s) is dropped.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all anchor links from an HTML document, in document order
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use url::Url;
/// use wcag_auditor::crawler::extract_links;
///
/// let html = r#"<a href="/page">Link</a><a href="mailto:a@b.c">Mail</a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None for empty hrefs, unparseable hrefs, and non-http schemes
/// such as `javascript:`, `mailto:`, `tel:` and `data:`.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
