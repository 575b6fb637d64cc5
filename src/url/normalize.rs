use crate::{UrlError, UrlResult};
use url::Url;

/// Prefixes `https://` when the input carries no scheme
///
/// Input that already names a scheme is returned trimmed but otherwise
/// untouched, so `ftp://host` stays `ftp://host` and is rejected later.
///
/// # Examples
///
/// ```
/// use wcag_auditor::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com"), "https://example.com");
/// assert_eq!(ensure_scheme("http://example.com/a"), "http://example.com/a");
/// assert_eq!(ensure_scheme("ftp://example.com"), "ftp://example.com");
/// ```
pub fn ensure_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// True when the input starts with `<scheme>://`
fn has_scheme(raw: &str) -> bool {
    match raw.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Parses a site or page URL, assuming `https://` when no scheme is given
///
/// Only http and https URLs with a host are accepted.
pub fn parse_http_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(&ensure_scheme(raw)).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns the identity key used to compare pages and sites
///
/// The key is the scheme-prefixed URL with its fragment removed, its host
/// lowercased, and any trailing slash dropped, so `example.com`,
/// `https://example.com/` and `https://EXAMPLE.com/#top` all share one key.
/// Unparseable input falls back to the scheme-prefixed string itself.
///
/// # Examples
///
/// ```
/// use wcag_auditor::url::page_key;
///
/// assert_eq!(page_key("example.com"), "https://example.com");
/// assert_eq!(page_key("https://example.com/about/#team"), "https://example.com/about");
/// ```
pub fn page_key(raw: &str) -> String {
    let prefixed = ensure_scheme(raw);
    let key = match Url::parse(&prefixed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => prefixed,
    };
    key.trim_end_matches('/').to_string()
}

/// Removes the fragment from a URL
pub fn strip_fragment(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_fragment(None);
    clean
}
