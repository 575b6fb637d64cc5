//! URL handling for sites and pages
//!
//! This module provides scheme defaulting, identity keys for resume/dedup
//! comparisons, and the [`Site`] type built from configuration.

mod normalize;

pub use normalize::{ensure_scheme, page_key, parse_http_url, strip_fragment};

use crate::UrlResult;
use url::Url;

/// A configured site to audit
///
/// `url` is the scheme-prefixed base URL as configured; it is what gets written
/// to the `Main_Website` column and audited as the site's root page. `key` is
/// the normalized identity used for all comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    url: String,
    key: String,
}

impl Site {
    /// Builds a site from a configured base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use wcag_auditor::url::Site;
    ///
    /// let site = Site::new("example.com").unwrap();
    /// assert_eq!(site.url(), "https://example.com");
    /// assert_eq!(site.key(), "https://example.com");
    /// ```
    pub fn new(raw: &str) -> UrlResult<Self> {
        parse_http_url(raw)?;
        let url = ensure_scheme(raw);
        let key = page_key(&url);
        Ok(Self { url, key })
    }

    /// The scheme-prefixed base URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The normalized identity of this site
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parsed form of the base URL
    pub fn parsed(&self) -> UrlResult<Url> {
        parse_http_url(&self.url)
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}
