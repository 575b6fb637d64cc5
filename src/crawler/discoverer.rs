//! Link discovery
//!
//! Fetches a site's root page over plain HTTP and picks same-host page links
//! to audit. Discovery never fails: an unreachable root yields no links.

use crate::config::DiscoveryConfig;
use crate::crawler::fetcher::{build_http_client, fetch_markup, FetchResult};
use crate::crawler::parser::extract_links;
use crate::url::{parse_http_url, strip_fragment};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Finds candidate pages under a site root
#[async_trait]
pub trait LinkDiscovery: Send + Sync {
    /// Returns up to `limit` distinct same-host page URLs linked from `base_url`
    async fn discover(&self, base_url: &str, limit: usize) -> Vec<String>;
}

/// Discovers links by fetching raw markup
pub struct HttpLinkDiscoverer {
    client: Client,
    excluded_extensions: Vec<String>,
}

impl HttpLinkDiscoverer {
    pub fn new(config: &DiscoveryConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        })
    }
}

#[async_trait]
impl LinkDiscovery for HttpLinkDiscoverer {
    async fn discover(&self, base_url: &str, limit: usize) -> Vec<String> {
        if limit == 0 {
            return Vec::new();
        }

        let base = match parse_http_url(base_url) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Cannot discover links for {}: {}", base_url, e);
                return Vec::new();
            }
        };

        match fetch_markup(&self.client, base.as_str()).await {
            FetchResult::Success { body, .. } => {
                let links = select_links(&body, &base, &self.excluded_extensions, limit);
                tracing::debug!("Discovered {} links on {}", links.len(), base);
                links
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Could not fetch {}: HTTP {}", base, status_code);
                Vec::new()
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Could not fetch {}: {}", base, error);
                Vec::new()
            }
        }
    }
}

/// Selects auditable page links from root markup
///
/// A link is kept when it resolves to the same host and port as `base`, its
/// path does not end in an excluded extension, and it is not the root itself.
/// Fragments are stripped before comparison. Order follows the document and
/// collection stops once `limit` links are found.
pub fn select_links(html: &str, base: &Url, excluded: &[String], limit: usize) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }

    let root = base.as_str().trim_end_matches('/');
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for link in extract_links(html, base) {
        if link.host_str() != base.host_str()
            || link.port_or_known_default() != base.port_or_known_default()
        {
            continue;
        }

        let path = link.path().to_lowercase();
        if excluded.iter().any(|ext| path.ends_with(ext.as_str())) {
            continue;
        }

        let clean = strip_fragment(&link).to_string();
        if clean.trim_end_matches('/') == root {
            continue;
        }

        if seen.insert(clean.clone()) {
            selected.push(clean);
            if selected.len() >= limit {
                break;
            }
        }
    }

    selected
}
