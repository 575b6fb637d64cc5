//! Crawler module for page discovery and audit orchestration
//!
//! This module contains:
//! - HTTP fetching and anchor extraction for link discovery
//! - The sequential audit coordinator
//! - The parallel violation detail backfill

mod backfill;
mod coordinator;
mod discoverer;
mod fetcher;
mod parser;

pub use backfill::{pages_to_backfill, BackfillCoordinator, BackfillReport, PageJob};
pub use coordinator::{plan_candidates, AuditCoordinator, RunReport};
pub use discoverer::{select_links, HttpLinkDiscoverer, LinkDiscovery};
pub use fetcher::{build_http_client, fetch_markup, FetchResult};
pub use parser::extract_links;
