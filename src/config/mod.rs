//! Configuration module for the auditor
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wcag_auditor::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("auditor.toml")).unwrap();
//! println!("Sampling {} pages per site", config.audit.target_sample_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AuditConfig, BackfillConfig, BrowserConfig, Config, DiscoveryConfig, OutputConfig, SiteEntry,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

use crate::url::Site;
use crate::UrlResult;

impl Config {
    /// Resolves the configured site list, in configuration order
    pub fn sites(&self) -> UrlResult<Vec<Site>> {
        self.sites.iter().map(|entry| Site::new(&entry.url)).collect()
    }
}
