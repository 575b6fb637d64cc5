//! WCAG Auditor: resumable accessibility audits over a list of sites
//!
//! This crate samples pages from configured websites, runs an accessibility rule
//! engine against each rendered page, classifies the findings into a compliance
//! tier, and appends the results to a worksheet-style store so interrupted runs
//! can pick up where they left off.

pub mod audit;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for auditor operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Rendering error: {0}")]
    Render(#[from] audit::RenderError),

    #[error("Invalid site state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::SiteState,
        to: state::SiteState,
    },

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for auditor operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use audit::{classify, ClassifiedResult, ComplianceTier, PageAuditor, SeverityBucket};
pub use config::Config;
pub use crawler::{AuditCoordinator, BackfillCoordinator, HttpLinkDiscoverer, LinkDiscovery};
pub use state::{ProgressLedger, SiteState};
pub use url::{ensure_scheme, page_key, Site};
