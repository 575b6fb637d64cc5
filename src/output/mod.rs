//! Output module for generating compliance summaries
//!
//! This module handles:
//! - Rolling audit records up into per-site summaries
//! - Printing summaries to stdout
//! - Writing the markdown summary file

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_site_summaries, print_summary, summarize, SiteSummary};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
