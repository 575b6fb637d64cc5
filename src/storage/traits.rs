//! Storage traits and error types
//!
//! This module defines the worksheet-style interface the auditor persists
//! through, and its associated error types.

use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("Column '{column}' not found in worksheet '{worksheet}'")]
    ColumnNotFound { worksheet: String, column: String },

    #[error("Row for worksheet '{worksheet}' has {actual} cells, header has {expected}")]
    RowWidth {
        worksheet: String,
        expected: usize,
        actual: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One data row keyed by header name
pub type Record = HashMap<String, String>;

/// Trait for worksheet-style tabular stores
///
/// A worksheet is a named table with a fixed header row and an append-only
/// sequence of data rows. Rows are returned in append order. Nothing in the
/// auditor updates or deletes rows.
pub trait TabularStore {
    /// Creates the worksheet with the given header if it does not exist yet
    ///
    /// Returns `true` when the worksheet was created by this call.
    fn ensure_worksheet(&mut self, name: &str, header: &[&str]) -> StorageResult<bool>;

    /// Returns the header row of a worksheet
    fn header(&self, name: &str) -> StorageResult<Vec<String>>;

    /// Reads every data row, keyed by header name
    ///
    /// Cells missing from short rows read as empty strings.
    fn read_records(&self, name: &str) -> StorageResult<Vec<Record>>;

    /// Reads a single column of every data row
    fn read_column(&self, name: &str, column: &str) -> StorageResult<Vec<String>>;

    /// Appends one data row
    fn append_row(&mut self, name: &str, row: &[String]) -> StorageResult<()>;

    /// Appends several data rows as a single write
    ///
    /// Either every row lands or none does.
    fn append_rows(&mut self, name: &str, rows: &[Vec<String>]) -> StorageResult<()>;

    /// Counts the data rows of a worksheet
    fn count_rows(&self, name: &str) -> StorageResult<u64>;
}
