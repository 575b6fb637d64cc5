//! Storage module for persisting audit results
//!
//! This module handles all persistence for the auditor, including:
//! - The worksheet-style [`TabularStore`] interface
//! - A SQLite worksheet backend
//! - Typed rows for the `AuditRecords` and `ViolationDetails` worksheets

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{Record, StorageError, StorageResult, TabularStore};

use crate::audit::{ClassifiedResult, FindingDetail};
use std::path::Path;

/// Worksheet holding one summary row per page audit
pub const AUDIT_RECORDS_SHEET: &str = "AuditRecords";

/// Worksheet holding one row per rule finding
pub const VIOLATION_DETAILS_SHEET: &str = "ViolationDetails";

/// Header of the `AuditRecords` worksheet
pub const AUDIT_RECORDS_HEADER: [&str; 12] = [
    "Main_Website",
    "Sub_Page",
    "Compliance_Level",
    "Total_Violation",
    "A_Violation",
    "AA_Violation",
    "AAA_Violation",
    "Severe_Violation",
    "Moderate_Violation",
    "Mild_Violation",
    "Unknown_Violation",
    "Date_Time",
];

/// Header of the `ViolationDetails` worksheet
pub const VIOLATION_DETAILS_HEADER: [&str; 6] = [
    "Main_Website",
    "Sub_Page",
    "Violation_ID",
    "Severity",
    "Description",
    "Help_URL",
];

/// Format of the `Date_Time` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Opens or creates the worksheet database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// One persisted page audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub site_url: String,
    pub page_url: String,
    pub compliance_level: String,
    pub total_violations: u32,
    pub a_violations: u32,
    pub aa_violations: u32,
    pub aaa_violations: u32,
    pub severe: u32,
    pub moderate: u32,
    pub mild: u32,
    pub unknown: u32,
    pub recorded_at: String,
}

impl AuditRecord {
    /// Builds a record from a classified page audit
    pub fn new(
        site_url: &str,
        page_url: &str,
        result: &ClassifiedResult,
        recorded_at: String,
    ) -> Self {
        Self {
            site_url: site_url.to_string(),
            page_url: page_url.to_string(),
            compliance_level: result.tier.label().to_string(),
            total_violations: result.counts.total,
            a_violations: result.counts.a,
            aa_violations: result.counts.aa,
            aaa_violations: result.counts.aaa,
            severe: result.severity.severe,
            moderate: result.severity.moderate,
            mild: result.severity.mild,
            unknown: result.severity.unknown,
            recorded_at,
        }
    }

    /// Cells in `AUDIT_RECORDS_HEADER` order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.site_url.clone(),
            self.page_url.clone(),
            self.compliance_level.clone(),
            self.total_violations.to_string(),
            self.a_violations.to_string(),
            self.aa_violations.to_string(),
            self.aaa_violations.to_string(),
            self.severe.to_string(),
            self.moderate.to_string(),
            self.mild.to_string(),
            self.unknown.to_string(),
            self.recorded_at.clone(),
        ]
    }

    /// Reads a record back from a worksheet row
    ///
    /// Returns `None` when the site or page cell is blank. Counts that do not
    /// parse as numbers read as zero.
    pub fn from_record(record: &Record) -> Option<Self> {
        let text = |column: &str| record.get(column).map(|v| v.trim().to_string()).unwrap_or_default();
        let count = |column: &str| text(column).parse::<u32>().unwrap_or(0);

        let site_url = text("Main_Website");
        let page_url = text("Sub_Page");
        if site_url.is_empty() || page_url.is_empty() {
            return None;
        }

        Some(Self {
            site_url,
            page_url,
            compliance_level: text("Compliance_Level"),
            total_violations: count("Total_Violation"),
            a_violations: count("A_Violation"),
            aa_violations: count("AA_Violation"),
            aaa_violations: count("AAA_Violation"),
            severe: count("Severe_Violation"),
            moderate: count("Moderate_Violation"),
            mild: count("Mild_Violation"),
            unknown: count("Unknown_Violation"),
            recorded_at: text("Date_Time"),
        })
    }
}

/// One persisted rule finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationDetail {
    pub site_url: String,
    pub page_url: String,
    pub rule_id: String,
    pub severity: String,
    pub description: String,
    pub help_url: String,
}

impl ViolationDetail {
    /// Builds a detail row from a classified finding; absent fields become blank cells
    pub fn new(site_url: &str, page_url: &str, finding: &FindingDetail) -> Self {
        Self {
            site_url: site_url.to_string(),
            page_url: page_url.to_string(),
            rule_id: finding.rule_id.clone().unwrap_or_default(),
            severity: finding.impact.clone().unwrap_or_default(),
            description: finding.description.clone().unwrap_or_default(),
            help_url: finding.help_url.clone().unwrap_or_default(),
        }
    }

    /// Cells in `VIOLATION_DETAILS_HEADER` order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.site_url.clone(),
            self.page_url.clone(),
            self.rule_id.clone(),
            self.severity.clone(),
            self.description.clone(),
            self.help_url.clone(),
        ]
    }
}
