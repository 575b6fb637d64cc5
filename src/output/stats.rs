//! Per-site compliance statistics
//!
//! Rolls the persisted audit records up into one summary per site.

use crate::audit::ComplianceTier;
use crate::output::{OutputError, OutputResult};
use crate::storage::{AuditRecord, TabularStore, AUDIT_RECORDS_SHEET};
use crate::url::page_key;
use std::collections::HashMap;

/// Compliance roll-up for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    /// Site URL as first recorded
    pub site_url: String,

    /// Worst tier across the site's pages
    pub overall: ComplianceTier,

    /// Number of audit records for the site
    pub pages_analyzed: u64,

    pub total_violations: u64,
    pub severe: u64,
    pub moderate: u64,
    pub mild: u64,
}

/// Summarizes records per site, in order of first appearance
///
/// Records whose compliance level is not a known tier are ignored.
pub fn summarize(records: &[AuditRecord]) -> Vec<SiteSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut summaries: Vec<SiteSummary> = Vec::new();

    for record in records {
        let tier = match ComplianceTier::from_label(&record.compliance_level) {
            Some(tier) => tier,
            None => {
                tracing::debug!(
                    "Ignoring {} with unknown compliance level '{}'",
                    record.page_url,
                    record.compliance_level
                );
                continue;
            }
        };

        let position = *index.entry(page_key(&record.site_url)).or_insert_with(|| {
            summaries.push(SiteSummary {
                site_url: record.site_url.clone(),
                overall: tier,
                pages_analyzed: 0,
                total_violations: 0,
                severe: 0,
                moderate: 0,
                mild: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[position];
        summary.overall = summary.overall.min(tier);
        summary.pages_analyzed += 1;
        summary.total_violations += u64::from(record.total_violations);
        summary.severe += u64::from(record.severe);
        summary.moderate += u64::from(record.moderate);
        summary.mild += u64::from(record.mild);
    }

    summaries
}

/// Loads and summarizes every audit record in the store
pub fn load_site_summaries<S: TabularStore>(store: &S) -> OutputResult<Vec<SiteSummary>> {
    let records: Vec<AuditRecord> = store
        .read_records(AUDIT_RECORDS_SHEET)
        .map_err(|e| OutputError::Storage(e.to_string()))?
        .iter()
        .filter_map(AuditRecord::from_record)
        .collect();

    Ok(summarize(&records))
}

/// Prints site summaries to stdout in a formatted manner
pub fn print_summary(summaries: &[SiteSummary]) {
    println!("=== Compliance Summary ===\n");

    if summaries.is_empty() {
        println!("No audit records found.");
        return;
    }

    for summary in summaries {
        println!("{}", summary.site_url);
        println!("  Overall compliance: {}", summary.overall);
        println!("  Pages analyzed: {}", summary.pages_analyzed);
        println!(
            "  Violations: {} total ({} severe, {} moderate, {} mild)",
            summary.total_violations, summary.severe, summary.moderate, summary.mild
        );
        println!();
    }

    let below_a = summaries
        .iter()
        .filter(|s| s.overall == ComplianceTier::BelowA)
        .count();
    println!(
        "{} site(s) summarized, {} below level A",
        summaries.len(),
        below_a
    );
}
