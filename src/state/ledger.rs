//! Progress ledger
//!
//! Reconstructs what has already been audited from the persisted worksheets,
//! and is the single append path for new rows.

use crate::storage::{
    AuditRecord, StorageResult, TabularStore, ViolationDetail, AUDIT_RECORDS_HEADER,
    AUDIT_RECORDS_SHEET, VIOLATION_DETAILS_HEADER, VIOLATION_DETAILS_SHEET,
};
use crate::url::page_key;
use std::collections::{HashMap, HashSet};

/// Read and append access to the audit worksheets
pub struct ProgressLedger<S: TabularStore> {
    store: S,
}

impl<S: TabularStore> ProgressLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates both worksheets with their headers if absent
    pub fn prepare(&mut self) -> StorageResult<()> {
        self.store
            .ensure_worksheet(AUDIT_RECORDS_SHEET, &AUDIT_RECORDS_HEADER)?;
        self.store
            .ensure_worksheet(VIOLATION_DETAILS_SHEET, &VIOLATION_DETAILS_HEADER)?;
        Ok(())
    }

    /// Loads the set of audited page keys per site key
    ///
    /// Any audit record for a page counts, regardless of its timestamp. A read
    /// failure is logged and treated as "nothing audited yet".
    pub fn load_progress(&self) -> HashMap<String, HashSet<String>> {
        let records = match self.store.read_records(AUDIT_RECORDS_SHEET) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Could not read audit progress, starting fresh: {}", e);
                return HashMap::new();
            }
        };

        let mut progress: HashMap<String, HashSet<String>> = HashMap::new();
        for record in records.iter().filter_map(AuditRecord::from_record) {
            progress
                .entry(page_key(&record.site_url))
                .or_default()
                .insert(page_key(&record.page_url));
        }

        tracing::debug!(
            "Loaded audit progress for {} site(s) from {} record(s)",
            progress.len(),
            records.len()
        );
        progress
    }

    /// Loads every scored page with the site it was recorded under
    ///
    /// Pages are keyed by their recorded URL. When one page appears under
    /// several spellings, the first recorded row wins.
    pub fn load_scored_pages(&self) -> StorageResult<HashMap<String, String>> {
        let records = self.store.read_records(AUDIT_RECORDS_SHEET)?;

        let mut seen = HashSet::new();
        let mut scored = HashMap::new();
        for record in records.iter().filter_map(AuditRecord::from_record) {
            if seen.insert(page_key(&record.page_url)) {
                scored.insert(record.page_url, record.site_url);
            }
        }

        Ok(scored)
    }

    /// Loads the keys of pages that already have at least one detail row
    pub fn load_detailed_pages(&self) -> StorageResult<HashSet<String>> {
        let pages = self
            .store
            .read_column(VIOLATION_DETAILS_SHEET, "Sub_Page")?
            .iter()
            .map(|page| page.trim())
            .filter(|page| !page.is_empty())
            .map(page_key)
            .collect();

        Ok(pages)
    }

    /// Appends one audit record
    pub fn append_audit_record(&mut self, record: &AuditRecord) -> StorageResult<()> {
        self.store.append_row(AUDIT_RECORDS_SHEET, &record.to_row())
    }

    /// Appends a batch of detail rows in one write
    pub fn append_violation_details(&mut self, details: &[ViolationDetail]) -> StorageResult<()> {
        let rows: Vec<Vec<String>> = details.iter().map(ViolationDetail::to_row).collect();
        self.store.append_rows(VIOLATION_DETAILS_SHEET, &rows)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    fn record(site: &str, page: &str) -> AuditRecord {
        AuditRecord {
            site_url: site.to_string(),
            page_url: page.to_string(),
            compliance_level: "AAA".to_string(),
            total_violations: 0,
            a_violations: 0,
            aa_violations: 0,
            aaa_violations: 0,
            severe: 0,
            moderate: 0,
            mild: 0,
            unknown: 0,
            recorded_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    fn detail(site: &str, page: &str) -> ViolationDetail {
        ViolationDetail {
            site_url: site.to_string(),
            page_url: page.to_string(),
            rule_id: "label".to_string(),
            severity: "critical".to_string(),
            description: String::new(),
            help_url: String::new(),
        }
    }

    fn ledger() -> ProgressLedger<SqliteStore> {
        let mut ledger = ProgressLedger::new(SqliteStore::new_in_memory().unwrap());
        ledger.prepare().unwrap();
        ledger
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let mut ledger = ledger();
        ledger.prepare().unwrap();
        assert_eq!(
            ledger.store().header(AUDIT_RECORDS_SHEET).unwrap().len(),
            AUDIT_RECORDS_HEADER.len()
        );
    }

    #[test]
    fn test_progress_from_interleaved_rows() {
        let mut ledger = ledger();
        ledger.append_audit_record(&record("https://a.com", "https://a.com")).unwrap();
        ledger.append_audit_record(&record("https://b.com", "https://b.com/x")).unwrap();
        ledger.append_audit_record(&record("https://a.com", "https://a.com/1")).unwrap();
        ledger.append_audit_record(&record("https://a.com/", "https://a.com/1/")).unwrap();

        let progress = ledger.load_progress();

        assert_eq!(progress.len(), 2);
        assert_eq!(progress["https://a.com"].len(), 2);
        assert!(progress["https://a.com"].contains("https://a.com/1"));
        assert_eq!(progress["https://b.com"].len(), 1);
    }

    #[test]
    fn test_progress_degrades_to_empty_on_read_failure() {
        let ledger = ProgressLedger::new(SqliteStore::new_in_memory().unwrap());
        assert!(ledger.load_progress().is_empty());
    }

    #[test]
    fn test_scored_pages_first_spelling_wins() {
        let mut ledger = ledger();
        ledger.append_audit_record(&record("https://a.com", "https://a.com/p")).unwrap();
        ledger.append_audit_record(&record("https://a.com", "https://a.com/p/")).unwrap();
        ledger.append_audit_record(&record("https://a.com", "https://a.com/q")).unwrap();

        let scored = ledger.load_scored_pages().unwrap();

        assert_eq!(scored.len(), 2);
        assert_eq!(scored["https://a.com/p"], "https://a.com");
        assert!(!scored.contains_key("https://a.com/p/"));
    }

    #[test]
    fn test_detailed_pages_are_keys() {
        let mut ledger = ledger();
        ledger
            .append_violation_details(&[
                detail("https://a.com", "https://a.com/p/"),
                detail("https://a.com", "https://a.com/p"),
                detail("https://a.com", "a.com/q"),
            ])
            .unwrap();

        let detailed = ledger.load_detailed_pages().unwrap();

        assert_eq!(detailed.len(), 2);
        assert!(detailed.contains("https://a.com/p"));
        assert!(detailed.contains("https://a.com/q"));
    }

    #[test]
    fn test_scored_pages_propagates_missing_worksheet() {
        let ledger = ProgressLedger::new(SqliteStore::new_in_memory().unwrap());
        assert!(ledger.load_scored_pages().is_err());
        assert!(ledger.load_detailed_pages().is_err());
    }
}
