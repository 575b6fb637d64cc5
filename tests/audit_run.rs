//! End-to-end tests for the sequential audit run

mod common;

use common::{
    aa_findings, auditor, ledger_in, FakeRenderer, FixedDiscovery, RejectingStore, ScriptedEngine,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use wcag_auditor::crawler::AuditCoordinator;
use wcag_auditor::storage::{AuditRecord, SqliteStore, TabularStore, AUDIT_RECORDS_SHEET};
use wcag_auditor::url::Site;
use wcag_auditor::{AuditError, ProgressLedger};

fn audit_records(ledger: &ProgressLedger<SqliteStore>) -> Vec<AuditRecord> {
    ledger
        .store()
        .read_records(AUDIT_RECORDS_SHEET)
        .unwrap()
        .iter()
        .filter_map(AuditRecord::from_record)
        .collect()
}

#[tokio::test]
async fn test_fresh_site_then_resumed_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sites = vec![Site::new("example.com").unwrap()];
    let discovery = Arc::new(FixedDiscovery::new(&[
        "https://example.com/a",
        "https://example.com/b",
    ]));
    let renderer = Arc::new(FakeRenderer::default());

    let mut first = AuditCoordinator::new(
        sites.clone(),
        3,
        ledger_in(dir.path()),
        discovery.clone(),
        renderer.clone(),
        auditor(ScriptedEngine::always(aa_findings())),
    );
    let report = first.run().await.unwrap();

    assert_eq!(report.records_written, 3);
    assert_eq!(report.sites_audited, 1);
    assert_eq!(report.pages_failed, 0);

    let records = audit_records(first.ledger());
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.compliance_level == "A"));
    assert!(records.iter().all(|r| r.site_url == "https://example.com"));
    assert_eq!(records[0].page_url, "https://example.com");
    assert_eq!(records[1].page_url, "https://example.com/a");
    assert_eq!(records[0].aa_violations, 1);
    assert_eq!(records[0].severe, 1);
    drop(first);

    let mut second = AuditCoordinator::new(
        sites,
        3,
        ledger_in(dir.path()),
        discovery.clone(),
        renderer.clone(),
        auditor(ScriptedEngine::always(aa_findings())),
    );
    let report = second.run().await.unwrap();

    assert_eq!(report.records_written, 0);
    assert_eq!(report.sites_skipped, 1);
    assert_eq!(audit_records(second.ledger()).len(), 3);
    assert_eq!(discovery.calls.load(Ordering::SeqCst), 1);

    // One session for the first run, none for the second
    assert_eq!(renderer.opened.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_partial_progress_only_fills_the_gap() {
    let dir = tempfile::tempdir().unwrap();
    let sites = vec![Site::new("https://example.com/").unwrap()];

    let mut seed = AuditCoordinator::new(
        sites.clone(),
        1,
        ledger_in(dir.path()),
        Arc::new(FixedDiscovery::new(&[])),
        Arc::new(FakeRenderer::default()),
        auditor(ScriptedEngine::always(json!({ "violations": [] }))),
    );
    assert_eq!(seed.run().await.unwrap().records_written, 1);
    drop(seed);

    let mut resumed = AuditCoordinator::new(
        sites,
        3,
        ledger_in(dir.path()),
        Arc::new(FixedDiscovery::new(&[
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c",
        ])),
        Arc::new(FakeRenderer::default()),
        auditor(ScriptedEngine::always(json!({ "violations": [] }))),
    );
    let report = resumed.run().await.unwrap();

    assert_eq!(report.records_written, 2);
    let pages: Vec<String> = audit_records(resumed.ledger())
        .into_iter()
        .map(|r| r.page_url)
        .collect();
    assert_eq!(
        pages,
        vec![
            "https://example.com/",
            "https://example.com/a",
            "https://example.com/b"
        ]
    );
}

#[tokio::test]
async fn test_failed_and_unclassifiable_pages_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ScriptedEngine::always(json!({ "violations": [] }))
        .with_page("https://example.com/broken", json!({ "error": "no results" }));

    let mut coordinator = AuditCoordinator::new(
        vec![Site::new("example.com").unwrap()],
        5,
        ledger_in(dir.path()),
        Arc::new(FixedDiscovery::new(&[
            "https://example.com/down",
            "https://example.com/broken",
            "https://example.com/ok",
        ])),
        Arc::new(FakeRenderer::with_unreachable(&["https://example.com/down"])),
        auditor(engine),
    );
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_failed, 2);
    assert_eq!(report.records_written, 2);
    let records = audit_records(coordinator.ledger());
    assert!(records.iter().all(|r| r.compliance_level == "AAA"));
}

#[tokio::test]
async fn test_sites_in_order_and_empty_site_moves_on() {
    let dir = tempfile::tempdir().unwrap();

    let mut coordinator = AuditCoordinator::new(
        vec![
            Site::new("one.example").unwrap(),
            Site::new("two.example").unwrap(),
        ],
        1,
        ledger_in(dir.path()),
        Arc::new(FixedDiscovery::new(&[])),
        Arc::new(FakeRenderer::default()),
        auditor(ScriptedEngine::always(json!({ "violations": [] }))),
    );
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.sites_audited, 2);
    let sites: Vec<String> = audit_records(coordinator.ledger())
        .into_iter()
        .map(|r| r.site_url)
        .collect();
    assert_eq!(sites, vec!["https://one.example", "https://two.example"]);
}

#[tokio::test]
async fn test_write_failure_is_fatal_and_session_closed() {
    let dir = tempfile::tempdir().unwrap();
    let store = RejectingStore(SqliteStore::new(&dir.path().join("audit.db")).unwrap());
    let renderer = Arc::new(FakeRenderer::default());

    let mut coordinator = AuditCoordinator::new(
        vec![Site::new("example.com").unwrap()],
        3,
        ProgressLedger::new(store),
        Arc::new(FixedDiscovery::new(&["https://example.com/a"])),
        renderer.clone(),
        auditor(ScriptedEngine::always(json!({ "violations": [] }))),
    );
    let result = coordinator.run().await;

    assert!(matches!(result.unwrap_err(), AuditError::Storage(_)));
    assert_eq!(renderer.opened.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.closed.load(Ordering::SeqCst), 1);
}
