//! Scripted collaborators shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wcag_auditor::audit::{PageAuditor, RenderError, RenderSession, Renderer, RuleEngine};
use wcag_auditor::crawler::LinkDiscovery;
use wcag_auditor::state::ProgressLedger;
use wcag_auditor::storage::{Record, SqliteStore, StorageError, StorageResult, TabularStore};

/// Opens a prepared ledger over a SQLite file in `dir`
pub fn ledger_in(dir: &Path) -> ProgressLedger<SqliteStore> {
    let store = SqliteStore::new(&dir.join("audit.db")).unwrap();
    let mut ledger = ProgressLedger::new(store);
    ledger.prepare().unwrap();
    ledger
}

/// Findings with one AA-level violation, classified as tier "A"
pub fn aa_findings() -> Value {
    json!({
        "violations": [{
            "id": "color-contrast",
            "impact": "serious",
            "description": "Elements must meet minimum color contrast ratio thresholds",
            "tags": ["cat.color", "wcag2aa", "wcag143"],
            "helpUrl": "https://dequeuniversity.com/rules/axe/color-contrast"
        }]
    })
}

/// Returns a fixed set of links for every site
pub struct FixedDiscovery {
    pub links: Vec<String>,
    pub calls: AtomicUsize,
}

impl FixedDiscovery {
    pub fn new(links: &[&str]) -> Self {
        Self {
            links: links.iter().map(|l| l.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LinkDiscovery for FixedDiscovery {
    async fn discover(&self, _base_url: &str, limit: usize) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.links.iter().take(limit).cloned().collect()
    }
}

/// Renderer whose sessions report the current URL as their markup
#[derive(Default)]
pub struct FakeRenderer {
    pub opened: AtomicUsize,
    pub closed: Arc<AtomicUsize>,
    /// URLs whose navigation always fails
    pub unreachable: HashSet<String>,
}

impl FakeRenderer {
    pub fn with_unreachable(urls: &[&str]) -> Self {
        Self {
            unreachable: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_session(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            current: String::new(),
            unreachable: self.unreachable.clone(),
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct FakeSession {
    current: String,
    unreachable: HashSet<String>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), RenderError> {
        if self.unreachable.contains(url) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.current = url.to_string();
        Ok(())
    }

    async fn rendered_markup(&mut self) -> Result<String, RenderError> {
        Ok(self.current.clone())
    }

    async fn evaluate(&mut self, _script: &str) -> Result<Value, RenderError> {
        Ok(Value::Null)
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Rule engine that answers per page URL
///
/// Pages listed in `flaky` fail that many times before succeeding.
pub struct ScriptedEngine {
    default: Value,
    per_page: HashMap<String, Value>,
    flaky: Mutex<HashMap<String, usize>>,
}

impl ScriptedEngine {
    pub fn always(findings: Value) -> Self {
        Self {
            default: findings,
            per_page: HashMap::new(),
            flaky: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_page(mut self, url: &str, findings: Value) -> Self {
        self.per_page.insert(url.to_string(), findings);
        self
    }

    pub fn with_flaky(self, url: &str, failures: usize) -> Self {
        self.flaky.lock().unwrap().insert(url.to_string(), failures);
        self
    }
}

#[async_trait]
impl RuleEngine for ScriptedEngine {
    async fn run(&self, session: &mut dyn RenderSession) -> Result<Value, RenderError> {
        let url = session.rendered_markup().await?;

        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(remaining) = flaky.get_mut(&url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(RenderError::Script("axe timed out".to_string()));
                }
            }
        }

        Ok(self
            .per_page
            .get(&url)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

pub fn auditor(engine: ScriptedEngine) -> PageAuditor {
    PageAuditor::new(Arc::new(engine), Duration::from_secs(5), Duration::ZERO)
}

pub fn disk_full() -> StorageError {
    StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
}

/// Store that accepts worksheet setup but rejects every row
pub struct RejectingStore(pub SqliteStore);

impl TabularStore for RejectingStore {
    fn ensure_worksheet(&mut self, name: &str, header: &[&str]) -> StorageResult<bool> {
        self.0.ensure_worksheet(name, header)
    }

    fn header(&self, name: &str) -> StorageResult<Vec<String>> {
        self.0.header(name)
    }

    fn read_records(&self, name: &str) -> StorageResult<Vec<Record>> {
        self.0.read_records(name)
    }

    fn read_column(&self, name: &str, column: &str) -> StorageResult<Vec<String>> {
        self.0.read_column(name, column)
    }

    fn append_row(&mut self, _name: &str, _row: &[String]) -> StorageResult<()> {
        Err(disk_full())
    }

    fn append_rows(&mut self, _name: &str, _rows: &[Vec<String>]) -> StorageResult<()> {
        Err(disk_full())
    }

    fn count_rows(&self, name: &str) -> StorageResult<u64> {
        self.0.count_rows(name)
    }
}
