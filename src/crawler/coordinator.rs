//! Audit coordinator - main audit orchestration logic
//!
//! Walks the configured sites in order. For each site it:
//! - Skips the site if enough pages are already on record
//! - Discovers candidate pages from the site root
//! - Audits and classifies each candidate in one shared rendering session
//! - Appends one audit record per successful page

use crate::audit::{classify, PageAuditor, RenderSession, Renderer};
use crate::crawler::discoverer::LinkDiscovery;
use crate::state::{ProgressLedger, SiteState};
use crate::storage::{AuditRecord, TabularStore, TIMESTAMP_FORMAT};
use crate::url::{page_key, Site};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Counters for one audit run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub sites_skipped: usize,
    pub sites_audited: usize,
    pub pages_audited: usize,
    pub pages_failed: usize,
    pub records_written: usize,
}

/// Main audit coordinator structure
pub struct AuditCoordinator<S: TabularStore> {
    sites: Vec<Site>,
    target: usize,
    ledger: ProgressLedger<S>,
    discoverer: Arc<dyn LinkDiscovery>,
    renderer: Arc<dyn Renderer>,
    auditor: PageAuditor,
}

impl<S: TabularStore> AuditCoordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `sites` - Sites to audit, in order
    /// * `target` - Number of audited pages each site should end up with
    /// * `ledger` - Progress ledger over the audit worksheets
    /// * `discoverer` - Source of candidate pages
    /// * `renderer` - Source of the shared rendering session
    /// * `auditor` - Per-page auditor
    pub fn new(
        sites: Vec<Site>,
        target: usize,
        ledger: ProgressLedger<S>,
        discoverer: Arc<dyn LinkDiscovery>,
        renderer: Arc<dyn Renderer>,
        auditor: PageAuditor,
    ) -> Self {
        Self {
            sites,
            target,
            ledger,
            discoverer,
            renderer,
            auditor,
        }
    }

    /// Runs one pass over every configured site
    ///
    /// The rendering session is opened on the first page that needs it and
    /// closed before returning, whether the run succeeded or not. Failing to
    /// open it, or failing to write a record, ends the run with an error.
    pub async fn run(&mut self) -> crate::Result<RunReport> {
        self.ledger.prepare()?;
        let progress = self.ledger.load_progress();

        tracing::info!(
            "Starting audit of {} site(s), target {} page(s) each",
            self.sites.len(),
            self.target
        );

        let mut session: Option<Box<dyn RenderSession>> = None;
        let result = self.audit_sites(&progress, &mut session).await;

        if let Some(mut session) = session {
            session.close().await;
        }

        if let Ok(report) = &result {
            tracing::info!(
                "Audit complete: {} site(s) audited, {} skipped, {} page(s) recorded, {} failed",
                report.sites_audited,
                report.sites_skipped,
                report.pages_audited,
                report.pages_failed
            );
        }

        result
    }

    async fn audit_sites(
        &mut self,
        progress: &HashMap<String, HashSet<String>>,
        session: &mut Option<Box<dyn RenderSession>>,
    ) -> crate::Result<RunReport> {
        let mut report = RunReport::default();
        let no_pages = HashSet::new();

        for site in self.sites.clone() {
            let audited = progress.get(site.key()).unwrap_or(&no_pages);
            let mut state = SiteState::Pending;

            if audited.len() >= self.target {
                state.advance(SiteState::Skipped)?;
                tracing::info!(
                    "{} already has {} audited page(s), skipping",
                    site,
                    audited.len()
                );
                report.sites_skipped += 1;
                continue;
            }

            state = state.advance(SiteState::Discovering)?;
            let needed = self.target - audited.len();
            tracing::info!("{}: {} audited, looking for {} more", site, audited.len(), needed);

            let discovered = self
                .discoverer
                .discover(site.url(), self.target.saturating_mul(2))
                .await;
            let candidates = plan_candidates(&site, audited, &discovered, needed);

            if candidates.is_empty() {
                tracing::info!("{}: no new pages to audit", site);
                state.advance(SiteState::Done)?;
                continue;
            }

            report.sites_audited += 1;

            for page in &candidates {
                state = state.advance(SiteState::Auditing)?;

                let opened = match session.take() {
                    Some(opened) => opened,
                    None => self.renderer.new_session().await?,
                };
                let active = session.insert(opened);

                let findings = match self.auditor.audit(active.as_mut(), page).await {
                    Ok(findings) => findings,
                    Err(failure) => {
                        tracing::warn!("{}: {}", site, failure);
                        report.pages_failed += 1;
                        continue;
                    }
                };

                let classified = match classify(&findings) {
                    Ok(classified) => classified,
                    Err(e) => {
                        tracing::warn!("{}: could not classify {}: {}", site, page, e);
                        report.pages_failed += 1;
                        continue;
                    }
                };

                state = state.advance(SiteState::Persisting)?;
                let record = AuditRecord::new(site.url(), page, &classified, timestamp());
                self.ledger.append_audit_record(&record)?;

                tracing::info!(
                    "{}: {} is {} ({} violation(s))",
                    site,
                    page,
                    classified.tier,
                    classified.counts.total
                );
                report.pages_audited += 1;
                report.records_written += 1;
            }

            state.advance(SiteState::Done)?;
        }

        Ok(report)
    }

    pub fn ledger(&self) -> &ProgressLedger<S> {
        &self.ledger
    }

    pub fn into_ledger(self) -> ProgressLedger<S> {
        self.ledger
    }
}

/// Chooses the pages to audit for one site
///
/// The site root comes first when it has not been audited. Discovered pages
/// that are not yet audited follow in discovery order, up to `needed` of them.
/// The root does not count against `needed`.
pub fn plan_candidates(
    site: &Site,
    audited: &HashSet<String>,
    discovered: &[String],
    needed: usize,
) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut queued = HashSet::new();

    if !audited.contains(site.key()) {
        candidates.push(site.url().to_string());
        queued.insert(site.key().to_string());
    }

    let mut added = 0;
    for page in discovered {
        if added >= needed {
            break;
        }

        let key = page_key(page);
        if audited.contains(&key) || !queued.insert(key) {
            continue;
        }

        candidates.push(page.clone());
        added += 1;
    }

    candidates
}

fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
