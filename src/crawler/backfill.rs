//! Violation detail backfill
//!
//! Fills in `ViolationDetails` rows for pages that were scored but never had
//! their individual findings logged. Pages are audited by a fixed pool of
//! workers pulling from a bounded job channel; the coordinating task is the
//! only writer and flushes rows in batches.

use crate::audit::{classify, PageAuditor, Renderer};
use crate::config::BackfillConfig;
use crate::state::ProgressLedger;
use crate::storage::{TabularStore, ViolationDetail};
use crate::url::page_key;
use crate::AuditError;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// A scored page that still needs detail rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageJob {
    pub site_url: String,
    pub page_url: String,
}

/// Counters for one backfill run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub pages_queued: usize,
    pub pages_succeeded: usize,
    pub rows_written: usize,
    pub batches_flushed: usize,
    /// Pages that exhausted their retries, sorted
    pub failed_pages: Vec<String>,
}

#[derive(Debug)]
enum PageOutcome {
    Succeeded {
        page_url: String,
        details: Vec<ViolationDetail>,
    },
    Failed {
        page_url: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

/// Parallel backfill coordinator
pub struct BackfillCoordinator<S: TabularStore> {
    ledger: ProgressLedger<S>,
    renderer: Arc<dyn Renderer>,
    auditor: PageAuditor,
    workers: usize,
    batch_size: usize,
    retry: RetryPolicy,
}

impl<S: TabularStore> BackfillCoordinator<S> {
    pub fn new(
        ledger: ProgressLedger<S>,
        renderer: Arc<dyn Renderer>,
        auditor: PageAuditor,
        config: &BackfillConfig,
    ) -> Self {
        Self {
            ledger,
            renderer,
            auditor,
            workers: config.workers.max(1) as usize,
            batch_size: config.batch_size.max(1) as usize,
            retry: RetryPolicy {
                attempts: config.retry_attempts.max(1),
                delay: Duration::from_millis(config.retry_delay_ms),
            },
        }
    }

    /// Audits every scored page without detail rows and appends its findings
    ///
    /// Pages that keep failing are listed in the report and do not stop the
    /// run. A failed batch write does: workers stop taking jobs, the pages
    /// already in progress finish and close their sessions, and the error is
    /// returned.
    pub async fn run(&mut self) -> crate::Result<BackfillReport> {
        self.ledger.prepare()?;
        let scored = self.ledger.load_scored_pages()?;
        let detailed = self.ledger.load_detailed_pages()?;

        let jobs = pages_to_backfill(&scored, &detailed);
        let mut report = BackfillReport {
            pages_queued: jobs.len(),
            ..Default::default()
        };

        tracing::info!(
            "{} scored page(s), {} already detailed, {} to backfill",
            scored.len(),
            detailed.len(),
            jobs.len()
        );

        if jobs.is_empty() {
            return Ok(report);
        }

        let workers = self.workers.min(jobs.len());
        let (job_tx, job_rx) = mpsc::channel::<PageJob>(workers * 2);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<PageOutcome>(workers * 2);

        let stop = Arc::new(AtomicBool::new(false));

        let producer = tokio::spawn(async move {
            for job in jobs {
                if job_tx.send(job).await.is_err() {
                    break;
                }
            }
        });

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let stop = Arc::clone(&stop);
            let renderer = Arc::clone(&self.renderer);
            let auditor = self.auditor.clone();
            let retry = self.retry;

            handles.push(tokio::spawn(async move {
                while !stop.load(Ordering::SeqCst) {
                    let job = {
                        let mut rx = job_rx.lock().await;
                        rx.recv().await
                    };
                    let Some(job) = job else { break };
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }

                    let outcome = process_page(renderer.as_ref(), &auditor, retry, job).await;
                    if result_tx.send(outcome).await.is_err() {
                        break;
                    }
                }
                tracing::debug!("Backfill worker {} finished", worker_id);
            }));
        }
        drop(result_tx);

        if let Err(e) = self.collect(&mut result_rx, &mut report).await {
            // Workers finish the page in hand, closing its session, then exit
            stop.store(true, Ordering::SeqCst);
            producer.abort();
            drop(result_rx);
            for handle in handles {
                if let Err(join) = handle.await {
                    tracing::warn!("Backfill worker ended abnormally: {}", join);
                }
            }
            return Err(e);
        }

        producer
            .await
            .map_err(|e| AuditError::Worker(e.to_string()))?;
        for handle in handles {
            handle
                .await
                .map_err(|e| AuditError::Worker(e.to_string()))?;
        }

        report.failed_pages.sort();
        tracing::info!(
            "Backfill complete: {}/{} page(s) succeeded, {} row(s) in {} batch(es)",
            report.pages_succeeded,
            report.pages_queued,
            report.rows_written,
            report.batches_flushed
        );
        for page in &report.failed_pages {
            tracing::warn!("Needs manual review: {}", page);
        }

        Ok(report)
    }

    /// Drains worker outcomes, flushing whenever the batch reaches its size
    ///
    /// Rows of one page are never split across batches, so a flushed batch
    /// may exceed the configured size.
    async fn collect(
        &mut self,
        result_rx: &mut mpsc::Receiver<PageOutcome>,
        report: &mut BackfillReport,
    ) -> crate::Result<()> {
        let mut batch: Vec<ViolationDetail> = Vec::new();

        while let Some(outcome) = result_rx.recv().await {
            match outcome {
                PageOutcome::Succeeded { page_url, details } => {
                    tracing::debug!("{}: {} finding(s)", page_url, details.len());
                    report.pages_succeeded += 1;
                    batch.extend(details);
                    if batch.len() >= self.batch_size {
                        self.flush(&mut batch, report)?;
                    }
                }
                PageOutcome::Failed { page_url, reason } => {
                    tracing::warn!("Giving up on {}: {}", page_url, reason);
                    report.failed_pages.push(page_url);
                }
            }
        }

        self.flush(&mut batch, report)
    }

    fn flush(
        &mut self,
        batch: &mut Vec<ViolationDetail>,
        report: &mut BackfillReport,
    ) -> crate::Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        self.ledger.append_violation_details(batch)?;
        tracing::info!("Wrote batch of {} detail row(s)", batch.len());

        report.rows_written += batch.len();
        report.batches_flushed += 1;
        batch.clear();
        Ok(())
    }

    pub fn ledger(&self) -> &ProgressLedger<S> {
        &self.ledger
    }

    pub fn into_ledger(self) -> ProgressLedger<S> {
        self.ledger
    }
}

/// Scored pages that have no detail rows yet, sorted by page URL
pub fn pages_to_backfill(
    scored: &HashMap<String, String>,
    detailed: &HashSet<String>,
) -> Vec<PageJob> {
    let mut jobs: Vec<PageJob> = scored
        .iter()
        .filter(|(page, _)| !detailed.contains(&page_key(page)))
        .map(|(page, site)| PageJob {
            site_url: site.clone(),
            page_url: page.clone(),
        })
        .collect();

    jobs.sort_by(|a, b| a.page_url.cmp(&b.page_url));
    jobs
}

/// Audits one page in its own session, retrying up to the policy's limit
async fn process_page(
    renderer: &dyn Renderer,
    auditor: &PageAuditor,
    retry: RetryPolicy,
    job: PageJob,
) -> PageOutcome {
    let mut session = match renderer.new_session().await {
        Ok(session) => session,
        Err(e) => {
            return PageOutcome::Failed {
                page_url: job.page_url,
                reason: e.to_string(),
            }
        }
    };

    let mut last_error = String::new();
    let mut details = None;

    for attempt in 1..=retry.attempts {
        let attempted = match auditor.audit(session.as_mut(), &job.page_url).await {
            Ok(findings) => classify(&findings).map_err(|e| e.to_string()),
            Err(failure) => Err(failure.reason),
        };

        match attempted {
            Ok(classified) => {
                details = Some(
                    classified
                        .details
                        .iter()
                        .map(|finding| ViolationDetail::new(&job.site_url, &job.page_url, finding))
                        .collect::<Vec<_>>(),
                );
                break;
            }
            Err(reason) => {
                tracing::debug!(
                    "Attempt {}/{} for {} failed: {}",
                    attempt,
                    retry.attempts,
                    job.page_url,
                    reason
                );
                last_error = reason;
            }
        }

        if attempt < retry.attempts {
            tokio::time::sleep(retry.delay).await;
        }
    }

    session.close().await;

    match details {
        Some(details) => PageOutcome::Succeeded {
            page_url: job.page_url,
            details,
        },
        None => PageOutcome::Failed {
            page_url: job.page_url,
            reason: last_error,
        },
    }
}
