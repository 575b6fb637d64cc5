//! WCAG Auditor main entry point
//!
//! This is the command-line interface for the resumable accessibility auditor.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wcag_auditor::audit::{AxeRuleEngine, ChromeRenderer, PageAuditor};
use wcag_auditor::config::{load_config_with_hash, Config};
use wcag_auditor::crawler::{AuditCoordinator, BackfillCoordinator, HttpLinkDiscoverer};
use wcag_auditor::output::{generate_markdown_summary, load_site_summaries, print_summary};
use wcag_auditor::state::ProgressLedger;
use wcag_auditor::storage::open_storage;

/// WCAG Auditor: sample pages from each site and record their compliance tier
///
/// Runs are resumable: pages already on record are never audited again, and
/// a site that already has enough audited pages is skipped.
#[derive(Parser, Debug)]
#[command(name = "wcag-auditor")]
#[command(version = "1.0.0")]
#[command(about = "Resumable WCAG compliance auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Backfill violation details for scored pages and exit
    #[arg(long, conflicts_with_all = ["summary", "dry_run"])]
    backfill: bool,

    /// Write the compliance summary from existing records and exit
    #[arg(long, conflicts_with_all = ["backfill", "dry_run"])]
    summary: bool,

    /// Validate config and show what would be audited without auditing
    #[arg(long, conflicts_with_all = ["backfill", "summary"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.summary {
        handle_summary(&config)
    } else if cli.backfill {
        handle_backfill(&config).await
    } else {
        handle_audit(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wcag_auditor=info,warn"),
            1 => EnvFilter::new("wcag_auditor=debug,info"),
            2 => EnvFilter::new("wcag_auditor=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be audited
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== WCAG Auditor Dry Run ===\n");

    println!("Audit:");
    println!("  Target sample size: {}", config.audit.target_sample_size);
    println!("  Timeout: {}s", config.audit.timeout_seconds);
    println!("  Settle delay: {}ms", config.audit.settle_delay_ms);

    println!("\nBackfill:");
    println!("  Workers: {}", config.backfill.workers);
    println!("  Batch size: {}", config.backfill.batch_size);
    println!(
        "  Retry: {} attempt(s), {}ms apart",
        config.backfill.retry_attempts, config.backfill.retry_delay_ms
    );

    println!("\nDiscovery:");
    println!("  User agent: {}", config.discovery.user_agent);
    println!(
        "  Excluded extensions: {}",
        config.discovery.excluded_extensions.join(" ")
    );

    println!("\nBrowser:");
    println!("  axe-core script: {}", config.browser.axe_script_path);
    if let Some(executable) = &config.browser.executable {
        println!("  Executable: {}", executable);
    }
    println!("  Headless: {}", config.browser.headless);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    let sites = config.sites()?;
    println!("\nSites ({}):", sites.len());
    for site in &sites {
        println!("  - {}", site);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --summary mode: rolls up existing records per site
fn handle_summary(config: &Config) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open audit database")?;
    let mut ledger = ProgressLedger::new(store);
    ledger.prepare()?;

    let summaries = load_site_summaries(ledger.store())?;
    print_summary(&summaries);

    generate_markdown_summary(&summaries, Path::new(&config.output.summary_path))?;
    println!("\n✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the --backfill mode: fills in missing violation details
async fn handle_backfill(config: &Config) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open audit database")?;
    let ledger = ProgressLedger::new(store);

    let renderer = Arc::new(ChromeRenderer::new(&config.browser));
    let auditor = build_auditor(config)?;

    let mut coordinator = BackfillCoordinator::new(ledger, renderer, auditor, &config.backfill);
    let report = coordinator.run().await?;

    println!(
        "Backfill: {} of {} page(s) succeeded, {} detail row(s) written in {} batch(es)",
        report.pages_succeeded, report.pages_queued, report.rows_written, report.batches_flushed
    );
    if !report.failed_pages.is_empty() {
        println!("\nThe following pages failed and should be reviewed manually:");
        for page in &report.failed_pages {
            println!("  - {}", page);
        }
    }

    Ok(())
}

/// Handles the main audit run
async fn handle_audit(config: &Config) -> anyhow::Result<()> {
    let sites = config.sites()?;
    let store = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open audit database")?;
    let ledger = ProgressLedger::new(store);

    let discoverer = Arc::new(HttpLinkDiscoverer::new(
        &config.discovery,
        Duration::from_secs(config.audit.timeout_seconds),
    )?);
    let renderer = Arc::new(ChromeRenderer::new(&config.browser));
    let auditor = build_auditor(config)?;

    let mut coordinator = AuditCoordinator::new(
        sites,
        config.audit.target_sample_size as usize,
        ledger,
        discoverer,
        renderer,
        auditor,
    );

    match coordinator.run().await {
        Ok(report) => {
            println!(
                "Audit: {} page(s) recorded across {} site(s), {} failed, {} site(s) already complete",
                report.pages_audited, report.sites_audited, report.pages_failed, report.sites_skipped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Audit failed: {}", e);
            Err(e.into())
        }
    }
}

fn build_auditor(config: &Config) -> anyhow::Result<PageAuditor> {
    let script_path = Path::new(&config.browser.axe_script_path);
    let engine = AxeRuleEngine::from_file(script_path)
        .with_context(|| format!("Failed to read axe-core script {}", script_path.display()))?;

    Ok(PageAuditor::from_config(Arc::new(engine), &config.audit))
}
