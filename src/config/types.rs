use serde::Deserialize;

/// Main configuration structure for the auditor
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub backfill: BackfillConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

/// Sampling and per-page audit behavior
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Number of pages each site should have on record
    #[serde(rename = "target-sample-size", default = "default_target_sample_size")]
    pub target_sample_size: u32,

    /// Timeout for link discovery fetches and page loads (seconds)
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Time to let dynamic content settle after navigation (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

/// Violation detail backfill behavior
#[derive(Debug, Clone, Deserialize)]
pub struct BackfillConfig {
    /// Number of concurrent page workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Number of detail rows collected before a batch write
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: u32,

    /// Total attempts per page before it is reported as failed
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay between attempts on the same page (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Link discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// User agent sent when fetching raw markup
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Path suffixes that mark a link as a non-page asset
    #[serde(
        rename = "excluded-extensions",
        default = "default_excluded_extensions"
    )]
    pub excluded_extensions: Vec<String>,
}

/// Headless browser and rule engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Path to the axe-core script injected into each page
    #[serde(rename = "axe-script-path")]
    pub axe_script_path: String,

    /// Browser executable; auto-detected when absent
    #[serde(default)]
    pub executable: Option<String>,

    #[serde(default = "default_headless")]
    pub headless: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database holding the worksheets
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown compliance summary
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

/// A site to audit
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Base URL of the site; `https://` is assumed when no scheme is given
    pub url: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            target_sample_size: default_target_sample_size(),
            timeout_seconds: default_timeout_seconds(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: default_batch_size(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            excluded_extensions: default_excluded_extensions(),
        }
    }
}

fn default_target_sample_size() -> u32 {
    10
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_settle_delay_ms() -> u64 {
    5000
}

fn default_workers() -> u32 {
    4
}

fn default_batch_size() -> u32 {
    20
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_excluded_extensions() -> Vec<String> {
    [".pdf", ".jpg", ".png", ".zip", ".mailto"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_headless() -> bool {
    true
}
