//! Page auditor
//!
//! Loads one page in a rendering session, lets it settle, and runs the rule
//! engine against it.

use crate::audit::render::{RenderSession, RuleEngine};
use crate::config::AuditConfig;
use crate::url::ensure_scheme;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Raw rule engine output for one page
#[derive(Debug, Clone, PartialEq)]
pub struct RawFindings(Value);

impl RawFindings {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// A page that could not be audited
#[derive(Debug, Clone, Error)]
#[error("audit of {url} failed: {reason}")]
pub struct AuditFailure {
    pub url: String,
    pub reason: String,
}

/// Audits single pages with a shared rule engine
#[derive(Clone)]
pub struct PageAuditor {
    rule_engine: Arc<dyn RuleEngine>,
    page_load_timeout: Duration,
    settle_delay: Duration,
}

impl PageAuditor {
    pub fn new(
        rule_engine: Arc<dyn RuleEngine>,
        page_load_timeout: Duration,
        settle_delay: Duration,
    ) -> Self {
        Self {
            rule_engine,
            page_load_timeout,
            settle_delay,
        }
    }

    /// Builds an auditor using the `[audit]` timing settings
    pub fn from_config(rule_engine: Arc<dyn RuleEngine>, config: &AuditConfig) -> Self {
        Self::new(
            rule_engine,
            Duration::from_secs(config.timeout_seconds),
            Duration::from_millis(config.settle_delay_ms),
        )
    }

    /// Audits one page
    ///
    /// # Arguments
    ///
    /// * `session` - Session to load the page in; it stays open afterwards
    /// * `page_url` - Page to audit; `https://` is assumed when no scheme is given
    ///
    /// # Returns
    ///
    /// The raw findings, or an `AuditFailure` for any navigation, timeout,
    /// or rule engine error
    pub async fn audit(
        &self,
        session: &mut dyn RenderSession,
        page_url: &str,
    ) -> Result<RawFindings, AuditFailure> {
        let url = ensure_scheme(page_url);
        let fail = |reason: String| AuditFailure {
            url: url.clone(),
            reason,
        };

        session
            .navigate(&url, self.page_load_timeout)
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let markup = session
            .rendered_markup()
            .await
            .map_err(|e| fail(e.to_string()))?;
        tracing::debug!("Rendered {} ({} bytes)", url, markup.len());

        let findings = self
            .rule_engine
            .run(session)
            .await
            .map_err(|e| fail(e.to_string()))?;

        Ok(RawFindings::new(findings))
    }
}
