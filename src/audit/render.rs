//! Rendering seams
//!
//! The auditor drives pages through these traits so the orchestrators can be
//! exercised against scripted sessions without a real browser.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by rendering sessions and rule engines
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("rule engine setup failed: {0}")]
    Setup(String),
}

/// Creates rendering sessions
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Opens a fresh session with a single blank page
    async fn new_session(&self) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// One live browser page
#[async_trait]
pub trait RenderSession: Send {
    /// Navigates to `url`, failing if the load exceeds `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Returns the current document markup
    async fn rendered_markup(&mut self) -> Result<String, RenderError>;

    /// Evaluates a script in the page and returns its JSON result
    async fn evaluate(&mut self, script: &str) -> Result<Value, RenderError>;

    /// Releases the session; errors are logged, never raised
    async fn close(&mut self);
}

/// Runs accessibility rules against the page loaded in a session
#[async_trait]
pub trait RuleEngine: Send + Sync {
    async fn run(&self, session: &mut dyn RenderSession) -> Result<Value, RenderError>;
}
