//! Headless Chrome renderer
//!
//! Each session owns its own browser process so a crashed page never takes
//! down another worker's session.

use crate::audit::render::{RenderError, RenderSession, Renderer};
use crate::config::BrowserConfig as BrowserSettings;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Launches Chrome sessions
pub struct ChromeRenderer {
    executable: Option<String>,
    headless: bool,
}

impl ChromeRenderer {
    pub fn new(settings: &BrowserSettings) -> Self {
        Self {
            executable: settings.executable.clone(),
            headless: settings.headless,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage");

        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(RenderError::Launch)
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn new_session(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        let config = self.browser_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(RenderError::Launch(e.to_string()));
            }
        };

        tracing::debug!("Launched browser session");

        Ok(Box::new(ChromeSession {
            browser,
            page,
            handler_task,
        }))
    }
}

struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl RenderSession for ChromeSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(RenderError::Timeout {
                url: url.to_string(),
                seconds: timeout.as_secs(),
            }),
        }
    }

    async fn rendered_markup(&mut self) -> Result<String, RenderError> {
        self.page
            .content()
            .await
            .map_err(|e| RenderError::Script(e.to_string()))
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, RenderError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(RenderError::Script)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed waiting for browser exit: {}", e);
        }
        self.handler_task.abort();
    }
}
