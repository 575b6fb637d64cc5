//! axe-core rule engine
//!
//! Injects the axe-core script into the loaded page and runs it.

use crate::audit::render::{RenderError, RenderSession, RuleEngine};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

const RUN_SCRIPT: &str = "axe.run().then(results => JSON.parse(JSON.stringify(results)))";

/// Rule engine backed by an axe-core bundle
pub struct AxeRuleEngine {
    script: String,
}

impl AxeRuleEngine {
    pub fn new(script: String) -> Self {
        Self { script }
    }

    /// Loads the axe-core bundle from disk
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let script = std::fs::read_to_string(path)?;
        Ok(Self::new(script))
    }

    fn injection_script(&self) -> String {
        format!("{}\n;typeof window.axe !== 'undefined'", self.script)
    }
}

#[async_trait]
impl RuleEngine for AxeRuleEngine {
    async fn run(&self, session: &mut dyn RenderSession) -> Result<Value, RenderError> {
        let loaded = session.evaluate(&self.injection_script()).await?;
        if loaded != Value::Bool(true) {
            return Err(RenderError::Setup(
                "axe-core did not register on window".to_string(),
            ));
        }

        session.evaluate(RUN_SCRIPT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    struct ScriptedSession {
        scripts: Vec<String>,
        axe_registers: bool,
    }

    #[async_trait]
    impl RenderSession for ScriptedSession {
        async fn navigate(&mut self, _url: &str, _timeout: Duration) -> Result<(), RenderError> {
            Ok(())
        }

        async fn rendered_markup(&mut self) -> Result<String, RenderError> {
            Ok(String::new())
        }

        async fn evaluate(&mut self, script: &str) -> Result<Value, RenderError> {
            self.scripts.push(script.to_string());
            if script.starts_with("axe.run") {
                Ok(json!({ "violations": [{ "id": "label" }] }))
            } else {
                Ok(Value::Bool(self.axe_registers))
            }
        }

        async fn close(&mut self) {}
    }

    #[tokio::test]
    async fn test_injects_then_runs() {
        let engine = AxeRuleEngine::new("window.axe = {};".to_string());
        let mut session = ScriptedSession {
            scripts: Vec::new(),
            axe_registers: true,
        };

        let result = engine.run(&mut session).await.unwrap();

        assert_eq!(result["violations"][0]["id"], "label");
        assert_eq!(session.scripts.len(), 2);
        assert!(session.scripts[0].starts_with("window.axe = {};"));
        assert_eq!(session.scripts[1], RUN_SCRIPT);
    }

    #[tokio::test]
    async fn test_missing_axe_is_setup_error() {
        let engine = AxeRuleEngine::new(String::new());
        let mut session = ScriptedSession {
            scripts: Vec::new(),
            axe_registers: false,
        };

        let result = engine.run(&mut session).await;

        assert!(matches!(result.unwrap_err(), RenderError::Setup(_)));
        assert_eq!(session.scripts.len(), 1);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axe.min.js");
        std::fs::write(&path, "window.axe = {};").unwrap();

        let engine = AxeRuleEngine::from_file(&path).unwrap();
        assert!(engine.injection_script().starts_with("window.axe = {};"));

        assert!(AxeRuleEngine::from_file(&dir.path().join("missing.js")).is_err());
    }
}
