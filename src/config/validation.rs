use crate::config::types::{
    AuditConfig, BackfillConfig, BrowserConfig, Config, DiscoveryConfig, OutputConfig, SiteEntry,
};
use crate::url::Site;
use crate::ConfigError;
use std::collections::HashSet;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_audit_config(&config.audit)?;
    validate_backfill_config(&config.backfill)?;
    validate_discovery_config(&config.discovery)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
    Ok(())
}

fn validate_audit_config(config: &AuditConfig) -> Result<(), ConfigError> {
    if config.target_sample_size < 1 {
        return Err(ConfigError::Validation(format!(
            "target_sample_size must be >= 1, got {}",
            config.target_sample_size
        )));
    }

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    Ok(())
}

fn validate_backfill_config(config: &BackfillConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    Ok(())
}

fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for ext in &config.excluded_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "excluded extension '{}' must look like '.ext'",
                ext
            )));
        }
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.axe_script_path.is_empty() {
        return Err(ConfigError::Validation(
            "axe_script_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates site entries: each must resolve to a URL, and no two may share an identity
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in sites {
        let site = Site::new(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", entry.url, e))
        })?;

        if !seen.insert(site.key().to_string()) {
            return Err(ConfigError::Validation(format!(
                "Site '{}' is listed more than once",
                entry.url
            )));
        }
    }

    Ok(())
}
