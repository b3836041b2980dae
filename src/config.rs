// Service configuration
//
// Loaded from TOML; every field has a default so an empty file (or no file)
// is a valid configuration. Command-line flags override these values.

use crate::statistic::CorrelationKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults and limits applied to correlation and search requests
///
/// # Example
/// ```
/// use phenocorr::config::ServiceConfig;
/// use phenocorr::statistic::CorrelationKind;
///
/// let config = ServiceConfig::default();
/// assert_eq!(config.default_statistic, CorrelationKind::Pearson);
/// assert_eq!(config.max_results_limit, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Cohort snapshot to load when `--data` is not given
    pub snapshot: Option<PathBuf>,

    pub default_statistic: CorrelationKind,

    /// Used when a correlate request does not name a result count
    pub default_max_results: usize,

    /// Hard ceiling; larger requests are clamped, not rejected
    pub max_results_limit: usize,

    pub default_page_size: usize,

    /// Score candidates on the rayon thread pool
    pub parallel: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            default_statistic: CorrelationKind::Pearson,
            default_max_results: 20,
            max_results_limit: 1000,
            default_page_size: 10,
            parallel: true,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        let config: ServiceConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))?;

        config
            .validate()
            .map_err(|msg| anyhow::anyhow!("Invalid config {}: {}", path.as_ref().display(), msg))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_max_results == 0 {
            return Err("default_max_results must be positive".to_string());
        }

        if self.max_results_limit == 0 {
            return Err("max_results_limit must be positive".to_string());
        }

        if self.default_max_results > self.max_results_limit {
            return Err(format!(
                "default_max_results ({}) exceeds max_results_limit ({})",
                self.default_max_results, self.max_results_limit
            ));
        }

        if self.default_page_size == 0 {
            return Err("default_page_size must be positive".to_string());
        }

        Ok(())
    }
}
