//! User configuration (~/.costlens/config.json)

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::analyzer::{AnalysisOptions, DEFAULT_SUMMARY_TOP_N, DEFAULT_TREND_THRESHOLD};
use crate::services::cost_source::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::services::summary::{
    HintOptions, DEFAULT_HINT_MIN_COST, DEFAULT_HINT_REVIEW_COST, DEFAULT_HINT_TOP_N,
};
use crate::types::{CostlensError, Result};

/// Settings file contents. Every field is optional on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Cost report endpoint; required for `analyze`
    pub endpoint: Option<String>,
    pub group_by: String,
    pub metric: String,
    pub trend_threshold: f64,
    pub summary_top_n: usize,
    pub hint_top_n: usize,
    pub hint_min_cost: f64,
    pub hint_review_cost: f64,
    pub request_timeout_secs: u64,
    pub cache_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            group_by: "SERVICE".to_string(),
            metric: "UnblendedCost".to_string(),
            trend_threshold: DEFAULT_TREND_THRESHOLD,
            summary_top_n: DEFAULT_SUMMARY_TOP_N,
            hint_top_n: DEFAULT_HINT_TOP_N,
            hint_min_cost: DEFAULT_HINT_MIN_COST,
            hint_review_cost: DEFAULT_HINT_REVIEW_COST,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_enabled: true,
        }
    }
}

impl Config {
    /// Get the default config path (~/.costlens/config.json)
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| CostlensError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".costlens").join("config.json"))
    }

    /// Load from the default path; defaults when the file does not exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            CostlensError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.trend_threshold.is_finite() || self.trend_threshold < 0.0 {
            return Err(CostlensError::Config(format!(
                "trend_threshold must be a non-negative number, got {}",
                self.trend_threshold
            )));
        }
        if self.group_by.trim().is_empty() || self.metric.trim().is_empty() {
            return Err(CostlensError::Config(
                "group_by and metric must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            trend_threshold: self.trend_threshold,
            summary_top_n: self.summary_top_n,
        }
    }

    pub fn hint_options(&self) -> HintOptions {
        HintOptions {
            top_n: self.hint_top_n,
            min_cost: self.hint_min_cost,
            review_cost: self.hint_review_cost,
        }
    }
}
