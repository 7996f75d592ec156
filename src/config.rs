//! Monitor configuration.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizing of the per-monitor history and derived windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Maximum samples kept in the metric history (FIFO eviction).
    pub history_capacity: usize,

    /// Samples per category pooled into aggregate stats.
    pub stats_window: usize,

    /// Trend detection settings.
    pub trend: TrendConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: crate::DEFAULT_HISTORY_CAPACITY,
            stats_window: crate::DEFAULT_STATS_WINDOW,
            trend: TrendConfig::default(),
        }
    }
}

/// Sub-window sizes for trend detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Samples per sub-window (recent vs. the block before it).
    pub window: usize,

    /// Minimum samples of a category before any trend is reported.
    pub min_samples: usize,

    /// Minimum samples each sub-window must hold.
    pub min_sub_window_samples: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window: 10,
            min_samples: 10,
            min_sub_window_samples: 2,
        }
    }
}

impl MonitorConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(MonitorError::InvalidConfig(
                "history_capacity must be positive".to_string(),
            ));
        }
        if self.stats_window == 0 || self.stats_window > self.history_capacity {
            return Err(MonitorError::InvalidConfig(format!(
                "stats_window must be in 1..={}, got {}",
                self.history_capacity, self.stats_window
            )));
        }
        self.trend.validate()
    }
}

impl TrendConfig {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(MonitorError::InvalidConfig(
                "trend.window must be positive".to_string(),
            ));
        }
        if self.min_samples == 0 {
            return Err(MonitorError::InvalidConfig(
                "trend.min_samples must be positive".to_string(),
            ));
        }
        if self.min_sub_window_samples == 0 || self.min_sub_window_samples > self.window {
            return Err(MonitorError::InvalidConfig(format!(
                "trend.min_sub_window_samples must be in 1..={}, got {}",
                self.window, self.min_sub_window_samples
            )));
        }
        Ok(())
    }
}
