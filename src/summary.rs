//! Summary report returned by `Monitor::get_summary`.

use crate::entity::{EntitySnapshot, EntityState};
use crate::stats::CategoryStats;
use crate::threshold::{Alert, AlertSeverity};
use crate::trend::TrendResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time range covered by a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Exclusive lower bound.
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Requested window after sanitizing.
    pub window_hours: f64,
}

/// Point-in-time view of a monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub domain: String,
    pub period: Period,
    /// Samples inside the period.
    pub sample_count: usize,
    /// Rolling stats per category, independent of the period.
    pub aggregate_stats: BTreeMap<String, CategoryStats>,
    /// Current entity snapshots, ordered by kind then name.
    pub current_snapshots: Vec<EntitySnapshot>,
    pub alerts: Vec<Alert>,
    /// Trends over the period's samples, keyed by category.
    pub trends: BTreeMap<String, TrendResult>,
    pub recommendations: Vec<String>,
    /// Worst entity state or aggregate tier.
    pub overall_state: EntityState,
}

impl SummaryReport {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    pub fn alerts_by_severity(&self, severity: AlertSeverity) -> Vec<&Alert> {
        self.alerts.iter().filter(|a| a.severity == severity).collect()
    }

    pub fn trend(&self, category: &str) -> Option<&TrendResult> {
        self.trends.get(category)
    }

    pub fn stats(&self, category: &str) -> Option<&CategoryStats> {
        self.aggregate_stats.get(category)
    }
}
