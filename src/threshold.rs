//! Threshold classification and alert construction.
//!
//! Everything here is a pure function of its arguments: the same category
//! bounds and value always classify the same way.

use crate::error::{MonitorError, Result};
use crate::sample::MetricSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which numeric direction is bad for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Latency, error rate, resource usage...
    HigherIsWorse,
    /// Accuracy, retention, satisfaction...
    LowerIsWorse,
}

impl Polarity {
    /// Suffix used in alert kinds.
    pub fn breach_suffix(&self) -> &'static str {
        match self {
            Polarity::HigherIsWorse => "high",
            Polarity::LowerIsWorse => "low",
        }
    }

    fn breach_phrase(&self) -> &'static str {
        match self {
            Polarity::HigherIsWorse => "at or above",
            Polarity::LowerIsWorse => "at or below",
        }
    }
}

/// Severity tier of a classified value. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    Healthy,
    Warning,
    Critical,
}

impl HealthTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthTier::Healthy => "healthy",
            HealthTier::Warning => "warning",
            HealthTier::Critical => "critical",
        }
    }

    /// Alert severity for this tier, if it warrants one.
    pub fn severity(&self) -> Option<AlertSeverity> {
        match self {
            HealthTier::Healthy => None,
            HealthTier::Warning => Some(AlertSeverity::Warning),
            HealthTier::Critical => Some(AlertSeverity::Critical),
        }
    }
}

/// Warning and critical boundaries of one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub warning: f64,
    pub critical: f64,
}

impl Bounds {
    pub fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    /// Check the bounds are finite and ordered consistently with `polarity`.
    pub fn validate(&self, category: &str, polarity: Polarity) -> Result<()> {
        let invalid = |reason: String| MonitorError::InvalidThresholds {
            category: category.to_string(),
            reason,
        };

        if !self.warning.is_finite() || !self.critical.is_finite() {
            return Err(invalid("bounds must be finite".to_string()));
        }

        match polarity {
            Polarity::HigherIsWorse if self.critical < self.warning => Err(invalid(format!(
                "critical {} must be >= warning {} when higher is worse",
                self.critical, self.warning
            ))),
            Polarity::LowerIsWorse if self.critical > self.warning => Err(invalid(format!(
                "critical {} must be <= warning {} when lower is worse",
                self.critical, self.warning
            ))),
            _ => Ok(()),
        }
    }

    /// Boundary crossed by `tier`.
    pub fn boundary(&self, tier: HealthTier) -> Option<f64> {
        match tier {
            HealthTier::Healthy => None,
            HealthTier::Warning => Some(self.warning),
            HealthTier::Critical => Some(self.critical),
        }
    }
}

/// Per-category threshold table.
///
/// Immutable once handed to a monitor; reconfiguration replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdSet {
    bounds: BTreeMap<String, Bounds>,
}

impl ThresholdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, category: impl Into<String>, warning: f64, critical: f64) -> Self {
        self.insert(category, Bounds::new(warning, critical));
        self
    }

    pub fn insert(&mut self, category: impl Into<String>, bounds: Bounds) {
        self.bounds.insert(category.into(), bounds);
    }

    pub fn get(&self, category: &str) -> Option<&Bounds> {
        self.bounds.get(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bounds)> {
        self.bounds.iter()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Parse from a JSON object of `{"category": {"warning": .., "critical": ..}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold breach or outage, derived from current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// When the offending value was observed.
    pub timestamp: DateTime<Utc>,
    /// Machine-readable kind, e.g. `response_time_high`, `service_down`.
    pub kind: String,
    pub severity: AlertSeverity,
    /// Human-readable message naming the value and the breached boundary.
    pub message: String,
    /// What was measured: a metric name, `avg:<category>` or `<entity>:<name>`.
    pub metric: String,
    /// Observed value.
    pub value: f64,
    /// Breached boundary. None for outages, which breach no numeric bound.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub threshold: Option<f64>,
}

impl Alert {
    /// Alert for an entity that is down.
    pub fn down(
        timestamp: DateTime<Utc>,
        entity: &str,
        name: &str,
        value: f64,
        reason: Option<&str>,
    ) -> Self {
        let message = match reason {
            Some(reason) => format!("{} '{}' is down: {}", entity, name, reason),
            None => format!("{} '{}' is down", entity, name),
        };
        Self {
            timestamp,
            kind: format!("{}_down", entity),
            severity: AlertSeverity::Critical,
            message,
            metric: format!("{}:{}", entity, name),
            value,
            threshold: None,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

/// Classify `value` against `bounds`.
///
/// Higher-is-worse: critical if `value >= critical`, warning if
/// `value >= warning`. Lower-is-worse mirrors this with `<=`.
pub fn classify(polarity: Polarity, value: f64, bounds: &Bounds) -> HealthTier {
    match polarity {
        Polarity::HigherIsWorse => {
            if value >= bounds.critical {
                HealthTier::Critical
            } else if value >= bounds.warning {
                HealthTier::Warning
            } else {
                HealthTier::Healthy
            }
        }
        Polarity::LowerIsWorse => {
            if value <= bounds.critical {
                HealthTier::Critical
            } else if value <= bounds.warning {
                HealthTier::Warning
            } else {
                HealthTier::Healthy
            }
        }
    }
}

/// Classify one reading and build an alert if it is not healthy.
pub fn evaluate_value(
    timestamp: DateTime<Utc>,
    metric: &str,
    category: &str,
    value: f64,
    unit: &str,
    polarity: Polarity,
    bounds: &Bounds,
) -> Option<Alert> {
    let tier = classify(polarity, value, bounds);
    let severity = tier.severity()?;
    let threshold = bounds.boundary(tier)?;

    let unit = if unit.is_empty() {
        String::new()
    } else {
        format!(" {}", unit)
    };

    Some(Alert {
        timestamp,
        kind: format!("{}_{}", category, polarity.breach_suffix()),
        severity,
        message: format!(
            "{} at {:.2}{} is {} {} threshold {:.2}",
            metric,
            value,
            unit,
            polarity.breach_phrase(),
            severity,
            threshold
        ),
        metric: metric.to_string(),
        value,
        threshold: Some(threshold),
    })
}

/// Check a sample against its category bounds.
pub fn evaluate(sample: &MetricSample, polarity: Polarity, bounds: &Bounds) -> Option<Alert> {
    evaluate_value(
        sample.timestamp,
        &sample.name,
        &sample.category,
        sample.value,
        &sample.unit,
        polarity,
        bounds,
    )
}
