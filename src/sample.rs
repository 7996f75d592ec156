//! Timestamped metric samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One recorded metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// When the value was observed.
    pub timestamp: DateTime<Utc>,
    /// Metric name (e.g. "p95_latency", "mrr").
    pub name: String,
    /// Observed value.
    pub value: f64,
    /// Unit label, free-form.
    pub unit: String,
    /// Category declared by the domain profile.
    pub category: String,
    /// Unordered tags.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl MetricSample {
    pub fn new(
        timestamp: DateTime<Utc>,
        name: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            name: name.into(),
            value,
            unit: unit.into(),
            category: category.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Attach tags. Duplicates collapse.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_category(&self, category: &str) -> bool {
        self.category == category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_a_set() {
        let sample = MetricSample::new(Utc::now(), "latency", 12.0, "ms", "response_time")
            .with_tags(["gpu", "eu-west", "gpu"]);
        assert_eq!(sample.tags.len(), 2);
        assert!(sample.has_tag("gpu"));
        assert!(!sample.has_tag("cpu"));
    }

    #[test]
    fn test_untagged_sample_omits_tags_in_json() {
        let sample = MetricSample::new(Utc::now(), "mrr", 4000.0, "USD", "mrr");
        let json = serde_json::to_string(&sample).unwrap();
        assert!(!json.contains("\"tags\""));

        let restored: MetricSample = serde_json::from_str(&json).unwrap();
        assert!(restored.tags.is_empty());
        assert!(restored.is_category("mrr"));
    }
}
