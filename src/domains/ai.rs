//! AI model performance monitoring.

use crate::entity::{EntityKind, EntityRecord, EntityState, Reading};
use crate::error::Result;
use crate::profile::DomainProfile;
use crate::recommend::{RecommendationRule, Trigger};
use crate::threshold::{HealthTier, Polarity};
use crate::trend::TrendDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

categories! {
    /// Metric categories of the AI domain.
    AiCategory {
        ResponseTime => "response_time",
        Accuracy => "accuracy",
        Throughput => "throughput",
        ResourceUsage => "resource_usage",
        ErrorRate => "error_rate",
    }
}

/// Latest health of one deployed model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHealth {
    pub model_name: String,
    /// Fraction of correct predictions, 0..=1.
    pub accuracy: f64,
    pub latency_ms: f64,
    /// Requests per second.
    pub throughput: f64,
    pub error_rate: f64,
    /// Percent of allocated compute in use.
    pub resource_usage: f64,
    pub last_updated: DateTime<Utc>,
}

impl ModelHealth {
    pub(crate) fn readings(&self) -> Vec<Reading> {
        vec![
            Reading::new("accuracy", "accuracy", self.accuracy, "ratio"),
            Reading::new("response_time", "latency_ms", self.latency_ms, "ms"),
            Reading::new("throughput", "throughput", self.throughput, "req/s"),
            Reading::new("error_rate", "error_rate", self.error_rate, "ratio"),
            Reading::new("resource_usage", "resource_usage", self.resource_usage, "%"),
        ]
    }
}

/// Built-in AI performance profile.
pub fn profile() -> DomainProfile {
    use AiCategory::*;

    DomainProfile::new("ai")
        .with_category(ResponseTime.as_str(), "Response time", "ms", Polarity::HigherIsWorse)
        .with_category(Accuracy.as_str(), "Accuracy", "ratio", Polarity::LowerIsWorse)
        .with_category(Throughput.as_str(), "Throughput", "req/s", Polarity::LowerIsWorse)
        .with_category(ResourceUsage.as_str(), "Resource usage", "%", Polarity::HigherIsWorse)
        .with_category(ErrorRate.as_str(), "Error rate", "ratio", Polarity::HigherIsWorse)
        .with_bounds(ResponseTime.as_str(), 1000.0, 2000.0)
        .with_bounds(Accuracy.as_str(), 0.85, 0.75)
        .with_bounds(Throughput.as_str(), 10.0, 1.0)
        .with_bounds(ResourceUsage.as_str(), 80.0, 95.0)
        .with_bounds(ErrorRate.as_str(), 0.05, 0.10)
        .with_entity(EntityKind::Model)
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(ResponseTime.as_str(), HealthTier::Warning),
            [
                "Consider model quantization or distillation to cut latency",
                "Enable response caching for repeated inputs",
            ],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(Accuracy.as_str(), HealthTier::Warning),
            ["Review recent input drift and schedule retraining"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::trending(Accuracy.as_str(), TrendDirection::Degrading),
            ["Accuracy is trending down; compare live inputs to the training distribution"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::trending(ResponseTime.as_str(), TrendDirection::Degrading),
            ["Latency is trending up; check batch sizes and hardware saturation"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(ResourceUsage.as_str(), HealthTier::Warning),
            ["Scale out inference replicas or right-size model instances"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(ErrorRate.as_str(), HealthTier::Warning),
            ["Inspect inference error logs for failing input classes"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::entity_at_least(EntityKind::Model, EntityState::Critical),
            ["At least one model is critical; consider rolling back to the last good version"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::NoRecentData,
            ["No recent model metrics; verify that inference services are reporting"],
        ))
}

domain_monitor! {
    /// Monitor for deployed AI models.
    AiPerformanceMonitor, AiCategory
}

impl AiPerformanceMonitor {
    /// Replace the health snapshot of `model_name`.
    pub fn record_model_health(
        &self,
        model_name: &str,
        accuracy: f64,
        latency_ms: f64,
        throughput: f64,
        error_rate: f64,
        resource_usage: f64,
    ) -> Result<EntityState> {
        self.monitor.record_entity(EntityRecord::Model(ModelHealth {
            model_name: model_name.to_string(),
            accuracy,
            latency_ms,
            throughput,
            error_rate,
            resource_usage,
            last_updated: self.monitor.now(),
        }))
    }

    pub fn model_health(&self, model_name: &str) -> Option<ModelHealth> {
        match self.monitor.snapshot(EntityKind::Model, model_name)?.record {
            EntityRecord::Model(health) => Some(health),
            _ => None,
        }
    }
}
