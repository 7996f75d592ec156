//! Financial analytics: recurring revenue, churn and unit economics.

use crate::entity::{EntityKind, EntityRecord, EntityState, Reading};
use crate::error::Result;
use crate::profile::DomainProfile;
use crate::recommend::{RecommendationRule, Trigger};
use crate::threshold::{HealthTier, Polarity};
use crate::trend::TrendDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

categories! {
    /// Metric categories of the financial domain.
    FinancialCategory {
        Mrr => "mrr",
        Revenue => "revenue",
        ChurnRate => "churn_rate",
        CustomerAcquisitionCost => "customer_acquisition_cost",
        LifetimeValue => "lifetime_value",
        OperatingCost => "operating_cost",
    }
}

/// Latest figures of one revenue stream (plan, product line, region...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueStream {
    pub stream_name: String,
    /// Monthly recurring revenue.
    pub mrr: f64,
    /// Monthly churn, 0..=1.
    pub churn_rate: f64,
    pub active_customers: u64,
    pub recorded_at: DateTime<Utc>,
}

impl RevenueStream {
    pub(crate) fn readings(&self) -> Vec<Reading> {
        vec![
            Reading::new("mrr", "mrr", self.mrr, "USD"),
            Reading::new("churn_rate", "churn_rate", self.churn_rate, "ratio"),
        ]
    }

    /// MRR per active customer. None without customers.
    pub fn average_revenue_per_customer(&self) -> Option<f64> {
        (self.active_customers > 0).then(|| self.mrr / self.active_customers as f64)
    }
}

/// Built-in financial profile.
pub fn profile() -> DomainProfile {
    use FinancialCategory::*;

    DomainProfile::new("financial")
        .with_category(Mrr.as_str(), "Monthly recurring revenue", "USD", Polarity::LowerIsWorse)
        .with_category(Revenue.as_str(), "Revenue", "USD", Polarity::LowerIsWorse)
        .with_category(ChurnRate.as_str(), "Churn rate", "ratio", Polarity::HigherIsWorse)
        .with_category(
            CustomerAcquisitionCost.as_str(),
            "Customer acquisition cost",
            "USD",
            Polarity::HigherIsWorse,
        )
        .with_category(LifetimeValue.as_str(), "Customer lifetime value", "USD", Polarity::LowerIsWorse)
        .with_category(OperatingCost.as_str(), "Operating cost", "USD", Polarity::HigherIsWorse)
        .with_bounds(Mrr.as_str(), 10_000.0, 5_000.0)
        .with_bounds(ChurnRate.as_str(), 0.05, 0.10)
        .with_bounds(CustomerAcquisitionCost.as_str(), 500.0, 1_000.0)
        .with_bounds(LifetimeValue.as_str(), 1_500.0, 1_000.0)
        .with_entity(EntityKind::RevenueStream)
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(Mrr.as_str(), HealthTier::Warning),
            [
                "Review pricing tiers and upsell paths",
                "Focus acquisition spend on the highest converting channels",
            ],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(ChurnRate.as_str(), HealthTier::Warning),
            ["Interview churned customers and strengthen onboarding"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::trending(ChurnRate.as_str(), TrendDirection::Degrading),
            ["Churn is rising; launch a retention campaign for at-risk accounts"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(CustomerAcquisitionCost.as_str(), HealthTier::Warning),
            ["Acquisition cost is high; audit paid channels and referral incentives"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(LifetimeValue.as_str(), HealthTier::Warning),
            ["Lifetime value is low; invest in expansion revenue"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::trending(Revenue.as_str(), TrendDirection::Degrading),
            ["Revenue is declining; review the sales pipeline"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::entity_at_least(EntityKind::RevenueStream, EntityState::Critical),
            ["A revenue stream is critical; escalate to the account owner"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::NoRecentData,
            ["No recent financial metrics; check billing exports"],
        ))
}

domain_monitor! {
    /// Monitor for revenue and cost metrics.
    FinancialMonitor, FinancialCategory
}

impl FinancialMonitor {
    /// Replace the figures of `stream_name`.
    pub fn record_revenue_stream(
        &self,
        stream_name: &str,
        mrr: f64,
        churn_rate: f64,
        active_customers: u64,
    ) -> Result<EntityState> {
        self.monitor
            .record_entity(EntityRecord::RevenueStream(RevenueStream {
                stream_name: stream_name.to_string(),
                mrr,
                churn_rate,
                active_customers,
                recorded_at: self.monitor.now(),
            }))
    }

    pub fn revenue_stream(&self, stream_name: &str) -> Option<RevenueStream> {
        match self
            .monitor
            .snapshot(EntityKind::RevenueStream, stream_name)?
            .record
        {
            EntityRecord::RevenueStream(stream) => Some(stream),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;
    use crate::threshold::AlertSeverity;

    fn monitor() -> FinancialMonitor {
        FinancialMonitor::new()
            .unwrap()
            .with_clock(Arc::new(ManualClock::from_millis(1_700_000_000_000)))
    }

    #[test]
    fn test_low_mrr_is_critical() {
        let fin = monitor();
        let none: [&str; 0] = [];
        let alert = fin
            .record_metric("mrr", 4000.0, "USD", FinancialCategory::Mrr, none)
            .unwrap()
            .unwrap();
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.kind, "mrr_low");
        assert_eq!(alert.threshold, Some(5000.0));
        assert!(alert.message.contains("4000.00"));
        assert!(alert.message.contains("5000.00"));
    }

    #[test]
    fn test_revenue_stream_state() {
        let fin = monitor();
        assert_eq!(
            fin.record_revenue_stream("enterprise", 25_000.0, 0.01, 40)
                .unwrap(),
            EntityState::Healthy
        );
        assert_eq!(
            fin.record_revenue_stream("starter", 8_000.0, 0.02, 400)
                .unwrap(),
            EntityState::Warning
        );
        assert_eq!(
            fin.record_revenue_stream("legacy", 20_000.0, 0.2, 10)
                .unwrap(),
            EntityState::Critical
        );

        let starter = fin.revenue_stream("starter").unwrap();
        assert_eq!(starter.average_revenue_per_customer(), Some(20.0));
    }

    #[test]
    fn test_summary_recommends_on_low_mrr() {
        let fin = monitor();
        let none: [&str; 0] = [];
        fin.record_metric("mrr", 7000.0, "USD", FinancialCategory::Mrr, none)
            .unwrap();
        let report = fin.get_summary(24.0);
        assert_eq!(
            report.recommendations,
            vec![
                "Review pricing tiers and upsell paths",
                "Focus acquisition spend on the highest converting channels",
            ]
        );
    }

    #[test]
    fn test_no_customers() {
        let stream = RevenueStream {
            stream_name: "beta".to_string(),
            mrr: 0.0,
            churn_rate: 0.0,
            active_customers: 0,
            recorded_at: Utc::now(),
        };
        assert!(stream.average_revenue_per_customer().is_none());
    }
}
