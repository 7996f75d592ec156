//! User engagement: sessions, retention, satisfaction and feature adoption.

use crate::entity::{EntityKind, EntityRecord, EntityState, Reading};
use crate::error::Result;
use crate::profile::DomainProfile;
use crate::recommend::{RecommendationRule, Trigger};
use crate::threshold::{HealthTier, Polarity};
use crate::trend::TrendDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

categories! {
    /// Metric categories of the engagement domain.
    EngagementCategory {
        SessionDuration => "session_duration",
        Retention => "retention",
        Satisfaction => "satisfaction",
        ActiveUsers => "active_users",
        ConversionRate => "conversion_rate",
        BounceRate => "bounce_rate",
        FeatureAdoption => "feature_adoption",
    }
}

/// Latest session of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBehavior {
    pub user_id: String,
    pub session_duration_secs: f64,
    pub pages_viewed: u32,
    /// Actions taken during the session, in order.
    #[serde(default)]
    pub actions: Vec<String>,
    pub last_seen: DateTime<Utc>,
}

impl UserBehavior {
    pub(crate) fn readings(&self) -> Vec<Reading> {
        vec![Reading::new(
            "session_duration",
            "session_duration_secs",
            self.session_duration_secs,
            "s",
        )]
    }
}

/// Latest usage figures of one product feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureUsage {
    pub feature_name: String,
    pub usage_count: u64,
    pub unique_users: u64,
    /// Mean rating on a 1..=5 scale.
    pub satisfaction_score: f64,
    /// Share of active users who used the feature, 0..=1.
    pub adoption_rate: f64,
    pub last_updated: DateTime<Utc>,
}

impl FeatureUsage {
    pub(crate) fn readings(&self) -> Vec<Reading> {
        vec![
            Reading::new("satisfaction", "satisfaction_score", self.satisfaction_score, "score"),
            Reading::new("feature_adoption", "adoption_rate", self.adoption_rate, "ratio"),
        ]
    }
}

/// Built-in engagement profile.
pub fn profile() -> DomainProfile {
    use EngagementCategory::*;

    DomainProfile::new("engagement")
        .with_category(SessionDuration.as_str(), "Session duration", "s", Polarity::LowerIsWorse)
        .with_category(Retention.as_str(), "Retention", "ratio", Polarity::LowerIsWorse)
        .with_category(Satisfaction.as_str(), "Satisfaction", "score", Polarity::LowerIsWorse)
        .with_category(ActiveUsers.as_str(), "Active users", "users", Polarity::LowerIsWorse)
        .with_category(ConversionRate.as_str(), "Conversion rate", "ratio", Polarity::LowerIsWorse)
        .with_category(BounceRate.as_str(), "Bounce rate", "ratio", Polarity::HigherIsWorse)
        .with_category(FeatureAdoption.as_str(), "Feature adoption", "ratio", Polarity::LowerIsWorse)
        .with_bounds(SessionDuration.as_str(), 60.0, 30.0)
        .with_bounds(Retention.as_str(), 0.4, 0.2)
        .with_bounds(Satisfaction.as_str(), 3.5, 2.5)
        .with_bounds(ConversionRate.as_str(), 0.02, 0.01)
        .with_bounds(BounceRate.as_str(), 0.6, 0.8)
        .with_bounds(FeatureAdoption.as_str(), 0.2, 0.1)
        .with_entity(EntityKind::UserBehavior)
        .with_entity(EntityKind::Feature)
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(SessionDuration.as_str(), HealthTier::Warning),
            ["Sessions are short; review onboarding and first-run content"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(Retention.as_str(), HealthTier::Warning),
            [
                "Add re-engagement notifications for lapsed users",
                "Survey recently inactive users",
            ],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(Satisfaction.as_str(), HealthTier::Warning),
            ["Collect qualitative feedback on low-rated areas"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(BounceRate.as_str(), HealthTier::Warning),
            ["Improve landing page load time and relevance"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::trending(ActiveUsers.as_str(), TrendDirection::Degrading),
            ["Active users are declining; review recent product changes"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::entity_at_least(EntityKind::Feature, EntityState::Warning),
            ["Promote under-used features or reconsider their placement"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::NoRecentData,
            ["No recent engagement data; check the analytics pipeline"],
        ))
}

domain_monitor! {
    /// Monitor for user activity and feature adoption.
    EngagementMonitor, EngagementCategory
}

impl EngagementMonitor {
    /// Replace the latest session record of `user_id`.
    pub fn record_user_behavior<I, S>(
        &self,
        user_id: &str,
        session_duration_secs: f64,
        pages_viewed: u32,
        actions: I,
    ) -> Result<EntityState>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.monitor
            .record_entity(EntityRecord::UserBehavior(UserBehavior {
                user_id: user_id.to_string(),
                session_duration_secs,
                pages_viewed,
                actions: actions.into_iter().map(Into::into).collect(),
                last_seen: self.monitor.now(),
            }))
    }

    /// Replace the usage figures of `feature_name`.
    pub fn record_feature_usage(
        &self,
        feature_name: &str,
        usage_count: u64,
        unique_users: u64,
        satisfaction_score: f64,
        adoption_rate: f64,
    ) -> Result<EntityState> {
        self.monitor.record_entity(EntityRecord::Feature(FeatureUsage {
            feature_name: feature_name.to_string(),
            usage_count,
            unique_users,
            satisfaction_score,
            adoption_rate,
            last_updated: self.monitor.now(),
        }))
    }

    pub fn user_behavior(&self, user_id: &str) -> Option<UserBehavior> {
        match self.monitor.snapshot(EntityKind::UserBehavior, user_id)?.record {
            EntityRecord::UserBehavior(behavior) => Some(behavior),
            _ => None,
        }
    }

    pub fn feature_usage(&self, feature_name: &str) -> Option<FeatureUsage> {
        match self.monitor.snapshot(EntityKind::Feature, feature_name)?.record {
            EntityRecord::Feature(usage) => Some(usage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn monitor() -> EngagementMonitor {
        EngagementMonitor::new()
            .unwrap()
            .with_clock(Arc::new(ManualClock::from_millis(1_700_000_000_000)))
    }

    #[test]
    fn test_user_behavior_overwrites() {
        let eng = monitor();
        eng.record_user_behavior("u-1", 300.0, 4, ["search", "view"])
            .unwrap();
        let state = eng
            .record_user_behavior("u-1", 20.0, 1, ["bounce"])
            .unwrap();
        assert_eq!(state, EntityState::Critical);

        let latest = eng.user_behavior("u-1").unwrap();
        assert_eq!(latest.pages_viewed, 1);
        assert_eq!(latest.actions, vec!["bounce"]);
        assert_eq!(eng.monitor().snapshots().len(), 1);
    }

    #[test]
    fn test_feature_usage_recommendation() {
        let eng = monitor();
        let state = eng
            .record_feature_usage("export", 120, 30, 4.2, 0.15)
            .unwrap();
        assert_eq!(state, EntityState::Warning);
        assert_eq!(eng.feature_usage("export").unwrap().unique_users, 30);

        let report = eng.get_summary(24.0);
        assert!(report
            .recommendations
            .contains(&"Promote under-used features or reconsider their placement".to_string()));
    }

    #[test]
    fn test_retention_rule_contributes_all_advice() {
        let eng = monitor();
        let none: [&str; 0] = [];
        eng.record_metric("d30_retention", 0.3, "ratio", EngagementCategory::Retention, none)
            .unwrap();
        let report = eng.get_summary(24.0);
        assert_eq!(
            report.recommendations,
            vec![
                "Add re-engagement notifications for lapsed users",
                "Survey recently inactive users",
            ]
        );
    }

    #[test]
    fn test_user_and_feature_share_namespace_by_kind() {
        let eng = monitor();
        eng.record_user_behavior("export", 90.0, 2, Vec::<String>::new())
            .unwrap();
        eng.record_feature_usage("export", 10, 5, 4.0, 0.5).unwrap();
        assert_eq!(eng.monitor().snapshots().len(), 2);
    }
}
