//! Rule-table recommendations.
//!
//! Each rule whose trigger holds appends its advice, in rule order. No
//! deduplication and no priority beyond the table order.

use crate::entity::{EntityKind, EntityState};
use crate::threshold::HealthTier;
use crate::trend::TrendDirection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Condition under which a rule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Trigger {
    /// Aggregate average of a category classifies at `at_least` or worse.
    CategoryTier { category: String, at_least: HealthTier },
    /// A category trends in the given direction.
    Trend {
        category: String,
        direction: TrendDirection,
    },
    /// Some entity of `kind` is in `at_least` or a worse state.
    EntityState {
        kind: EntityKind,
        at_least: EntityState,
    },
    /// The summary window holds no samples.
    NoRecentData,
}

impl Trigger {
    pub fn category_at_least(category: impl Into<String>, at_least: HealthTier) -> Self {
        Trigger::CategoryTier {
            category: category.into(),
            at_least,
        }
    }

    pub fn trending(category: impl Into<String>, direction: TrendDirection) -> Self {
        Trigger::Trend {
            category: category.into(),
            direction,
        }
    }

    pub fn entity_at_least(kind: EntityKind, at_least: EntityState) -> Self {
        Trigger::EntityState { kind, at_least }
    }

    /// Category the trigger refers to, if any.
    pub fn category(&self) -> Option<&str> {
        match self {
            Trigger::CategoryTier { category, .. } | Trigger::Trend { category, .. } => {
                Some(category)
            }
            _ => None,
        }
    }

    pub fn holds(&self, findings: &Findings) -> bool {
        match self {
            Trigger::CategoryTier { category, at_least } => findings
                .category_tiers
                .get(category)
                .is_some_and(|tier| tier >= at_least),
            Trigger::Trend {
                category,
                direction,
            } => findings.trends.get(category) == Some(direction),
            Trigger::EntityState { kind, at_least } => findings
                .entity_states
                .iter()
                .any(|(k, state)| k == kind && state >= at_least),
            Trigger::NoRecentData => findings.sample_count == 0,
        }
    }
}

/// A trigger and the advice it contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRule {
    pub trigger: Trigger,
    pub advice: Vec<String>,
}

impl RecommendationRule {
    pub fn new<I, S>(trigger: Trigger, advice: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trigger,
            advice: advice.into_iter().map(Into::into).collect(),
        }
    }
}

/// What a summary found, in the shape rules match against.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    pub category_tiers: BTreeMap<String, HealthTier>,
    pub trends: BTreeMap<String, TrendDirection>,
    pub entity_states: Vec<(EntityKind, EntityState)>,
    pub sample_count: usize,
}

/// Collect advice from every rule that fires.
pub fn recommend(rules: &[RecommendationRule], findings: &Findings) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| rule.trigger.holds(findings))
        .flat_map(|rule| rule.advice.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings() -> Findings {
        let mut f = Findings {
            sample_count: 12,
            ..Default::default()
        };
        f.category_tiers
            .insert("latency".to_string(), HealthTier::Warning);
        f.trends
            .insert("latency".to_string(), TrendDirection::Degrading);
        f.entity_states
            .push((EntityKind::Service, EntityState::Down));
        f
    }

    #[test]
    fn test_category_tier_threshold() {
        let f = findings();
        assert!(Trigger::category_at_least("latency", HealthTier::Warning).holds(&f));
        assert!(!Trigger::category_at_least("latency", HealthTier::Critical).holds(&f));
        assert!(!Trigger::category_at_least("accuracy", HealthTier::Warning).holds(&f));
    }

    #[test]
    fn test_trend_trigger() {
        let f = findings();
        assert!(Trigger::trending("latency", TrendDirection::Degrading).holds(&f));
        assert!(!Trigger::trending("latency", TrendDirection::Improving).holds(&f));
    }

    #[test]
    fn test_entity_trigger() {
        let f = findings();
        assert!(Trigger::entity_at_least(EntityKind::Service, EntityState::Critical).holds(&f));
        assert!(!Trigger::entity_at_least(EntityKind::Model, EntityState::Warning).holds(&f));
    }

    #[test]
    fn test_no_recent_data() {
        let mut f = findings();
        assert!(!Trigger::NoRecentData.holds(&f));
        f.sample_count = 0;
        assert!(Trigger::NoRecentData.holds(&f));
    }

    #[test]
    fn test_recommend_keeps_order_and_duplicates() {
        let rules = vec![
            RecommendationRule::new(
                Trigger::category_at_least("latency", HealthTier::Warning),
                ["Enable caching", "Add replicas"],
            ),
            RecommendationRule::new(Trigger::NoRecentData, ["Check producers"]),
            RecommendationRule::new(
                Trigger::trending("latency", TrendDirection::Degrading),
                ["Add replicas"],
            ),
        ];
        let advice = recommend(&rules, &findings());
        assert_eq!(advice, vec!["Enable caching", "Add replicas", "Add replicas"]);
    }

    #[test]
    fn test_trigger_json_shape() {
        let trigger = Trigger::entity_at_least(EntityKind::Model, EntityState::Critical);
        let json = serde_json::to_string(&trigger).unwrap();
        assert!(json.contains("\"when\":\"entity_state\""));
        let parsed: Trigger = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, trigger);
    }
}
