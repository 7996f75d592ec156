//! Per-domain configuration: categories, polarity, thresholds, rules.

use crate::entity::EntityKind;
use crate::error::{MonitorError, Result};
use crate::recommend::RecommendationRule;
use crate::threshold::{Bounds, Polarity, ThresholdSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One metric category a domain accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    /// Display label used in recommendations and logs.
    pub label: String,
    /// Default unit.
    pub unit: String,
    /// Fixed direction of goodness. Never inferred from data.
    pub polarity: Polarity,
}

/// Everything that distinguishes one domain monitor from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainProfile {
    pub name: String,
    pub categories: Vec<CategorySpec>,
    #[serde(default)]
    pub thresholds: ThresholdSet,
    #[serde(default)]
    pub rules: Vec<RecommendationRule>,
    #[serde(default)]
    pub entity_kinds: Vec<EntityKind>,
}

impl DomainProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
            thresholds: ThresholdSet::new(),
            rules: Vec::new(),
            entity_kinds: Vec::new(),
        }
    }

    /// Declare a category.
    pub fn with_category(
        mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        unit: impl Into<String>,
        polarity: Polarity,
    ) -> Self {
        self.categories.push(CategorySpec {
            name: name.into(),
            label: label.into(),
            unit: unit.into(),
            polarity,
        });
        self
    }

    /// Set warning and critical bounds for a declared category.
    pub fn with_bounds(mut self, category: impl Into<String>, warning: f64, critical: f64) -> Self {
        self.thresholds.insert(category, Bounds::new(warning, critical));
        self
    }

    pub fn with_rule(mut self, rule: RecommendationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_entity(mut self, kind: EntityKind) -> Self {
        if !self.entity_kinds.contains(&kind) {
            self.entity_kinds.push(kind);
        }
        self
    }

    pub fn category(&self, name: &str) -> Option<&CategorySpec> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn polarity(&self, category: &str) -> Option<Polarity> {
        self.category(category).map(|c| c.polarity)
    }

    pub fn tracks(&self, kind: EntityKind) -> bool {
        self.entity_kinds.contains(&kind)
    }

    /// Look up a category or fail with `UnknownCategory`.
    pub fn require_category(&self, name: &str) -> Result<&CategorySpec> {
        self.category(name)
            .ok_or_else(|| MonitorError::UnknownCategory {
                domain: self.name.clone(),
                category: name.to_string(),
            })
    }

    /// Check that a threshold set only names declared categories and that
    /// each bound pair agrees with its category polarity.
    pub fn validate_thresholds(&self, thresholds: &ThresholdSet) -> Result<()> {
        for (category, bounds) in thresholds.iter() {
            let spec = self.require_category(category)?;
            bounds.validate(category, spec.polarity)?;
        }
        Ok(())
    }

    /// Check the whole profile.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MonitorError::InvalidConfig(
                "domain name must not be empty".to_string(),
            ));
        }
        for (i, spec) in self.categories.iter().enumerate() {
            if self.categories[..i].iter().any(|c| c.name == spec.name) {
                return Err(MonitorError::InvalidConfig(format!(
                    "category '{}' declared twice",
                    spec.name
                )));
            }
        }
        self.validate_thresholds(&self.thresholds)?;
        for rule in &self.rules {
            if let Some(category) = rule.trigger.category() {
                self.require_category(category)?;
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::Trigger;
    use crate::threshold::HealthTier;

    fn small_profile() -> DomainProfile {
        DomainProfile::new("test")
            .with_category("latency", "Latency", "ms", Polarity::HigherIsWorse)
            .with_category("accuracy", "Accuracy", "ratio", Polarity::LowerIsWorse)
            .with_bounds("latency", 100.0, 200.0)
            .with_bounds("accuracy", 0.9, 0.8)
    }

    #[test]
    fn test_lookup() {
        let profile = small_profile();
        assert_eq!(profile.polarity("latency"), Some(Polarity::HigherIsWorse));
        assert!(profile.category("throughput").is_none());
        assert!(matches!(
            profile.require_category("throughput"),
            Err(MonitorError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_validate_ok() {
        assert!(small_profile().validate().is_ok());
    }

    #[test]
    fn test_validate_inverted_bounds() {
        let profile = small_profile().with_bounds("accuracy", 0.8, 0.9);
        assert!(matches!(
            profile.validate(),
            Err(MonitorError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn test_validate_bounds_for_undeclared_category() {
        let profile = small_profile().with_bounds("throughput", 1.0, 2.0);
        assert!(matches!(
            profile.validate(),
            Err(MonitorError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_category() {
        let profile =
            small_profile().with_category("latency", "Latency", "ms", Polarity::HigherIsWorse);
        assert!(matches!(profile.validate(), Err(MonitorError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rule_category() {
        let profile = small_profile().with_rule(RecommendationRule::new(
            Trigger::CategoryTier {
                category: "throughput".to_string(),
                at_least: HealthTier::Warning,
            },
            ["Scale out"],
        ));
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_entity_kinds_dedup() {
        let profile = small_profile()
            .with_entity(EntityKind::Model)
            .with_entity(EntityKind::Model);
        assert_eq!(profile.entity_kinds.len(), 1);
        assert!(profile.tracks(EntityKind::Model));
        assert!(!profile.tracks(EntityKind::Service));
    }

    #[test]
    fn test_json_roundtrip() {
        let profile = small_profile().with_entity(EntityKind::Model);
        let json = profile.to_json_pretty().unwrap();
        let parsed = DomainProfile::from_json(&json).unwrap();
        assert_eq!(parsed, profile);
    }
}
