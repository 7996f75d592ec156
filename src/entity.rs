//! Named domain entities and their current state.
//!
//! A monitor keeps one snapshot per `(kind, name)`; each recording replaces
//! the previous one. State is recomputed from the record on every write and
//! never carries history.

use crate::domains::ai::ModelHealth;
use crate::domains::engagement::{FeatureUsage, UserBehavior};
use crate::domains::financial::RevenueStream;
use crate::domains::system::ServiceHealth;
use crate::error::{MonitorError, Result};
use crate::profile::DomainProfile;
use crate::threshold::{self, Alert, HealthTier, ThresholdSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Model,
    Service,
    UserBehavior,
    Feature,
    RevenueStream,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Model => "model",
            EntityKind::Service => "service",
            EntityKind::UserBehavior => "user_behavior",
            EntityKind::Feature => "feature",
            EntityKind::RevenueStream => "revenue_stream",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported by whoever produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Down,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Unhealthy => "unhealthy",
            ServiceStatus::Down => "down",
        }
    }
}

/// Current state of an entity. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    Healthy,
    Warning,
    Critical,
    Down,
}

impl EntityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityState::Healthy => "healthy",
            EntityState::Warning => "warning",
            EntityState::Critical => "critical",
            EntityState::Down => "down",
        }
    }
}

impl From<HealthTier> for EntityState {
    fn from(tier: HealthTier) -> Self {
        match tier {
            HealthTier::Healthy => EntityState::Healthy,
            HealthTier::Warning => EntityState::Warning,
            HealthTier::Critical => EntityState::Critical,
        }
    }
}

impl From<ServiceStatus> for EntityState {
    fn from(status: ServiceStatus) -> Self {
        match status {
            ServiceStatus::Healthy => EntityState::Healthy,
            ServiceStatus::Degraded => EntityState::Warning,
            ServiceStatus::Unhealthy => EntityState::Critical,
            ServiceStatus::Down => EntityState::Down,
        }
    }
}

/// One numeric field of a record, mapped to a profile category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub category: &'static str,
    pub field: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl Reading {
    pub fn new(category: &'static str, field: &'static str, value: f64, unit: &'static str) -> Self {
        Self {
            category,
            field,
            value,
            unit,
        }
    }
}

/// A domain record, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityRecord {
    Model(ModelHealth),
    Service(ServiceHealth),
    UserBehavior(UserBehavior),
    Feature(FeatureUsage),
    RevenueStream(RevenueStream),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::Model(_) => EntityKind::Model,
            EntityRecord::Service(_) => EntityKind::Service,
            EntityRecord::UserBehavior(_) => EntityKind::UserBehavior,
            EntityRecord::Feature(_) => EntityKind::Feature,
            EntityRecord::RevenueStream(_) => EntityKind::RevenueStream,
        }
    }

    /// Key within its kind.
    pub fn name(&self) -> &str {
        match self {
            EntityRecord::Model(r) => &r.model_name,
            EntityRecord::Service(r) => &r.service_name,
            EntityRecord::UserBehavior(r) => &r.user_id,
            EntityRecord::Feature(r) => &r.feature_name,
            EntityRecord::RevenueStream(r) => &r.stream_name,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            EntityRecord::Model(r) => r.last_updated,
            EntityRecord::Service(r) => r.last_check,
            EntityRecord::UserBehavior(r) => r.last_seen,
            EntityRecord::Feature(r) => r.last_updated,
            EntityRecord::RevenueStream(r) => r.recorded_at,
        }
    }

    /// Numeric fields subject to thresholds.
    pub fn readings(&self) -> Vec<Reading> {
        match self {
            EntityRecord::Model(r) => r.readings(),
            EntityRecord::Service(r) => r.readings(),
            EntityRecord::UserBehavior(r) => r.readings(),
            EntityRecord::Feature(r) => r.readings(),
            EntityRecord::RevenueStream(r) => r.readings(),
        }
    }

    /// Status stated by the producer, for kinds that carry one.
    pub fn reported_status(&self) -> Option<ServiceStatus> {
        match self {
            EntityRecord::Service(r) => Some(r.status),
            _ => None,
        }
    }

    /// Failure description attached to a down record.
    pub fn down_reason(&self) -> Option<&str> {
        match self {
            EntityRecord::Service(r) => r.details.get("error").map(String::as_str),
            _ => None,
        }
    }

    /// Reject empty names and non-finite readings.
    pub fn validate(&self) -> Result<()> {
        if self.name().trim().is_empty() {
            return Err(MonitorError::EmptyName);
        }
        for reading in self.readings() {
            if !reading.value.is_finite() {
                return Err(MonitorError::InvalidValue {
                    metric: format!("{}.{}", self.name(), reading.field),
                    value: reading.value,
                });
            }
        }
        Ok(())
    }

    /// Classify the record as a pure function of its fields.
    ///
    /// Down if the producer says so; otherwise the worst of the reported
    /// status and each reading's threshold tier.
    pub fn assess(&self, profile: &DomainProfile, thresholds: &ThresholdSet) -> EntityState {
        let reported = self.reported_status().map(EntityState::from);
        if reported == Some(EntityState::Down) {
            return EntityState::Down;
        }

        let measured = self
            .readings()
            .iter()
            .filter_map(|reading| {
                let polarity = profile.polarity(reading.category)?;
                let bounds = thresholds.get(reading.category)?;
                Some(EntityState::from(threshold::classify(
                    polarity,
                    reading.value,
                    bounds,
                )))
            })
            .max()
            .unwrap_or(EntityState::Healthy);

        reported.map_or(measured, |r| r.max(measured))
    }
}

/// Current record of an entity plus its derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub record: EntityRecord,
    pub state: EntityState,
}

impl EntitySnapshot {
    pub fn new(record: EntityRecord, profile: &DomainProfile, thresholds: &ThresholdSet) -> Self {
        let state = record.assess(profile, thresholds);
        Self { record, state }
    }

    pub fn kind(&self) -> EntityKind {
        self.record.kind()
    }

    pub fn name(&self) -> &str {
        self.record.name()
    }

    /// Alerts for every breached reading, plus an outage alert when down.
    pub fn alerts(&self, profile: &DomainProfile, thresholds: &ThresholdSet) -> Vec<Alert> {
        let kind = self.kind();
        let name = self.name();
        let timestamp = self.record.timestamp();

        let mut alerts = Vec::new();
        if self.state == EntityState::Down {
            alerts.push(Alert::down(
                timestamp,
                kind.as_str(),
                name,
                0.0,
                self.record.down_reason(),
            ));
        }

        for reading in self.record.readings() {
            let (Some(polarity), Some(bounds)) = (
                profile.polarity(reading.category),
                thresholds.get(reading.category),
            ) else {
                continue;
            };
            let metric = format!("{}:{}.{}", kind, name, reading.field);
            if let Some(alert) = threshold::evaluate_value(
                timestamp,
                &metric,
                reading.category,
                reading.value,
                reading.unit,
                polarity,
                bounds,
            ) {
                alerts.push(alert);
            }
        }
        alerts
    }
}
