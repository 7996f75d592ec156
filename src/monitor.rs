//! Generic monitor: one per domain, parameterized by a `DomainProfile`.
//!
//! All mutable state sits behind one `RwLock`. Recording takes the write
//! lock for the whole append/refresh/evaluate step, so a summary (read
//! lock) never observes a half-applied recording.

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::entity::{EntityKind, EntityRecord, EntitySnapshot, EntityState};
use crate::error::{MonitorError, Result};
use crate::profile::DomainProfile;
use crate::recommend::{self, Findings};
use crate::sample::MetricSample;
use crate::stats::{AggregateStats, CategoryStats};
use crate::store::MetricStore;
use crate::summary::{Period, SummaryReport};
use crate::threshold::{self, Alert, HealthTier, ThresholdSet};
use crate::trend::{TrendAnalyzer, TrendResult};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MS_PER_HOUR: f64 = 3_600_000.0;

struct MonitorState {
    store: MetricStore,
    stats: AggregateStats,
    snapshots: BTreeMap<(EntityKind, String), EntitySnapshot>,
    thresholds: ThresholdSet,
}

/// Metric ingestion, alerting and summary for one domain.
pub struct Monitor {
    profile: DomainProfile,
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    trend: TrendAnalyzer,
    state: RwLock<MonitorState>,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("domain", &self.profile.name)
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Monitor {
    /// Create a monitor with default sizing and the system clock.
    pub fn new(profile: DomainProfile) -> Result<Self> {
        Self::with_config(profile, MonitorConfig::default())
    }

    /// Create a monitor with explicit sizing.
    pub fn with_config(profile: DomainProfile, config: MonitorConfig) -> Result<Self> {
        profile.validate()?;
        config.validate()?;

        let state = MonitorState {
            store: MetricStore::new(config.history_capacity),
            stats: AggregateStats::new(config.stats_window),
            snapshots: BTreeMap::new(),
            thresholds: profile.thresholds.clone(),
        };

        info!(
            domain = %profile.name,
            categories = profile.categories.len(),
            history_capacity = config.history_capacity,
            stats_window = config.stats_window,
            "Monitor created"
        );

        Ok(Self {
            trend: TrendAnalyzer::new(config.trend.clone()),
            profile,
            config,
            clock: Arc::new(SystemClock),
            state: RwLock::new(state),
        })
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn domain(&self) -> &str {
        &self.profile.name
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Record a metric stamped with the current clock time.
    ///
    /// Returns the alert the sample raises against its category thresholds,
    /// if any. Rejected input leaves the monitor untouched.
    pub fn record_metric<I, S>(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        category: &str,
        tags: I,
    ) -> Result<Option<Alert>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sample = MetricSample::new(self.clock.now(), name, value, unit, category).with_tags(tags);
        self.record_sample(sample)
    }

    /// Record a fully formed sample, keeping its own timestamp.
    pub fn record_sample(&self, sample: MetricSample) -> Result<Option<Alert>> {
        if let Err(err) = self.check_sample(&sample) {
            warn!(domain = %self.profile.name, error = %err, "Rejected metric");
            return Err(err);
        }

        let mut state = self.state.write();
        let category = sample.category.clone();

        let alert = match (
            self.profile.polarity(&category),
            state.thresholds.get(&category),
        ) {
            (Some(polarity), Some(bounds)) => threshold::evaluate(&sample, polarity, bounds),
            _ => None,
        };

        debug!(
            domain = %self.profile.name,
            metric = %sample.name,
            category = %category,
            value = sample.value,
            "Metric recorded"
        );

        let MonitorState { store, stats, .. } = &mut *state;
        if let Some(evicted) = store.append(sample) {
            if evicted.category != category {
                stats.refresh(store, &evicted.category);
            }
        }
        stats.refresh(store, &category);

        if let Some(alert) = &alert {
            warn!(
                domain = %self.profile.name,
                kind = %alert.kind,
                severity = %alert.severity,
                "{}",
                alert.message
            );
        }

        Ok(alert)
    }

    fn check_sample(&self, sample: &MetricSample) -> Result<()> {
        if sample.name.trim().is_empty() {
            return Err(MonitorError::EmptyName);
        }
        if !sample.value.is_finite() {
            return Err(MonitorError::InvalidValue {
                metric: sample.name.clone(),
                value: sample.value,
            });
        }
        self.profile.require_category(&sample.category)?;
        Ok(())
    }

    /// Store or replace the snapshot of a domain entity.
    ///
    /// Returns the state computed for the new record.
    pub fn record_entity(&self, record: EntityRecord) -> Result<EntityState> {
        let kind = record.kind();
        if !self.profile.tracks(kind) {
            let err = MonitorError::UnsupportedEntity {
                domain: self.profile.name.clone(),
                kind: kind.to_string(),
            };
            warn!(domain = %self.profile.name, error = %err, "Rejected entity");
            return Err(err);
        }
        if let Err(err) = record.validate() {
            warn!(domain = %self.profile.name, error = %err, "Rejected entity");
            return Err(err);
        }

        let mut state = self.state.write();
        let snapshot = EntitySnapshot::new(record, &self.profile, &state.thresholds);
        let entity_state = snapshot.state;
        let name = snapshot.name().to_string();

        if entity_state >= EntityState::Warning {
            warn!(
                domain = %self.profile.name,
                kind = %kind,
                name = %name,
                state = entity_state.as_str(),
                "Entity not healthy"
            );
        } else {
            debug!(domain = %self.profile.name, kind = %kind, name = %name, "Entity recorded");
        }

        state.snapshots.insert((kind, name), snapshot);
        Ok(entity_state)
    }

    /// Replace the threshold table wholesale and reclassify all snapshots.
    pub fn reload_thresholds(&self, thresholds: ThresholdSet) -> Result<()> {
        self.profile.validate_thresholds(&thresholds)?;

        let mut state = self.state.write();
        let MonitorState {
            snapshots,
            thresholds: current,
            ..
        } = &mut *state;

        for snapshot in snapshots.values_mut() {
            snapshot.state = snapshot.record.assess(&self.profile, &thresholds);
        }
        *current = thresholds;

        info!(
            domain = %self.profile.name,
            categories = current.len(),
            "Thresholds reloaded"
        );
        Ok(())
    }

    pub fn thresholds(&self) -> ThresholdSet {
        self.state.read().thresholds.clone()
    }

    /// Number of samples currently held.
    pub fn sample_count(&self) -> usize {
        self.state.read().store.len()
    }

    /// Owned copies of the samples inside the last `window_hours`.
    pub fn recent_samples(&self, window_hours: f64) -> Vec<MetricSample> {
        let (start, _, _) = self.period(window_hours);
        self.state.read().store.snapshot(move |s| s.timestamp > start)
    }

    /// Owned copies of the samples matching `predicate`.
    pub fn samples_where<P>(&self, predicate: P) -> Vec<MetricSample>
    where
        P: Fn(&MetricSample) -> bool + Clone + 'static,
    {
        self.state.read().store.snapshot(predicate)
    }

    pub fn aggregate_stats(&self) -> BTreeMap<String, CategoryStats> {
        self.state.read().stats.to_map()
    }

    pub fn snapshot(&self, kind: EntityKind, name: &str) -> Option<EntitySnapshot> {
        self.state
            .read()
            .snapshots
            .get(&(kind, name.to_string()))
            .cloned()
    }

    /// All current snapshots, ordered by kind then name.
    pub fn snapshots(&self) -> Vec<EntitySnapshot> {
        self.state.read().snapshots.values().cloned().collect()
    }

    /// Trend of one category over the last `window_hours`.
    pub fn trend(&self, category: &str, window_hours: f64) -> Option<TrendResult> {
        let polarity = self.profile.polarity(category)?;
        let (start, _, _) = self.period(window_hours);
        let state = self.state.read();
        let values: Vec<f64> = state
            .store
            .since(start)
            .filter(|s| s.category == category)
            .map(|s| s.value)
            .collect();
        self.trend.trend(category, polarity, &values)
    }

    /// Compose a report from the current state.
    ///
    /// Negative or non-finite `window_hours` yields an empty window.
    pub fn get_summary(&self, window_hours: f64) -> SummaryReport {
        let (start, end, window_hours) = self.period(window_hours);
        let state = self.state.read();

        let in_window = state.store.since(start);
        let sample_count = in_window.clone().count();

        let mut trends = BTreeMap::new();
        for spec in &self.profile.categories {
            let values: Vec<f64> = in_window
                .clone()
                .filter(|s| s.category == spec.name)
                .map(|s| s.value)
                .collect();
            if let Some(result) = self.trend.trend(&spec.name, spec.polarity, &values) {
                trends.insert(spec.name.clone(), result);
            }
        }

        let mut alerts = Vec::new();
        let mut category_tiers = BTreeMap::new();
        for (category, stats) in state.stats.iter() {
            let (Some(spec), Some(bounds)) = (
                self.profile.category(category),
                state.thresholds.get(category),
            ) else {
                continue;
            };
            category_tiers.insert(
                category.clone(),
                threshold::classify(spec.polarity, stats.average, bounds),
            );
            if let Some(alert) = threshold::evaluate_value(
                stats.last_timestamp,
                &format!("avg:{}", category),
                category,
                stats.average,
                &spec.unit,
                spec.polarity,
                bounds,
            ) {
                alerts.push(alert);
            }
        }

        let current_snapshots: Vec<EntitySnapshot> = state.snapshots.values().cloned().collect();
        for snapshot in &current_snapshots {
            alerts.extend(snapshot.alerts(&self.profile, &state.thresholds));
        }

        let findings = Findings {
            entity_states: current_snapshots
                .iter()
                .map(|s| (s.kind(), s.state))
                .collect(),
            trends: trends
                .iter()
                .map(|(category, t)| (category.clone(), t.direction))
                .collect(),
            category_tiers,
            sample_count,
        };
        let recommendations = recommend::recommend(&self.profile.rules, &findings);

        let worst_tier = findings
            .category_tiers
            .values()
            .copied()
            .max()
            .unwrap_or(HealthTier::Healthy);
        let overall_state = findings
            .entity_states
            .iter()
            .map(|(_, s)| *s)
            .fold(EntityState::from(worst_tier), EntityState::max);

        SummaryReport {
            domain: self.profile.name.clone(),
            period: Period {
                start,
                end,
                window_hours,
            },
            sample_count,
            aggregate_stats: state.stats.to_map(),
            current_snapshots,
            alerts,
            trends,
            recommendations,
            overall_state,
        }
    }

    /// `(start, end, sanitized_hours)` for a window ending now.
    fn period(&self, window_hours: f64) -> (DateTime<Utc>, DateTime<Utc>, f64) {
        let hours = if window_hours.is_finite() && window_hours > 0.0 {
            window_hours
        } else {
            0.0
        };
        let end = self.clock.now();
        let window_ms = (hours * MS_PER_HOUR).min(i64::MAX as f64) as i64;
        let start = Duration::try_milliseconds(window_ms)
            .and_then(|d| end.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        (start, end, hours)
    }
}
