//! System health: host resources and service checks.
//!
//! Health probes and OS metric sources are external collaborators. When
//! one fails, the failure is recorded as a `down` service snapshot and
//! never returned to the caller.

use crate::entity::{EntityKind, EntityRecord, EntityState, Reading, ServiceStatus};
use crate::error::Result;
use crate::probe::{HealthProbe, SystemMetricsSource, SystemReading};
use crate::profile::DomainProfile;
use crate::recommend::{RecommendationRule, Trigger};
use crate::threshold::{Alert, HealthTier, Polarity};
use crate::trend::TrendDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::warn;

/// Service name used when the OS metric source itself fails.
pub const SYSTEM_METRICS_SERVICE: &str = "system_metrics";

/// Service name used when a failing probe has no usable name.
pub const UNNAMED_PROBE_SERVICE: &str = "unnamed_probe";

categories! {
    /// Metric categories of the system health domain.
    SystemCategory {
        CpuUsage => "cpu_usage",
        MemoryUsage => "memory_usage",
        DiskUsage => "disk_usage",
        LoadAverage => "load_average",
        ProcessCount => "process_count",
        NetworkIo => "network_io",
        ResponseTime => "response_time",
        ErrorRate => "error_rate",
        Uptime => "uptime",
    }
}

/// Latest health check of one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service_name: String,
    pub status: ServiceStatus,
    pub response_time_ms: f64,
    pub error_rate: f64,
    pub uptime_percentage: f64,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    pub last_check: DateTime<Utc>,
}

impl ServiceHealth {
    pub(crate) fn readings(&self) -> Vec<Reading> {
        vec![
            Reading::new("response_time", "response_time_ms", self.response_time_ms, "ms"),
            Reading::new("error_rate", "error_rate", self.error_rate, "ratio"),
            Reading::new("uptime", "uptime_percentage", self.uptime_percentage, "%"),
        ]
    }
}

/// Built-in system health profile.
pub fn profile() -> DomainProfile {
    use SystemCategory::*;

    DomainProfile::new("system")
        .with_category(CpuUsage.as_str(), "CPU usage", "%", Polarity::HigherIsWorse)
        .with_category(MemoryUsage.as_str(), "Memory usage", "%", Polarity::HigherIsWorse)
        .with_category(DiskUsage.as_str(), "Disk usage", "%", Polarity::HigherIsWorse)
        .with_category(LoadAverage.as_str(), "Load average", "", Polarity::HigherIsWorse)
        .with_category(ProcessCount.as_str(), "Process count", "processes", Polarity::HigherIsWorse)
        .with_category(NetworkIo.as_str(), "Network I/O", "bytes", Polarity::HigherIsWorse)
        .with_category(ResponseTime.as_str(), "Response time", "ms", Polarity::HigherIsWorse)
        .with_category(ErrorRate.as_str(), "Error rate", "ratio", Polarity::HigherIsWorse)
        .with_category(Uptime.as_str(), "Uptime", "%", Polarity::LowerIsWorse)
        .with_bounds(CpuUsage.as_str(), 80.0, 95.0)
        .with_bounds(MemoryUsage.as_str(), 85.0, 95.0)
        .with_bounds(DiskUsage.as_str(), 85.0, 95.0)
        .with_bounds(LoadAverage.as_str(), 4.0, 8.0)
        .with_bounds(ProcessCount.as_str(), 500.0, 1000.0)
        .with_bounds(ResponseTime.as_str(), 1000.0, 3000.0)
        .with_bounds(ErrorRate.as_str(), 0.05, 0.10)
        .with_bounds(Uptime.as_str(), 99.0, 95.0)
        .with_entity(EntityKind::Service)
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(CpuUsage.as_str(), HealthTier::Warning),
            [
                "Identify CPU-heavy processes and consider scaling out",
                "Review recent deployments for busy loops",
            ],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(MemoryUsage.as_str(), HealthTier::Warning),
            ["Check for memory leaks and tune cache sizes"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::category_at_least(DiskUsage.as_str(), HealthTier::Warning),
            ["Rotate logs and clean temporary files"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::trending(ResponseTime.as_str(), TrendDirection::Degrading),
            ["Response times are rising; profile slow endpoints"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::entity_at_least(EntityKind::Service, EntityState::Critical),
            ["A service is critical; check its logs and dependencies"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::entity_at_least(EntityKind::Service, EntityState::Down),
            ["A service is down; restart it or fail over"],
        ))
        .with_rule(RecommendationRule::new(
            Trigger::NoRecentData,
            ["No recent system metrics; verify the collector is running"],
        ))
}

domain_monitor! {
    /// Monitor for host resources and service health.
    SystemHealthMonitor, SystemCategory
}

impl SystemHealthMonitor {
    /// Replace the health snapshot of `service_name`.
    pub fn record_service_health(
        &self,
        service_name: &str,
        status: ServiceStatus,
        response_time_ms: f64,
        error_rate: f64,
        uptime_percentage: f64,
        details: BTreeMap<String, String>,
    ) -> Result<EntityState> {
        self.monitor.record_entity(EntityRecord::Service(ServiceHealth {
            service_name: service_name.to_string(),
            status,
            response_time_ms,
            error_rate,
            uptime_percentage,
            details,
            last_check: self.monitor.now(),
        }))
    }

    /// Record `service_name` as down with `error_rate = 1` and zero uptime.
    ///
    /// A blank name is recorded under [`UNNAMED_PROBE_SERVICE`].
    fn record_down(&self, service_name: &str, response_time_ms: f64, reason: &str) -> EntityState {
        let service_name = if service_name.trim().is_empty() {
            UNNAMED_PROBE_SERVICE
        } else {
            service_name
        };
        let details = BTreeMap::from([("error".to_string(), reason.to_string())]);
        if let Err(err) = self.record_service_health(
            service_name,
            ServiceStatus::Down,
            response_time_ms,
            1.0,
            0.0,
            details,
        ) {
            warn!(service = service_name, error = %err, "Could not record down service");
        }
        EntityState::Down
    }

    /// Run one probe and record its outcome.
    ///
    /// The probe call is timed and stored as the response time. A failing
    /// probe, or one that returns unusable values, records the service as
    /// down.
    pub fn check_service<P>(&self, probe: &P) -> EntityState
    where
        P: HealthProbe + ?Sized,
    {
        let name = probe.name();
        let started = Instant::now();
        let outcome = probe.check();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(report) => match self.record_service_health(
                name,
                report.status,
                elapsed_ms,
                report.error_rate.unwrap_or(0.0),
                report.uptime_percentage,
                report.details,
            ) {
                Ok(state) => state,
                Err(err) => {
                    warn!(service = name, error = %err, "Health check returned invalid report");
                    self.record_down(name, elapsed_ms, &err.to_string())
                }
            },
            Err(err) => {
                warn!(service = name, error = %err, "Health check failed");
                self.record_down(name, elapsed_ms, &err.to_string())
            }
        }
    }

    /// Run every probe in order. Returns the resulting state per service.
    pub fn run_health_checks(&self, probes: &[Box<dyn HealthProbe>]) -> BTreeMap<String, EntityState> {
        probes
            .iter()
            .map(|probe| (probe.name().to_string(), self.check_service(probe.as_ref())))
            .collect()
    }

    /// Read host resources and record them as metrics.
    ///
    /// Returns the alerts raised by the new samples. If the source fails, a
    /// `system_metrics` service is recorded down and its outage alert is
    /// returned instead.
    pub fn collect_system_metrics<S>(&self, source: &S) -> Vec<Alert>
    where
        S: SystemMetricsSource + ?Sized,
    {
        let reading = match source.read() {
            Ok(reading) => reading,
            Err(err) => {
                warn!(error = %err, "System metric collection failed");
                self.record_down(SYSTEM_METRICS_SERVICE, 0.0, &err.to_string());
                return self
                    .monitor
                    .snapshot(EntityKind::Service, SYSTEM_METRICS_SERVICE)
                    .map(|s| s.alerts(self.monitor.profile(), &self.monitor.thresholds()))
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|a| a.threshold.is_none())
                    .collect();
            }
        };

        let mut alerts = Vec::new();
        for (name, value, unit, category) in Self::reading_samples(&reading) {
            let none: [&str; 0] = [];
            match self.monitor.record_metric(name, value, unit, category.as_str(), none) {
                Ok(Some(alert)) => alerts.push(alert),
                Ok(None) => {}
                Err(err) => warn!(metric = name, error = %err, "Dropped system metric"),
            }
        }
        alerts
    }

    fn reading_samples(reading: &SystemReading) -> [(&'static str, f64, &'static str, SystemCategory); 6] {
        [
            ("cpu_percent", reading.cpu_percent, "%", SystemCategory::CpuUsage),
            ("memory_percent", reading.memory_percent, "%", SystemCategory::MemoryUsage),
            ("disk_percent", reading.disk_percent, "%", SystemCategory::DiskUsage),
            ("load_average_1m", reading.load_average, "", SystemCategory::LoadAverage),
            (
                "process_count",
                reading.process_count as f64,
                "processes",
                SystemCategory::ProcessCount,
            ),
            (
                "network_bytes_total",
                reading.network_bytes_sent as f64 + reading.network_bytes_recv as f64,
                "bytes",
                SystemCategory::NetworkIo,
            ),
        ]
    }

    pub fn service_health(&self, service_name: &str) -> Option<ServiceHealth> {
        match self.monitor.snapshot(EntityKind::Service, service_name)?.record {
            EntityRecord::Service(health) => Some(health),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::CollectorError;
    use crate::probe::{FnProbe, ProbeReport};
    use std::sync::Arc;

    fn monitor() -> SystemHealthMonitor {
        SystemHealthMonitor::new()
            .unwrap()
            .with_clock(Arc::new(ManualClock::from_millis(1_700_000_000_000)))
    }

    #[test]
    fn test_record_service_health() {
        let sys = monitor();
        let state = sys
            .record_service_health("api", ServiceStatus::Healthy, 80.0, 0.001, 99.99, BTreeMap::new())
            .unwrap();
        assert_eq!(state, EntityState::Healthy);

        let state = sys
            .record_service_health("api", ServiceStatus::Healthy, 1500.0, 0.001, 99.99, BTreeMap::new())
            .unwrap();
        assert_eq!(state, EntityState::Warning);
        assert_eq!(sys.service_health("api").unwrap().response_time_ms, 1500.0);
    }

    #[test]
    fn test_failing_probe_records_down() {
        let sys = monitor();
        let probe = FnProbe::new("payments", || {
            Err(CollectorError::Unavailable("connection refused".to_string()))
        });

        assert_eq!(sys.check_service(&probe), EntityState::Down);

        let health = sys.service_health("payments").unwrap();
        assert_eq!(health.status, ServiceStatus::Down);
        assert_eq!(health.error_rate, 1.0);
        assert_eq!(health.uptime_percentage, 0.0);
        assert!(health.details["error"].contains("connection refused"));

        let report = sys.get_summary(1.0);
        assert!(report.alerts.iter().any(|a| a.kind == "service_down"));
        assert_eq!(report.overall_state, EntityState::Down);
    }

    #[test]
    fn test_invalid_report_records_down() {
        let sys = monitor();
        let probe = FnProbe::new("cache", || Ok(ProbeReport::new(ServiceStatus::Healthy, f64::NAN)));
        assert_eq!(sys.check_service(&probe), EntityState::Down);
        assert_eq!(sys.service_health("cache").unwrap().status, ServiceStatus::Down);
    }

    #[test]
    fn test_run_health_checks() {
        let sys = monitor();
        let probes: Vec<Box<dyn HealthProbe>> = vec![
            Box::new(FnProbe::new("db", || {
                Ok(ProbeReport::new(ServiceStatus::Healthy, 99.95).with_error_rate(0.0))
            })),
            Box::new(FnProbe::new("queue", || {
                Ok(ProbeReport::new(ServiceStatus::Degraded, 99.5))
            })),
            Box::new(FnProbe::new("search", || {
                Err(CollectorError::Timeout { timeout_ms: 2000 })
            })),
        ];

        let states = sys.run_health_checks(&probes);
        assert_eq!(states["db"], EntityState::Healthy);
        assert_eq!(states["queue"], EntityState::Warning);
        assert_eq!(states["search"], EntityState::Down);
        assert_eq!(sys.monitor().snapshots().len(), 3);
    }

    #[test]
    fn test_collect_system_metrics() {
        let sys = monitor();
        let source = || -> std::result::Result<SystemReading, CollectorError> {
            Ok(SystemReading {
                cpu_percent: 97.0,
                memory_percent: 40.0,
                disk_percent: 88.0,
                network_bytes_sent: 1_000,
                network_bytes_recv: 2_000,
                process_count: 210,
                load_average: 1.5,
            })
        };

        let alerts = sys.collect_system_metrics(&source);
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().any(|a| a.kind == "cpu_usage_high" && a.is_critical()));
        assert!(alerts.iter().any(|a| a.kind == "disk_usage_high" && !a.is_critical()));
        assert_eq!(sys.monitor().sample_count(), 6);
        assert_eq!(sys.monitor().aggregate_stats()["network_io"].latest, 3_000.0);
    }

    #[test]
    fn test_collect_failure_records_down() {
        let sys = monitor();
        let source = || -> std::result::Result<SystemReading, CollectorError> {
            Err(CollectorError::Failed("permission denied".to_string()))
        };

        let alerts = sys.collect_system_metrics(&source);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "service_down");
        assert_eq!(sys.monitor().sample_count(), 0);
        assert_eq!(
            sys.service_health(SYSTEM_METRICS_SERVICE).unwrap().status,
            ServiceStatus::Down
        );
    }

    #[test]
    fn test_collect_saturated_network_counters() {
        let sys = monitor();
        let source = || -> std::result::Result<SystemReading, CollectorError> {
            Ok(SystemReading {
                network_bytes_sent: u64::MAX,
                network_bytes_recv: 1,
                ..Default::default()
            })
        };

        let alerts = sys.collect_system_metrics(&source);
        assert!(alerts.is_empty());
        assert_eq!(sys.monitor().sample_count(), 6);
        let latest = sys.monitor().aggregate_stats()["network_io"].latest;
        assert!(latest.is_finite());
        assert!(latest >= u64::MAX as f64);
    }

    #[test]
    fn test_failing_unnamed_probe_still_records_down() {
        let sys = monitor();
        for name in ["", "   "] {
            let probe = FnProbe::new(name, || Err(CollectorError::Failed("no route".to_string())));
            assert_eq!(sys.check_service(&probe), EntityState::Down);
        }

        let health = sys.service_health(UNNAMED_PROBE_SERVICE).unwrap();
        assert_eq!(health.status, ServiceStatus::Down);
        assert!(health.details["error"].contains("no route"));
        assert_eq!(sys.monitor().snapshots().len(), 1);

        let report = sys.get_summary(1.0);
        assert!(report.alerts.iter().any(|a| a.kind == "service_down"));
        assert_eq!(report.overall_state, EntityState::Down);
    }
}
