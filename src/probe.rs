//! External collaborators: health probes and OS metric sources.
//!
//! The engine never collects anything itself. Probes and sources are
//! injected by the host; their failures surface as `CollectorError` and are
//! absorbed by the system monitor.

use crate::entity::ServiceStatus;
use crate::error::CollectorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of one successful health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub status: ServiceStatus,
    pub uptime_percentage: f64,
    /// Error rate, when the service exposes one.
    #[serde(default)]
    pub error_rate: Option<f64>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl ProbeReport {
    pub fn new(status: ServiceStatus, uptime_percentage: f64) -> Self {
        Self {
            status,
            uptime_percentage,
            error_rate: None,
            details: BTreeMap::new(),
        }
    }

    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = Some(error_rate);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// A named health check.
pub trait HealthProbe: Send + Sync {
    /// Service name the probe reports for.
    fn name(&self) -> &str;

    /// Run the check. May block.
    fn check(&self) -> Result<ProbeReport, CollectorError>;
}

/// Probe backed by a closure.
pub struct FnProbe<F> {
    name: String,
    check: F,
}

impl<F> FnProbe<F>
where
    F: Fn() -> Result<ProbeReport, CollectorError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> HealthProbe for FnProbe<F>
where
    F: Fn() -> Result<ProbeReport, CollectorError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<ProbeReport, CollectorError> {
        (self.check)()
    }
}

/// One reading of host resource usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemReading {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub network_bytes_sent: u64,
    pub network_bytes_recv: u64,
    pub process_count: u64,
    /// 1-minute load average.
    pub load_average: f64,
}

/// Source of host resource usage.
pub trait SystemMetricsSource: Send + Sync {
    fn read(&self) -> Result<SystemReading, CollectorError>;
}

impl<F> SystemMetricsSource for F
where
    F: Fn() -> Result<SystemReading, CollectorError> + Send + Sync,
{
    fn read(&self) -> Result<SystemReading, CollectorError> {
        self()
    }
}
