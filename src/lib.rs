//! # dashmon - Metric Ingestion & Alerting Engine
//!
//! The shared engine behind four monitoring dashboards (AI performance,
//! financial analytics, system health, user engagement).
//!
//! ## Key Features
//!
//! - **Bounded history**: FIFO metric store with a fixed capacity
//! - **Rolling statistics**: Per-category rollups recomputed from the window
//! - **Threshold alerts**: Pure warning/critical classification per category
//! - **Trend detection**: Recent vs. prior sub-window comparison
//! - **Domain profiles**: Categories, thresholds and recommendation rules as data
//!
//! ## Quick Start
//!
//! ```rust
//! use dashmon::domains::financial::{FinancialCategory, FinancialMonitor};
//! use dashmon::AlertSeverity;
//!
//! let monitor = FinancialMonitor::new().unwrap();
//!
//! // MRR below the critical bound raises a critical alert
//! let alert = monitor
//!     .record_metric("mrr", 4000.0, "USD", FinancialCategory::Mrr, ["eu"])
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(alert.severity, AlertSeverity::Critical);
//!
//! let report = monitor.get_summary(24.0);
//! assert_eq!(report.sample_count, 1);
//! assert!(report.has_alerts());
//! ```
//!
//! ## Modules
//!
//! - [`store`]: Bounded sample history
//! - [`threshold`]: Classification and alerts
//! - [`trend`]: Trend detection
//! - [`stats`]: Rolling per-category statistics
//! - [`monitor`]: Generic monitor and summary query
//! - [`domains`]: The four built-in domain monitors

// Modules
pub mod clock;
pub mod config;
pub mod domains;
pub mod entity;
pub mod error;
pub mod monitor;
pub mod probe;
pub mod profile;
pub mod recommend;
pub mod sample;
pub mod stats;
pub mod store;
pub mod summary;
pub mod threshold;
pub mod trend;

// Re-exports for convenient access
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MonitorConfig, TrendConfig};
pub use domains::ai::{AiCategory, AiPerformanceMonitor, ModelHealth};
pub use domains::engagement::{EngagementCategory, EngagementMonitor, FeatureUsage, UserBehavior};
pub use domains::financial::{FinancialCategory, FinancialMonitor, RevenueStream};
pub use domains::system::{ServiceHealth, SystemCategory, SystemHealthMonitor};
pub use domains::Domain;
pub use entity::{EntityKind, EntityRecord, EntitySnapshot, EntityState, ServiceStatus};
pub use error::{CollectorError, MonitorError, Result};
pub use monitor::Monitor;
pub use probe::{FnProbe, HealthProbe, ProbeReport, SystemMetricsSource, SystemReading};
pub use profile::{CategorySpec, DomainProfile};
pub use recommend::{RecommendationRule, Trigger};
pub use sample::MetricSample;
pub use stats::{AggregateStats, CategoryStats};
pub use store::MetricStore;
pub use summary::{Period, SummaryReport};
pub use threshold::{Alert, AlertSeverity, Bounds, HealthTier, Polarity, ThresholdSet};
pub use trend::{Movement, TrendAnalyzer, TrendDirection, TrendResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default metric history capacity
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Default per-category statistics window
pub const DEFAULT_STATS_WINDOW: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_defaults_match_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(config.stats_window, DEFAULT_STATS_WINDOW);
    }
}
