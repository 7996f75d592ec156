// dashmon Replay - CSV replay for dashmon monitors
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Replay engine feeding a CSV metric log through one domain monitor.
//!
//! Rows keep their own timestamps. A manual clock follows the rows, so the
//! summary window is measured from the last replayed row rather than from
//! the wall clock.

use chrono::{DateTime, Utc};
use dashmon::{
    Clock, Domain, ManualClock, MetricSample, Monitor, MonitorConfig, MonitorError, SummaryReport,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Columns every replay file must start with, in order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["timestamp_ms", "name", "value", "unit", "category"];

/// Optional trailing column holding `;`-separated tags.
pub const TAGS_COLUMN: &str = "tags";

/// Configuration for a replay run.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Path to the CSV file.
    pub csv_path: String,
    /// Domain monitor to replay into.
    pub domain: Domain,
    /// Summary window, measured back from the last row.
    pub window_hours: f64,
    /// Monitor sizing.
    pub monitor: MonitorConfig,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            csv_path: String::new(),
            domain: Domain::System,
            window_hours: 24.0,
            monitor: MonitorConfig::default(),
        }
    }
}

/// One parsed CSV row.
#[derive(Debug, Clone, PartialEq)]
struct MetricRow {
    line: u64,
    timestamp: DateTime<Utc>,
    name: String,
    value: f64,
    unit: String,
    category: String,
    tags: Vec<String>,
}

/// Result of a replay run.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Rows accepted by the monitor.
    pub recorded: usize,
    /// Rows that could not be parsed or were rejected by the monitor.
    pub rejected: usize,
    /// Alerts raised while recording, in row order.
    pub alerts_raised: usize,
    pub report: SummaryReport,
}

/// Replays parsed rows into a monitor driven by a manual clock.
pub struct ReplayEngine {
    config: ReplayConfig,
    clock: Arc<ManualClock>,
    monitor: Monitor,
    rows: Vec<MetricRow>,
    malformed: usize,
}

impl ReplayEngine {
    /// Load and parse a CSV file.
    pub fn from_csv(config: ReplayConfig) -> Result<Self, ReplayError> {
        let path = Path::new(&config.csv_path);
        if !path.exists() {
            return Err(ReplayError::FileNotFound(config.csv_path.clone()));
        }

        let (rows, malformed) = Self::parse_csv(path)?;
        if rows.is_empty() && malformed == 0 {
            return Err(ReplayError::EmptyDataset);
        }

        let start = rows.first().map(|r| r.timestamp).unwrap_or_default();
        let clock = Arc::new(ManualClock::new(start));
        let monitor = Monitor::with_config(config.domain.profile(), config.monitor.clone())?
            .with_clock(clock.clone());

        info!(
            "Loaded dataset: {} rows ({} malformed) for domain '{}'",
            rows.len(),
            malformed,
            config.domain
        );

        Ok(Self {
            config,
            clock,
            monitor,
            rows,
            malformed,
        })
    }

    /// Parse rows, counting (not failing on) malformed lines.
    fn parse_csv(path: &Path) -> Result<(Vec<MetricRow>, usize), ReplayError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let header_strs: Vec<&str> = headers.iter().collect();
        if header_strs.len() < REQUIRED_COLUMNS.len()
            || header_strs[..REQUIRED_COLUMNS.len()] != REQUIRED_COLUMNS
        {
            return Err(ReplayError::InvalidFormat(format!(
                "header must start with {}",
                REQUIRED_COLUMNS.join(",")
            )));
        }
        let tags_index = header_strs.iter().position(|h| *h == TAGS_COLUMN);

        let mut rows = Vec::new();
        let mut malformed = 0;
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            match Self::parse_record(&record, line, tags_index) {
                Ok(row) => rows.push(row),
                Err(reason) => {
                    warn!("Skipping line {}: {}", line, reason);
                    malformed += 1;
                }
            }
        }

        Ok((rows, malformed))
    }

    fn parse_record(
        record: &csv::StringRecord,
        line: u64,
        tags_index: Option<usize>,
    ) -> Result<MetricRow, String> {
        let field = |i: usize| record.get(i).unwrap_or("");

        let timestamp_ms: i64 = field(0)
            .parse()
            .map_err(|_| format!("invalid timestamp '{}'", field(0)))?;
        let timestamp = DateTime::from_timestamp_millis(timestamp_ms)
            .ok_or_else(|| format!("timestamp {} out of range", timestamp_ms))?;
        let value: f64 = field(2)
            .parse()
            .map_err(|_| format!("invalid value '{}'", field(2)))?;

        let tags = tags_index
            .map(|i| {
                field(i)
                    .split(';')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(MetricRow {
            line,
            timestamp,
            name: field(1).to_string(),
            value,
            unit: field(3).to_string(),
            category: field(4).to_string(),
            tags,
        })
    }

    /// Record every row, then summarize.
    pub fn run(&self) -> ReplayOutcome {
        let mut recorded = 0;
        let mut rejected = self.malformed;
        let mut alerts_raised = 0;
        let mut latest = self.clock.now();

        for row in &self.rows {
            self.clock.set(row.timestamp);
            latest = latest.max(row.timestamp);

            let sample = MetricSample::new(
                row.timestamp,
                row.name.as_str(),
                row.value,
                row.unit.as_str(),
                row.category.as_str(),
            )
            .with_tags(row.tags.iter().cloned());

            match self.monitor.record_sample(sample) {
                Ok(alert) => {
                    recorded += 1;
                    if alert.is_some() {
                        alerts_raised += 1;
                    }
                }
                Err(e) => {
                    debug!("Line {} rejected: {}", row.line, e);
                    rejected += 1;
                }
            }
        }

        self.clock.set(latest);
        let report = self.monitor.get_summary(self.config.window_hours);

        info!(
            "Replay complete: {} recorded, {} rejected, {} alerts",
            recorded, rejected, alerts_raised
        );

        ReplayOutcome {
            recorded,
            rejected,
            alerts_raised,
            report,
        }
    }

    /// Get dataset info.
    pub fn dataset_info(&self) -> DatasetInfo {
        let first = self.rows.iter().map(|r| r.timestamp).min();
        let last = self.rows.iter().map(|r| r.timestamp).max();
        let duration_ms = match (first, last) {
            (Some(first), Some(last)) => (last - first).num_milliseconds(),
            _ => 0,
        };

        let mut categories: Vec<String> = self.rows.iter().map(|r| r.category.clone()).collect();
        categories.sort();
        categories.dedup();

        DatasetInfo {
            row_count: self.rows.len(),
            malformed_count: self.malformed,
            duration_ms,
            categories,
        }
    }
}

/// Dataset information.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub row_count: usize,
    pub malformed_count: usize,
    pub duration_ms: i64,
    pub categories: Vec<String>,
}

/// Replay errors.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
