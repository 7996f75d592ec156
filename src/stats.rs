//! Rolling per-category statistics.
//!
//! Stats are recomputed from the stored window on every change, never
//! updated incrementally, so they can always be reproduced from the
//! samples alone.

use crate::sample::MetricSample;
use crate::store::MetricStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of the most recent samples of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Number of samples pooled.
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Value of the newest sample.
    pub latest: f64,
    pub first_timestamp: DateTime<Utc>,
    pub last_timestamp: DateTime<Utc>,
    /// Samples per minute across the window span. None for a zero span.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rate_per_minute: Option<f64>,
}

impl CategoryStats {
    /// Summarize samples given oldest first. None when empty.
    pub fn from_samples(samples: &[&MetricSample]) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;

        let count = samples.len();
        let sum: f64 = samples.iter().map(|s| s.value).sum();
        let average = sum / count as f64;
        let min = samples.iter().map(|s| s.value).fold(f64::INFINITY, f64::min);
        let max = samples
            .iter()
            .map(|s| s.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let variance = samples
            .iter()
            .map(|s| (s.value - average).powi(2))
            .sum::<f64>()
            / count as f64;

        let span_ms = (last.timestamp - first.timestamp).num_milliseconds();
        let rate_per_minute = if span_ms > 0 {
            Some(count as f64 / (span_ms as f64 / 60_000.0))
        } else {
            None
        };

        Some(Self {
            count,
            average,
            min,
            max,
            sum,
            std_dev: variance.sqrt(),
            latest: last.value,
            first_timestamp: first.timestamp,
            last_timestamp: last.timestamp,
            rate_per_minute,
        })
    }
}

/// Stats for every category currently present in a store.
#[derive(Debug, Clone)]
pub struct AggregateStats {
    window: usize,
    categories: BTreeMap<String, CategoryStats>,
}

impl AggregateStats {
    /// `window` is the number of most recent samples per category pooled.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            categories: BTreeMap::new(),
        }
    }

    /// Recompute one category from the store.
    pub fn refresh(&mut self, store: &MetricStore, category: &str) {
        let window = store.last_of_category(category, self.window);
        match CategoryStats::from_samples(&window) {
            Some(stats) => {
                self.categories.insert(category.to_string(), stats);
            }
            None => {
                self.categories.remove(category);
            }
        }
    }

    /// Recompute every category from scratch.
    pub fn rebuild(&mut self, store: &MetricStore) {
        let mut names: Vec<String> = store.iter().map(|s| s.category.clone()).collect();
        names.sort();
        names.dedup();

        self.categories.clear();
        for name in names {
            self.refresh(store, &name);
        }
    }

    pub fn get(&self, category: &str) -> Option<&CategoryStats> {
        self.categories.get(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CategoryStats)> {
        self.categories.iter()
    }

    /// Owned copy, ordered by category name.
    pub fn to_map(&self) -> BTreeMap<String, CategoryStats> {
        self.categories.clone()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
