//! Bounded, append-only metric history.

use crate::sample::MetricSample;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// FIFO store of samples in insertion order.
///
/// Holds at most `capacity` samples; appending to a full store evicts the
/// oldest one. Timestamps are expected to be non-decreasing but this is not
/// enforced.
#[derive(Debug, Clone)]
pub struct MetricStore {
    samples: VecDeque<MetricSample>,
    capacity: usize,
}

impl MetricStore {
    /// Create an empty store. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, returning the evicted one if the store was full.
    pub fn append(&mut self, sample: MetricSample) -> Option<MetricSample> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    /// Lazily iterate over samples matching `predicate`, oldest first.
    ///
    /// The iterator is `Clone`, so it can be restarted from the beginning.
    pub fn recent<P>(&self, predicate: P) -> impl Iterator<Item = &MetricSample> + Clone + '_
    where
        P: Fn(&MetricSample) -> bool + Clone + 'static,
    {
        self.samples.iter().filter(move |s: &&MetricSample| predicate(*s))
    }

    /// Samples strictly newer than `cutoff`.
    pub fn since(&self, cutoff: DateTime<Utc>) -> impl Iterator<Item = &MetricSample> + Clone + '_ {
        self.recent(move |s| s.timestamp > cutoff)
    }

    /// Owned copies of the samples matching `predicate`.
    pub fn snapshot<P>(&self, predicate: P) -> Vec<MetricSample>
    where
        P: Fn(&MetricSample) -> bool + Clone + 'static,
    {
        self.recent(predicate).cloned().collect()
    }

    /// The last `n` samples of a category, oldest first.
    pub fn last_of_category(&self, category: &str, n: usize) -> Vec<&MetricSample> {
        let mut out: Vec<&MetricSample> = self
            .samples
            .iter()
            .rev()
            .filter(|s| s.category == category)
            .take(n)
            .collect();
        out.reverse();
        out
    }

    /// All samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MetricSample> + Clone + '_ {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_at(secs: i64, value: f64, category: &str) -> MetricSample {
        let ts = DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap();
        MetricSample::new(ts, "m", value, "u", category)
    }

    #[test]
    fn test_store_new() {
        let store = MetricStore::new(10);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 10);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let mut store = MetricStore::new(0);
        assert_eq!(store.capacity(), 1);
        store.append(sample_at(0, 1.0, "a"));
        store.append(sample_at(1, 2.0, "a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut store = MetricStore::new(3);
        for i in 0..3 {
            assert!(store.append(sample_at(i, i as f64, "a")).is_none());
        }
        assert!(store.is_full());

        let evicted = store.append(sample_at(3, 3.0, "a")).unwrap();
        assert_eq!(evicted.value, 0.0);

        let values: Vec<f64> = store.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_recent_is_restartable() {
        let mut store = MetricStore::new(10);
        for i in 0..6 {
            store.append(sample_at(i, i as f64, if i % 2 == 0 { "a" } else { "b" }));
        }

        let iter = store.recent(|s| s.category == "a");
        let first: Vec<f64> = iter.clone().map(|s| s.value).collect();
        let second: Vec<f64> = iter.map(|s| s.value).collect();
        assert_eq!(first, vec![0.0, 2.0, 4.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_since_cutoff_is_exclusive() {
        let mut store = MetricStore::new(10);
        for i in 0..5 {
            store.append(sample_at(i * 60, i as f64, "a"));
        }
        let cutoff = DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::seconds(120);
        let values: Vec<f64> = store.since(cutoff).map(|s| s.value).collect();
        assert_eq!(values, vec![3.0, 4.0]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = MetricStore::new(2);
        store.append(sample_at(0, 1.0, "a"));
        let copy = store.snapshot(|_| true);

        store.append(sample_at(1, 2.0, "a"));
        store.append(sample_at(2, 3.0, "a"));

        assert_eq!(copy.len(), 1);
        assert_eq!(copy[0].value, 1.0);
    }

    #[test]
    fn test_last_of_category() {
        let mut store = MetricStore::new(20);
        for i in 0..10 {
            store.append(sample_at(i, i as f64, if i < 5 { "a" } else { "b" }));
        }
        let last: Vec<f64> = store
            .last_of_category("a", 3)
            .iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(last, vec![2.0, 3.0, 4.0]);
        assert!(store.last_of_category("c", 3).is_empty());
    }
}
