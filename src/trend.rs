//! Short-term trend detection over two adjacent sub-windows.

use crate::config::TrendConfig;
use crate::threshold::Polarity;
use serde::{Deserialize, Serialize};

/// Numeric movement of the recent mean relative to the prior mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    Increasing,
    Decreasing,
    Stable,
}

/// Semantic reading of a movement for a given category polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Degrading,
    Stable,
}

impl TrendDirection {
    /// Map a movement onto good/bad for a category.
    pub fn from_movement(movement: Movement, polarity: Polarity) -> Self {
        match (movement, polarity) {
            (Movement::Stable, _) => TrendDirection::Stable,
            (Movement::Increasing, Polarity::LowerIsWorse)
            | (Movement::Decreasing, Polarity::HigherIsWorse) => TrendDirection::Improving,
            (Movement::Increasing, Polarity::HigherIsWorse)
            | (Movement::Decreasing, Polarity::LowerIsWorse) => TrendDirection::Degrading,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Degrading => "degrading",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Trend of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub category: String,
    /// Arithmetic comparison of the two means.
    pub movement: Movement,
    /// What the movement means for this category.
    pub direction: TrendDirection,
    /// `(recent - prior) / prior * 100`; 0 when the prior mean is exactly 0.
    pub percent_change: f64,
    pub recent_average: f64,
    pub prior_average: f64,
    pub recent_count: usize,
    pub prior_count: usize,
    /// Set when `percent_change` is 0 only because the prior mean was 0.
    #[serde(default)]
    pub baseline_zero: bool,
}

/// Compares the most recent sub-window with the one right before it.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Compute the trend of `values` (oldest first, one category).
    ///
    /// Returns None with fewer than `min_samples` values, or when either
    /// sub-window would hold fewer than `min_sub_window_samples`.
    pub fn trend(&self, category: &str, polarity: Polarity, values: &[f64]) -> Option<TrendResult> {
        let n = values.len();
        if n < self.config.min_samples {
            return None;
        }

        let recent_len = self.config.window.min(n);
        let split = n - recent_len;
        let prior_start = split.saturating_sub(self.config.window);

        let recent = &values[split..];
        let prior = &values[prior_start..split];

        if recent.len() < self.config.min_sub_window_samples
            || prior.len() < self.config.min_sub_window_samples
        {
            return None;
        }

        let recent_average = mean(recent);
        let prior_average = mean(prior);

        let movement = if recent_average > prior_average {
            Movement::Increasing
        } else if recent_average < prior_average {
            Movement::Decreasing
        } else {
            Movement::Stable
        };

        let baseline_zero = prior_average == 0.0;
        let percent_change = if baseline_zero {
            0.0
        } else {
            (recent_average - prior_average) / prior_average * 100.0
        };

        Some(TrendResult {
            category: category.to_string(),
            movement,
            direction: TrendDirection::from_movement(movement, polarity),
            percent_change,
            recent_average,
            prior_average,
            recent_count: recent.len(),
            prior_count: prior.len(),
            baseline_zero,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(prior: f64, recent: f64) -> Vec<f64> {
        let mut v = vec![prior; 10];
        v.extend(std::iter::repeat(recent).take(10));
        v
    }

    #[test]
    fn test_too_few_samples() {
        let analyzer = TrendAnalyzer::default();
        let values = vec![1.0; 9];
        assert!(analyzer.trend("x", Polarity::HigherIsWorse, &values).is_none());
    }

    #[test]
    fn test_empty_prior_window() {
        // 10 samples all land in the recent window
        let analyzer = TrendAnalyzer::default();
        let values = vec![1.0; 10];
        assert!(analyzer.trend("x", Polarity::HigherIsWorse, &values).is_none());
    }

    #[test]
    fn test_partial_prior_window() {
        let analyzer = TrendAnalyzer::default();
        let mut values = vec![2.0, 2.0];
        values.extend(vec![4.0; 10]);

        let result = analyzer.trend("x", Polarity::LowerIsWorse, &values).unwrap();
        assert_eq!(result.prior_count, 2);
        assert_eq!(result.recent_count, 10);
        assert_relative_eq!(result.percent_change, 100.0);
        assert_eq!(result.direction, TrendDirection::Improving);
    }

    #[test]
    fn test_response_time_degrading() {
        let analyzer = TrendAnalyzer::default();
        let values = series(500.0, 2500.0);

        let result = analyzer
            .trend("response_time", Polarity::HigherIsWorse, &values)
            .unwrap();
        assert_eq!(result.movement, Movement::Increasing);
        assert_eq!(result.direction, TrendDirection::Degrading);
        assert_relative_eq!(result.percent_change, 400.0);
        assert_relative_eq!(result.recent_average, 2500.0);
        assert_relative_eq!(result.prior_average, 500.0);
    }

    #[test]
    fn test_accuracy_improving() {
        let analyzer = TrendAnalyzer::default();
        let values = series(0.8, 0.9);

        let result = analyzer.trend("accuracy", Polarity::LowerIsWorse, &values).unwrap();
        assert_eq!(result.movement, Movement::Increasing);
        assert_eq!(result.direction, TrendDirection::Improving);
        let expected = (0.9 - 0.8) / 0.8 * 100.0;
        assert_relative_eq!(result.percent_change, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_only_last_two_windows_count() {
        let analyzer = TrendAnalyzer::default();
        let mut values = vec![1000.0; 15];
        values.extend(series(10.0, 5.0));

        let result = analyzer.trend("x", Polarity::HigherIsWorse, &values).unwrap();
        assert_relative_eq!(result.prior_average, 10.0);
        assert_eq!(result.direction, TrendDirection::Improving);
    }

    #[test]
    fn test_stable() {
        let analyzer = TrendAnalyzer::default();
        let values = series(3.0, 3.0);
        let result = analyzer.trend("x", Polarity::HigherIsWorse, &values).unwrap();
        assert_eq!(result.movement, Movement::Stable);
        assert_eq!(result.direction, TrendDirection::Stable);
        assert_eq!(result.percent_change, 0.0);
        assert!(!result.baseline_zero);
    }

    #[test]
    fn test_zero_baseline_is_flagged() {
        let analyzer = TrendAnalyzer::default();
        let values = series(0.0, 7.0);
        let result = analyzer.trend("x", Polarity::HigherIsWorse, &values).unwrap();
        assert_eq!(result.percent_change, 0.0);
        assert!(result.baseline_zero);
        assert_eq!(result.movement, Movement::Increasing);
    }

    #[test]
    fn test_custom_window() {
        let analyzer = TrendAnalyzer::new(TrendConfig {
            window: 3,
            min_samples: 4,
            min_sub_window_samples: 1,
        });
        let values = vec![1.0, 2.0, 2.0, 2.0];
        let result = analyzer.trend("x", Polarity::HigherIsWorse, &values).unwrap();
        assert_eq!(result.prior_count, 1);
        assert_relative_eq!(result.percent_change, 100.0);
    }
}
