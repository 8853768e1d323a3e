//! Rolling Classifier.
//!
//! Splits a trailing window of returns into strictly positive and strictly
//! negative subsets and reports the mean of each. Zero and undefined returns
//! belong to neither subset. An empty subset reports 0.0.
//!
//! Rolling mode: the window at index i covers returns i-num_bars+1 ..= i.
//! Indices below num_bars carry `WindowStats::ZERO`.
//! Snapshot mode: one `WindowStats` over the whole series.

use crate::domain::{ReturnSeries, WindowStats};
use crate::indicator::Indicator;

/// Default rolling window length, in bars.
pub const DEFAULT_NUM_BARS: usize = 100;

/// Running sums for the positive and negative subsets of a window.
#[derive(Debug, Clone, Copy, Default)]
struct SubsetSums {
    pos_sum: f64,
    pos_count: usize,
    neg_sum: f64,
    neg_count: usize,
}

impl SubsetSums {
    fn add(&mut self, value: Option<f64>) {
        match value {
            Some(v) if v > 0.0 => {
                self.pos_sum += v;
                self.pos_count += 1;
            }
            Some(v) if v < 0.0 => {
                self.neg_sum += v;
                self.neg_count += 1;
            }
            _ => {}
        }
    }

    fn stats(&self) -> WindowStats {
        WindowStats {
            avg_positive: mean_or_zero(self.pos_sum, self.pos_count),
            avg_negative: mean_or_zero(self.neg_sum, self.neg_count),
        }
    }
}

fn mean_or_zero(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Mean-of-subset statistics over an arbitrary window.
pub fn window_stats(window: &[Option<f64>]) -> WindowStats {
    let mut sums = SubsetSums::default();
    for &value in window {
        sums.add(value);
    }
    sums.stats()
}

/// Snapshot mode: statistics over the entire series.
pub fn snapshot_stats(returns: &ReturnSeries) -> WindowStats {
    window_stats(returns.values())
}

/// Rolling-mode classifier over a fixed trailing window.
#[derive(Debug, Clone)]
pub struct RollingClassifier {
    num_bars: usize,
    name: String,
}

impl RollingClassifier {
    pub fn new(num_bars: usize) -> Self {
        assert!(num_bars >= 1, "classifier window must be >= 1");
        Self {
            num_bars,
            name: format!("classifier_{num_bars}"),
        }
    }

    pub fn num_bars(&self) -> usize {
        self.num_bars
    }
}

impl Default for RollingClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_BARS)
    }
}

impl Indicator for RollingClassifier {
    type Output = WindowStats;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.num_bars
    }

    fn compute(&self, returns: &ReturnSeries) -> Vec<WindowStats> {
        let values = returns.values();
        let n = values.len();
        let mut result = vec![WindowStats::ZERO; n];

        if n <= self.num_bars {
            return result;
        }

        // Summed from scratch per window so every value equals `window_stats`
        // over the same slice.
        for i in self.num_bars..n {
            result[i] = window_stats(&values[i + 1 - self.num_bars..=i]);
        }

        result
    }
}
