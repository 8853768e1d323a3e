//! Short-Horizon Projector.
//!
//! MEAN_K[i] = mean(returns[i-K+1 ..= i]) for i >= K, undefined below K.
//! Each horizon's projection is MEAN_K * scale factor (see `Horizon`).
//! A window holding an undefined return yields an undefined projection.

use crate::domain::{Horizon, Projection, ReturnSeries};
use crate::indicator::Indicator;

/// Short window length, in bars.
pub const SHORT_WINDOW: usize = 5;

/// Mean of the `window` returns ending at `index`, if all are defined.
///
/// `None` when `index < window` or any return in the window is undefined.
pub fn short_mean(returns: &ReturnSeries, index: usize, window: usize) -> Option<f64> {
    if window == 0 || index < window || index >= returns.len() {
        return None;
    }
    let slice = &returns.values()[(index + 1 - window)..=index];
    let mut sum = 0.0;
    for value in slice {
        sum += (*value)?;
    }
    Some(sum / window as f64)
}

#[derive(Debug, Clone)]
pub struct ShortHorizonProjector {
    window: usize,
    horizons: Vec<Horizon>,
    name: String,
}

impl ShortHorizonProjector {
    pub fn new(window: usize) -> Self {
        Self::with_horizons(window, Horizon::ALL.to_vec())
    }

    pub fn with_horizons(window: usize, horizons: Vec<Horizon>) -> Self {
        assert!(window >= 1, "projector window must be >= 1");
        Self {
            window,
            horizons,
            name: format!("projector_{window}"),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn horizons(&self) -> &[Horizon] {
        &self.horizons
    }

    /// Projections for a single index.
    pub fn project_at(&self, returns: &ReturnSeries, index: usize) -> Vec<Projection> {
        let mean = short_mean(returns, index, self.window);
        self.horizons
            .iter()
            .map(|&h| Projection::from_mean(h, mean))
            .collect()
    }

    /// Projections at the last index of the series (all undefined if empty).
    pub fn latest(&self, returns: &ReturnSeries) -> Vec<Projection> {
        match returns.len() {
            0 => self.horizons.iter().map(|&h| Projection::undefined(h)).collect(),
            n => self.project_at(returns, n - 1),
        }
    }
}

impl Default for ShortHorizonProjector {
    fn default() -> Self {
        Self::new(SHORT_WINDOW)
    }
}

impl Indicator for ShortHorizonProjector {
    type Output = Vec<Projection>;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, returns: &ReturnSeries) -> Vec<Vec<Projection>> {
        (0..returns.len())
            .map(|i| self.project_at(returns, i))
            .collect()
    }
}
