//! Indicator trait.
//!
//! Indicators are pure functions: return history in, one output per index out.
//! They are computed once per series; the assembler zips their outputs into
//! frames.

use crate::domain::ReturnSeries;

/// Trait for return-series indicators.
///
/// `compute` produces exactly one output per entry of the input series.
/// Indices before `lookback()` carry the indicator's placeholder value.
///
/// # Look-ahead contamination guard
/// No output at index t may depend on returns at index t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    type Output;

    /// Human-readable name (e.g., "classifier_100", "projector_5").
    fn name(&self) -> &str;

    /// First index at which the indicator produces a non-placeholder value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire return series.
    fn compute(&self, returns: &ReturnSeries) -> Vec<Self::Output>;
}
