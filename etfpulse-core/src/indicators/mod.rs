//! Concrete indicator implementations.
//!
//! The return builder turns prices into percentage returns; the classifier
//! and projector implement the `Indicator` trait over those returns. The
//! assembler (`crate::assemble`) zips their outputs into frames.

pub mod classifier;
pub mod projector;
pub mod returns;

pub use classifier::{snapshot_stats, window_stats, RollingClassifier, DEFAULT_NUM_BARS};
pub use projector::{short_mean, ShortHorizonProjector, SHORT_WINDOW};
pub use returns::build_returns;

/// Create an hourly price series from raw prices for testing.
#[cfg(test)]
pub fn make_prices(prices: &[f64]) -> crate::domain::PriceSeries {
    use crate::domain::{PriceSample, PriceSeries};
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
    let samples = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PriceSample::new(base + chrono::Duration::hours(i as i64), price))
        .collect();
    PriceSeries::new(samples).unwrap()
}

/// Build a return series from raw return values with the leading undefined
/// entry prepended, so `raw[j]` lands at index `j + 1`.
#[cfg(test)]
pub fn make_returns(raw: &[f64]) -> crate::domain::ReturnSeries {
    let values = std::iter::once(None)
        .chain(raw.iter().map(|&r| Some(r)))
        .collect();
    returns_from_values(values)
}

/// Build a return series from explicit values with hourly timestamps.
#[cfg(test)]
pub fn returns_from_values(values: Vec<Option<f64>>) -> crate::domain::ReturnSeries {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
    let timestamps = (0..values.len())
        .map(|i| base + chrono::Duration::hours(i as i64))
        .collect();
    crate::domain::ReturnSeries::from_parts(timestamps, values)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
