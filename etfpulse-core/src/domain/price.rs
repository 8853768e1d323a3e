//! Price samples and the validated price series they form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// True when the price can serve as a return endpoint (finite and > 0).
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Structural errors raised when building a `PriceSeries`.
///
/// Bad prices are not structural: they surface as undefined returns
/// downstream. Only the timestamp ordering is enforced here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("timestamp at index {index} ({timestamp}) is not after the previous sample")]
    NonIncreasingTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Ordered, immutable price history for one symbol.
///
/// Timestamps are strictly increasing. An empty series is allowed and means
/// "no data for this symbol".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    samples: Vec<PriceSample>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps.
    pub fn new(samples: Vec<PriceSample>) -> Result<Self, SeriesError> {
        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp {
                    index: i + 1,
                    timestamp: pair[1].timestamp,
                });
            }
        }
        Ok(Self { samples })
    }

    /// Sort by timestamp and drop duplicates (last sample wins), then build.
    ///
    /// Used on raw provider output, which is not guaranteed to be ordered.
    pub fn canonicalize(mut samples: Vec<PriceSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        let mut out: Vec<PriceSample> = Vec::with_capacity(samples.len());
        for sample in samples {
            match out.last_mut() {
                Some(last) if last.timestamp == sample.timestamp => *last = sample,
                _ => out.push(sample),
            }
        }
        Self { samples: out }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&PriceSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&PriceSample> {
        self.samples.last()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.samples.iter().map(|s| s.timestamp)
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.price)
    }

    /// Number of samples whose price is non-positive or non-finite.
    pub fn invalid_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap() + Duration::hours(hour)
    }

    #[test]
    fn accepts_increasing_timestamps() {
        let series = PriceSeries::new(vec![
            PriceSample::new(ts(0), 100.0),
            PriceSample::new(ts(1), 101.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().price, 101.0);
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let err = PriceSeries::new(vec![
            PriceSample::new(ts(0), 100.0),
            PriceSample::new(ts(0), 101.0),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SeriesError::NonIncreasingTimestamp {
                index: 1,
                timestamp: ts(0)
            }
        );
    }

    #[test]
    fn rejects_backwards_timestamp() {
        let result = PriceSeries::new(vec![
            PriceSample::new(ts(2), 100.0),
            PriceSample::new(ts(1), 101.0),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn canonicalize_sorts_and_keeps_last_duplicate() {
        let series = PriceSeries::canonicalize(vec![
            PriceSample::new(ts(2), 102.0),
            PriceSample::new(ts(0), 100.0),
            PriceSample::new(ts(2), 103.0),
            PriceSample::new(ts(1), 101.0),
        ]);
        let prices: Vec<f64> = series.prices().collect();
        assert_eq!(prices, vec![100.0, 101.0, 103.0]);
    }

    #[test]
    fn invalid_samples_are_counted_not_rejected() {
        let series = PriceSeries::new(vec![
            PriceSample::new(ts(0), 100.0),
            PriceSample::new(ts(1), 0.0),
            PriceSample::new(ts(2), f64::NAN),
            PriceSample::new(ts(3), -5.0),
        ])
        .unwrap();
        assert_eq!(series.invalid_count(), 3);
    }

    #[test]
    fn empty_series_is_allowed() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }
}
