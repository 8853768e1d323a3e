//! Percentage-return series aligned to a price series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a `ReturnSeries`. `return_pct` is `None` where no return is
/// defined (first sample, or an invalid price on either side).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub timestamp: DateTime<Utc>,
    pub return_pct: Option<f64>,
}

/// Returns in percent, one per price sample.
///
/// Stored column-wise so windowed statistics can borrow `&[Option<f64>]`
/// slices directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<Option<f64>>,
}

impl ReturnSeries {
    /// Build from parallel columns. Panics if the lengths differ.
    pub fn from_parts(timestamps: Vec<DateTime<Utc>>, values: Vec<Option<f64>>) -> Self {
        assert_eq!(
            timestamps.len(),
            values.len(),
            "return series columns must have equal length"
        );
        Self { timestamps, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return at `index`, `None` if undefined or out of bounds.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn points(&self) -> impl Iterator<Item = ReturnPoint> + '_ {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(&timestamp, &return_pct)| ReturnPoint {
                timestamp,
                return_pct,
            })
    }

    /// Number of defined returns.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}
