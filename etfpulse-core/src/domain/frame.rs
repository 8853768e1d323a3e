//! Indicator outputs: window statistics, projections, and the per-timestamp
//! frame that bundles them for a presentation sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scale factor applied to the short-window mean for the 15-minute horizon.
pub const SCALE_15M: f64 = 23.0;
/// Scale factor applied to the short-window mean for the 1-hour horizon.
pub const SCALE_1H: f64 = 40.0;
/// Scale factor applied to the short-window mean for the 1-day horizon.
pub const SCALE_1D: f64 = 20.0;

/// Mean positive and mean negative return over a window.
///
/// A side with no qualifying returns is `0.0`, never NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub avg_positive: f64,
    pub avg_negative: f64,
}

impl WindowStats {
    /// Placeholder emitted before a rolling window is full.
    pub const ZERO: WindowStats = WindowStats {
        avg_positive: 0.0,
        avg_negative: 0.0,
    };

    pub fn new(avg_positive: f64, avg_negative: f64) -> Self {
        Self {
            avg_positive,
            avg_negative,
        }
    }
}

/// Projection horizon. Each carries a fixed, empirically chosen scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Horizon {
    /// All horizons, in emission order.
    pub const ALL: [Horizon; 3] = [Horizon::FifteenMinutes, Horizon::OneHour, Horizon::OneDay];

    pub fn label(self) -> &'static str {
        match self {
            Horizon::FifteenMinutes => "15m",
            Horizon::OneHour => "1h",
            Horizon::OneDay => "1d",
        }
    }

    pub fn scale_factor(self) -> f64 {
        match self {
            Horizon::FifteenMinutes => SCALE_15M,
            Horizon::OneHour => SCALE_1H,
            Horizon::OneDay => SCALE_1D,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scaled short-window extrapolation for one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub horizon: Horizon,
    pub value: Option<f64>,
}

impl Projection {
    /// Projection derived from a short-window mean (`None` propagates).
    pub fn from_mean(horizon: Horizon, mean: Option<f64>) -> Self {
        Self {
            horizon,
            value: mean.map(|m| m * horizon.scale_factor()),
        }
    }

    pub fn undefined(horizon: Horizon) -> Self {
        Self {
            horizon,
            value: None,
        }
    }
}

/// Per-timestamp bundle consumed by charts and ranking tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub timestamp: DateTime<Utc>,
    pub current_change: Option<f64>,
    pub stats: WindowStats,
    pub projections: Vec<Projection>,
}

impl IndicatorFrame {
    /// Value of the projection for `horizon`, if present and defined.
    pub fn projection(&self, horizon: Horizon) -> Option<f64> {
        self.projections
            .iter()
            .find(|p| p.horizon == horizon)
            .and_then(|p| p.value)
    }
}

/// One ranking-table row: a symbol and its single-row frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    pub symbol: String,
    pub frame: IndicatorFrame,
}
