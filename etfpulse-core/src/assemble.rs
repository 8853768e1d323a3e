//! Series Assembler.
//!
//! Runs the return builder, rolling classifier and short-horizon projector
//! over a price series and aligns their outputs to the price timestamps.
//!
//! Two shapes:
//! - `frames`: one `IndicatorFrame` per price sample (chart consumers).
//! - `snapshot`: a single frame built from snapshot-mode statistics and the
//!   last projection values (ranking-table consumers).

use crate::domain::{IndicatorFrame, PriceSeries, ReturnSeries, SymbolSnapshot};
use crate::indicator::Indicator;
use crate::indicators::{
    build_returns, snapshot_stats, RollingClassifier, ShortHorizonProjector, DEFAULT_NUM_BARS,
    SHORT_WINDOW,
};

#[derive(Debug, Clone)]
pub struct SeriesAssembler {
    classifier: RollingClassifier,
    projector: ShortHorizonProjector,
}

impl SeriesAssembler {
    pub fn new(num_bars: usize, short_window: usize) -> Self {
        Self {
            classifier: RollingClassifier::new(num_bars),
            projector: ShortHorizonProjector::new(short_window),
        }
    }

    pub fn from_parts(classifier: RollingClassifier, projector: ShortHorizonProjector) -> Self {
        Self {
            classifier,
            projector,
        }
    }

    pub fn classifier(&self) -> &RollingClassifier {
        &self.classifier
    }

    pub fn projector(&self) -> &ShortHorizonProjector {
        &self.projector
    }

    /// Number of leading frames that still carry placeholders.
    pub fn warmup(&self) -> usize {
        self.classifier.lookback().max(self.projector.lookback())
    }

    /// Per-timestamp frames for a price series. Output length equals input length.
    pub fn frames(&self, prices: &PriceSeries) -> Vec<IndicatorFrame> {
        self.frames_from_returns(&build_returns(prices))
    }

    /// Per-timestamp frames for an already-built return series.
    pub fn frames_from_returns(&self, returns: &ReturnSeries) -> Vec<IndicatorFrame> {
        let stats = self.classifier.compute(returns);
        let projections = self.projector.compute(returns);
        debug_assert_eq!(stats.len(), returns.len());
        debug_assert_eq!(projections.len(), returns.len());

        returns
            .points()
            .zip(stats)
            .zip(projections)
            .map(|((point, stats), projections)| IndicatorFrame {
                timestamp: point.timestamp,
                current_change: point.return_pct,
                stats,
                projections,
            })
            .collect()
    }

    /// Single-row frame: snapshot statistics over the whole series plus the
    /// latest change and projections. `None` for an empty series.
    pub fn snapshot(&self, prices: &PriceSeries) -> Option<IndicatorFrame> {
        let last = prices.last()?;
        let returns = build_returns(prices);
        Some(IndicatorFrame {
            timestamp: last.timestamp,
            current_change: returns.get(returns.len() - 1),
            stats: snapshot_stats(&returns),
            projections: self.projector.latest(&returns),
        })
    }

    /// Ranking-table row for `symbol`. `None` for an empty series.
    pub fn snapshot_row(&self, symbol: &str, prices: &PriceSeries) -> Option<SymbolSnapshot> {
        self.snapshot(prices).map(|frame| SymbolSnapshot {
            symbol: symbol.to_string(),
            frame,
        })
    }
}

impl Default for SeriesAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_BARS, SHORT_WINDOW)
    }
}
