//! Single-symbol chart mode.
//!
//! Loads one symbol and assembles everything a chart sink needs: the price
//! line, the per-timestamp indicator frames, and a snapshot summary. A
//! missing or failed fetch becomes `ChartOutcome::NoData`, never an error.

use etfpulse_core::data::{DataSource, PriceFetcher};
use etfpulse_core::domain::{IndicatorFrame, PriceSeries};
use serde::Serialize;

use crate::config::PulseConfig;
use crate::data_loader::{load_prices, LoadOptions};

/// Everything needed to draw the price and indicator charts for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub symbol: String,
    pub source: DataSource,
    pub prices: PriceSeries,
    pub frames: Vec<IndicatorFrame>,
    /// Snapshot-mode statistics with the latest change and projections.
    pub summary: IndicatorFrame,
}

impl ChartReport {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Result of a chart request.
#[derive(Debug, Clone)]
pub enum ChartOutcome {
    Ready(Box<ChartReport>),
    /// Soft warning state: nothing to draw for this symbol.
    NoData { symbol: String, reason: String },
}

impl ChartOutcome {
    pub fn report(&self) -> Option<&ChartReport> {
        match self {
            ChartOutcome::Ready(report) => Some(report.as_ref()),
            ChartOutcome::NoData { .. } => None,
        }
    }
}

/// Build the chart report for `symbol` using the chart fetch settings.
pub fn run_chart(
    symbol: &str,
    fetcher: Option<&dyn PriceFetcher>,
    config: &PulseConfig,
    opts: &LoadOptions,
) -> ChartOutcome {
    let loaded = match load_prices(symbol, fetcher, &config.chart_request(), opts) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!(symbol, error = %e, "no data available for chart");
            return ChartOutcome::NoData {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            };
        }
    };

    let assembler = config.assembler();
    let frames = assembler.frames(&loaded.prices);
    let Some(summary) = assembler.snapshot(&loaded.prices) else {
        return ChartOutcome::NoData {
            symbol: symbol.to_string(),
            reason: "empty price series".into(),
        };
    };

    tracing::info!(
        symbol,
        samples = loaded.prices.len(),
        invalid = loaded.prices.invalid_count(),
        "chart assembled"
    );

    ChartOutcome::Ready(Box::new(ChartReport {
        symbol: loaded.symbol,
        source: loaded.source,
        prices: loaded.prices,
        frames,
        summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use etfpulse_core::data::{DataError, FetchRequest, FetchResult};
    use etfpulse_core::domain::Horizon;

    struct EmptyFetcher;

    impl PriceFetcher for EmptyFetcher {
        fn name(&self) -> &str {
            "empty"
        }

        fn fetch(&self, symbol: &str, _request: &FetchRequest) -> Result<FetchResult, DataError> {
            Ok(FetchResult {
                symbol: symbol.to_string(),
                prices: PriceSeries::empty(),
                source: DataSource::YahooFinance,
            })
        }
    }

    #[test]
    fn empty_fetch_is_no_data() {
        let outcome = run_chart(
            "SPY",
            Some(&EmptyFetcher),
            &PulseConfig::default(),
            &LoadOptions::default(),
        );
        match outcome {
            ChartOutcome::NoData { symbol, reason } => {
                assert_eq!(symbol, "SPY");
                assert!(reason.contains("no data"));
            }
            ChartOutcome::Ready(_) => panic!("expected NoData"),
        }
    }

    #[test]
    fn synthetic_chart_has_aligned_frames() {
        let outcome = run_chart(
            "SPY",
            Some(&EmptyFetcher),
            &PulseConfig::default(),
            &LoadOptions { synthetic: true },
        );
        let report = outcome.report().expect("synthetic data should produce a report");
        assert!(report.is_synthetic());
        assert_eq!(report.frames.len(), report.prices.len());
        assert_eq!(
            report.summary.projection(Horizon::OneDay),
            report.frames.last().unwrap().projection(Horizon::OneDay)
        );
    }
}
