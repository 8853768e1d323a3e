//! Batch ranking mode.
//!
//! Walks a symbol list, loads a short price history per symbol and reduces it
//! to a single-row `SymbolSnapshot`. Symbols are independent: a fetch error,
//! an empty series or a panic inside a fetcher drops that symbol (logged and
//! recorded in `skipped`) and the batch carries on.
//!
//! The finished table is sorted by the 1-day projection, descending; symbols
//! with an undefined projection sort last, ties keep traversal order.

use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use etfpulse_core::data::{PriceFetcher, SymbolList};
use etfpulse_core::domain::{Horizon, SymbolSnapshot};
use etfpulse_core::SeriesAssembler;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PulseConfig;
use crate::data_loader::{load_prices, LoadOptions};

/// Horizon the ranking table is sorted by.
pub const RANKING_HORIZON: Horizon = Horizon::OneDay;

/// A symbol dropped from the batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Per-symbol results in traversal order, before ranking.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub snapshots: Vec<SymbolSnapshot>,
    pub skipped: Vec<SkippedSymbol>,
    /// True if the caller aborted before every symbol was requested.
    pub cancelled: bool,
}

/// Ranked snapshot rows plus the symbols that were dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankingTable {
    pub rows: Vec<SymbolSnapshot>,
    pub skipped: Vec<SkippedSymbol>,
    pub cancelled: bool,
}

impl RankingTable {
    /// Rank a batch by `RANKING_HORIZON`, descending.
    pub fn from_batch(batch: BatchResult) -> Self {
        let mut rows = batch.snapshots;
        sort_by_projection_desc(&mut rows, RANKING_HORIZON);
        Self {
            rows,
            skipped: batch.skipped,
            cancelled: batch.cancelled,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Stable sort by the projection for `horizon`, descending, undefined last.
pub fn sort_by_projection_desc(rows: &mut [SymbolSnapshot], horizon: Horizon) {
    rows.sort_by(|a, b| {
        match (a.frame.projection(horizon), b.frame.projection(horizon)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

enum SymbolOutcome {
    Ranked(SymbolSnapshot),
    Skipped(SkippedSymbol),
    NotRequested,
}

/// Load and reduce one symbol. Errors and panics become `Skipped`.
fn process_symbol(
    symbol: &str,
    fetcher: Option<&dyn PriceFetcher>,
    config: &PulseConfig,
    assembler: &SeriesAssembler,
    opts: &LoadOptions,
    cancel: Option<&AtomicBool>,
) -> SymbolOutcome {
    if cancel.is_some_and(|f| f.load(AtomicOrdering::Relaxed)) {
        return SymbolOutcome::NotRequested;
    }

    let request = config.ranking_request();
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        load_prices(symbol, fetcher, &request, opts).map(|loaded| {
            assembler
                .snapshot_row(symbol, &loaded.prices)
                .map(|row| (row, loaded.prices.len()))
        })
    }));

    let skip = |reason: String| {
        tracing::warn!(symbol, error = %reason, "dropping symbol from ranking");
        SymbolOutcome::Skipped(SkippedSymbol {
            symbol: symbol.to_string(),
            reason,
        })
    };

    match attempt {
        Ok(Ok(Some((row, samples)))) => {
            tracing::debug!(symbol, samples, "symbol ranked");
            SymbolOutcome::Ranked(row)
        }
        Ok(Ok(None)) => skip("empty price series".into()),
        Ok(Err(e)) => skip(e.to_string()),
        Err(payload) => skip(format!("panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Load every symbol and reduce it to a snapshot row, in traversal order.
///
/// Sequential unless `config.ranking.parallel` is set. With a `cancel` flag,
/// symbols not yet requested when the flag is raised are left out and the
/// result is marked `cancelled`.
pub fn collect_snapshots(
    symbols: &SymbolList,
    fetcher: Option<&dyn PriceFetcher>,
    config: &PulseConfig,
    opts: &LoadOptions,
    cancel: Option<&AtomicBool>,
) -> BatchResult {
    let assembler = config.assembler();
    let run = |symbol: &String| {
        process_symbol(symbol, fetcher, config, &assembler, opts, cancel)
    };

    let outcomes: Vec<SymbolOutcome> = if config.ranking.parallel {
        let pool = if config.ranking.threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.ranking.threads)
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to build thread pool, using global pool");
                    None
                }
            }
        } else {
            None
        };
        let par = || symbols.as_slice().par_iter().map(run).collect::<Vec<_>>();
        match pool {
            Some(pool) => pool.install(par),
            None => par(),
        }
    } else {
        symbols.as_slice().iter().map(run).collect()
    };

    let mut batch = BatchResult::default();
    for outcome in outcomes {
        match outcome {
            SymbolOutcome::Ranked(row) => batch.snapshots.push(row),
            SymbolOutcome::Skipped(skipped) => batch.skipped.push(skipped),
            SymbolOutcome::NotRequested => batch.cancelled = true,
        }
    }

    tracing::info!(
        total = symbols.len(),
        ranked = batch.snapshots.len(),
        skipped = batch.skipped.len(),
        cancelled = batch.cancelled,
        "ranking batch complete"
    );

    batch
}

/// Collect snapshots for every symbol and rank them.
pub fn rank_symbols(
    symbols: &SymbolList,
    fetcher: Option<&dyn PriceFetcher>,
    config: &PulseConfig,
    opts: &LoadOptions,
    cancel: Option<&AtomicBool>,
) -> RankingTable {
    RankingTable::from_batch(collect_snapshots(symbols, fetcher, config, opts, cancel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use etfpulse_core::domain::{IndicatorFrame, Projection, WindowStats};

    fn row(symbol: &str, one_day: Option<f64>) -> SymbolSnapshot {
        SymbolSnapshot {
            symbol: symbol.to_string(),
            frame: IndicatorFrame {
                timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                current_change: None,
                stats: WindowStats::ZERO,
                projections: vec![Projection {
                    horizon: Horizon::OneDay,
                    value: one_day,
                }],
            },
        }
    }

    fn one_day_values(rows: &[SymbolSnapshot]) -> Vec<Option<f64>> {
        rows.iter().map(|r| r.frame.projection(Horizon::OneDay)).collect()
    }

    #[test]
    fn sorts_descending() {
        let mut rows = vec![row("A", Some(5.0)), row("B", Some(-2.0)), row("C", Some(10.0))];
        sort_by_projection_desc(&mut rows, Horizon::OneDay);
        assert_eq!(one_day_values(&rows), vec![Some(10.0), Some(5.0), Some(-2.0)]);
    }

    #[test]
    fn undefined_sorts_last_and_ties_are_stable() {
        let mut rows = vec![
            row("A", None),
            row("B", Some(1.0)),
            row("C", Some(1.0)),
            row("D", Some(3.0)),
        ];
        sort_by_projection_desc(&mut rows, Horizon::OneDay);
        let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn empty_symbol_list_gives_empty_table() {
        let table = rank_symbols(
            &SymbolList::default(),
            None,
            &PulseConfig::default(),
            &LoadOptions::default(),
            None,
        );
        assert!(table.is_empty());
        assert!(table.skipped.is_empty());
        assert!(!table.cancelled);
    }

    #[test]
    fn offline_symbols_are_skipped_not_fatal() {
        let table = rank_symbols(
            &SymbolList::new(["SPY", "QQQ"]),
            None,
            &PulseConfig::default(),
            &LoadOptions::default(),
            None,
        );
        assert!(table.is_empty());
        assert_eq!(table.skipped.len(), 2);
        assert_eq!(table.skipped[0].symbol, "SPY");
    }

    #[test]
    fn panic_payloads_are_readable() {
        let payload = panic::catch_unwind(|| {
            panic!("boom");
        })
        .unwrap_err();
        assert_eq!(panic_message(&*payload), "boom");
        let payload = panic::catch_unwind(|| {
            panic!("{}", String::from("owned"));
        })
        .unwrap_err();
        assert_eq!(panic_message(&*payload), "owned");
    }
}
