//! ETF Pulse Runner: configuration, data loading, chart and ranking modes.
//!
//! This crate builds on `etfpulse-core` to provide:
//! - TOML configuration with defaults for every field
//! - Price loading with an optional synthetic fallback
//! - Chart mode: full frame series for one symbol
//! - Ranking mode: one snapshot row per symbol, failures isolated per symbol
//! - JSON and CSV export

pub mod chart;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod ranking;

pub use chart::{run_chart, ChartOutcome, ChartReport};
pub use config::{ConfigError, PulseConfig};
pub use data_loader::{generate_synthetic_prices, load_prices, LoadError, LoadOptions, LoadedPrices};
pub use ranking::{
    collect_snapshots, rank_symbols, sort_by_projection_desc, BatchResult, RankingTable,
    SkippedSymbol, RANKING_HORIZON,
};
