//! ETF Pulse CLI: chart, rank, and symbol-list commands.
//!
//! Commands:
//! - `chart`: indicator frames and snapshot summary for one symbol
//! - `rank`: snapshot table over a symbol list, sorted by 1-day projection
//! - `symbols`: show or reset the symbol-list file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use etfpulse_core::data::{PriceFetcher, SymbolList, SymbolListFile, YahooFetcher};
use etfpulse_core::domain::{Horizon, IndicatorFrame};
use etfpulse_runner::export::{
    save_chart_json, save_frames_csv, save_ranking_csv, save_ranking_json,
};
use etfpulse_runner::{
    rank_symbols, run_chart, ChartOutcome, ChartReport, LoadOptions, PulseConfig, RankingTable,
};

#[derive(Parser)]
#[command(
    name = "etfpulse",
    about = "Short-horizon return projections for ETFs"
)]
struct Cli {
    /// Path to a TOML config file. Missing file means defaults.
    #[arg(long, global = true, default_value = "etfpulse.toml")]
    config: PathBuf,

    /// Offline mode: no network access.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Use synthetic prices when a fetch fails or returns nothing.
    #[arg(long, global = true, default_value_t = false)]
    synthetic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the indicator frames and snapshot summary for one symbol.
    Chart {
        /// Ticker symbol (e.g., SPY).
        symbol: String,

        /// Write the full chart report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the frame series as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Number of most recent frames to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Rank symbols by their 1-day projection.
    Rank {
        /// Symbols to rank. Defaults to the symbol-list file.
        symbols: Vec<String>,

        /// Fetch symbols in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Write the ranking table as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the ranking table as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Show the symbol-list file, creating it with the default ETFs if absent.
    Symbols {
        /// Overwrite the file with the default ETF list.
        #[arg(long, default_value_t = false)]
        reset: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PulseConfig::load_or_default(Some(&cli.config))
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    init_tracing(&config);

    let opts = LoadOptions {
        synthetic: cli.synthetic,
    };

    match cli.command {
        Commands::Chart {
            symbol,
            json,
            csv,
            rows,
        } => run_chart_cmd(&config, cli.offline, &opts, &symbol, json, csv, rows),
        Commands::Rank {
            symbols,
            parallel,
            csv,
            json,
        } => {
            let mut config = config;
            config.ranking.parallel |= parallel;
            run_rank_cmd(&config, cli.offline, &opts, symbols, csv, json)
        }
        Commands::Symbols { reset } => run_symbols_cmd(&config, reset),
    }
}

/// Logs go to stderr so tables on stdout stay clean. `RUST_LOG` overrides the
/// configured level.
fn init_tracing(config: &PulseConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_fetcher(config: &PulseConfig, offline: bool) -> Result<Option<YahooFetcher>> {
    if offline {
        return Ok(None);
    }
    let fetcher = config
        .yahoo_fetcher()
        .context("failed to build HTTP client")?;
    Ok(Some(fetcher))
}

fn run_chart_cmd(
    config: &PulseConfig,
    offline: bool,
    opts: &LoadOptions,
    symbol: &str,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
    rows: usize,
) -> Result<()> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let fetcher = build_fetcher(config, offline)?;
    let fetcher_ref = fetcher.as_ref().map(|f| f as &dyn PriceFetcher);

    let report = match run_chart(&symbol, fetcher_ref, config, opts) {
        ChartOutcome::Ready(report) => report,
        ChartOutcome::NoData { symbol, reason } => {
            println!("No data available for {symbol} ({reason})");
            return Ok(());
        }
    };

    print_chart(&report, rows);

    if let Some(path) = json {
        save_chart_json(&report, &path)?;
        println!("Chart JSON saved to: {}", path.display());
    }
    if let Some(path) = csv {
        save_frames_csv(&report.frames, &path)?;
        println!("Frames CSV saved to: {}", path.display());
    }
    Ok(())
}

fn run_rank_cmd(
    config: &PulseConfig,
    offline: bool,
    opts: &LoadOptions,
    symbols: Vec<String>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let list = if symbols.is_empty() {
        SymbolListFile::new(config.symbols.file.clone()).load_or_init()?
    } else {
        SymbolList::new(symbols)
    };

    let fetcher = build_fetcher(config, offline)?;
    let fetcher_ref = fetcher.as_ref().map(|f| f as &dyn PriceFetcher);
    let table = rank_symbols(&list, fetcher_ref, config, opts, None);

    print_ranking(&table);

    if let Some(path) = csv {
        save_ranking_csv(&table, &path)?;
        println!("Ranking CSV saved to: {}", path.display());
    }
    if let Some(path) = json {
        save_ranking_json(&table, &path)?;
        println!("Ranking JSON saved to: {}", path.display());
    }
    Ok(())
}

fn run_symbols_cmd(config: &PulseConfig, reset: bool) -> Result<()> {
    let file = SymbolListFile::new(config.symbols.file.clone());
    let list = if reset {
        let list = SymbolList::default_etfs();
        file.write(&list)?;
        list
    } else {
        file.load_or_init()?
    };

    println!("{} ({} symbols)", file.path().display(), list.len());
    for symbol in list.iter() {
        println!("  {symbol}");
    }
    Ok(())
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.3}%"),
        None => "n/a".to_string(),
    }
}

fn frame_columns(frame: &IndicatorFrame) -> String {
    format!(
        "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        fmt_pct(frame.current_change),
        fmt_pct(Some(frame.stats.avg_positive)),
        fmt_pct(Some(frame.stats.avg_negative)),
        fmt_pct(frame.projection(Horizon::FifteenMinutes)),
        fmt_pct(frame.projection(Horizon::OneHour)),
        fmt_pct(frame.projection(Horizon::OneDay)),
    )
}

const FRAME_HEADER: &str = "    change    avg_pos    avg_neg   proj_15m    proj_1h    proj_1d";

fn print_chart(report: &ChartReport, rows: usize) {
    println!();
    println!("=== {} ===", report.symbol);
    if let (Some(first), Some(last)) = (report.prices.first(), report.prices.last()) {
        println!(
            "Samples:        {} ({} to {})",
            report.prices.len(),
            first.timestamp.format("%Y-%m-%d %H:%M"),
            last.timestamp.format("%Y-%m-%d %H:%M")
        );
        println!("Last price:     {:.2}", last.price);
    }
    let invalid = report.prices.invalid_count();
    if invalid > 0 {
        println!("Invalid prices: {invalid}");
    }

    println!();
    println!("--- Latest frames ---");
    println!("{:<17}{FRAME_HEADER}", "timestamp");
    let start = report.frames.len().saturating_sub(rows);
    for frame in &report.frames[start..] {
        println!(
            "{:<17}{}",
            frame.timestamp.format("%Y-%m-%d %H:%M"),
            frame_columns(frame)
        );
    }

    println!();
    println!("--- Snapshot ---");
    println!("{:<17}{FRAME_HEADER}", "");
    println!("{:<17}{}", "", frame_columns(&report.summary));

    if report.is_synthetic() {
        println!();
        println!("WARNING: chart based on SYNTHETIC data");
    }
}

fn print_ranking(table: &RankingTable) {
    println!();
    println!("=== Ranking by 1d projection ===");
    println!("{:>4} {:<8}{FRAME_HEADER}", "#", "symbol");
    for (i, row) in table.rows.iter().enumerate() {
        println!("{:>4} {:<8}{}", i + 1, row.symbol, frame_columns(&row.frame));
    }
    if table.is_empty() {
        println!("No data available for any symbol");
    }
    for skipped in &table.skipped {
        println!("skipped {}: {}", skipped.symbol, skipped.reason);
    }
    if table.cancelled {
        println!("WARNING: ranking was cancelled before all symbols were requested");
    }
}
