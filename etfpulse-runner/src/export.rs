//! Export sinks: JSON and CSV.
//!
//! Undefined values are written as empty CSV cells and as `null` in JSON.
//! Percentages are written as computed, never rounded for display.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use etfpulse_core::domain::{Horizon, IndicatorFrame, PriceSeries};

use crate::chart::ChartReport;
use crate::ranking::RankingTable;

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a chart report to pretty JSON.
pub fn chart_to_json(report: &ChartReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize chart report to JSON")
}

/// Serialize a ranking table to pretty JSON.
pub fn ranking_to_json(table: &RankingTable) -> Result<String> {
    serde_json::to_string_pretty(table).context("failed to serialize ranking table to JSON")
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Columns: timestamp, price.
pub fn prices_to_csv(prices: &PriceSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "price"])?;
    for s in prices.samples() {
        wtr.write_record([s.timestamp.to_rfc3339(), s.price.to_string()])?;
    }
    finish(wtr)
}

fn frame_header(leading: &[&str]) -> Vec<String> {
    let mut header: Vec<String> = leading.iter().map(|s| s.to_string()).collect();
    header.extend(
        ["current_change", "avg_positive", "avg_negative"]
            .iter()
            .map(|s| s.to_string()),
    );
    header.extend(Horizon::ALL.iter().map(|h| format!("proj_{}", h.label())));
    header
}

fn frame_cells(frame: &IndicatorFrame) -> Vec<String> {
    let mut row = vec![
        cell(frame.current_change),
        frame.stats.avg_positive.to_string(),
        frame.stats.avg_negative.to_string(),
    ];
    row.extend(Horizon::ALL.iter().map(|h| cell(frame.projection(*h))));
    row
}

/// One row per frame.
///
/// Columns: timestamp, current_change, avg_positive, avg_negative,
/// proj_15m, proj_1h, proj_1d
pub fn frames_to_csv(frames: &[IndicatorFrame]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(frame_header(&["timestamp"]))?;
    for frame in frames {
        let mut row = vec![frame.timestamp.to_rfc3339()];
        row.extend(frame_cells(frame));
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

/// One row per ranked symbol, in table order.
///
/// Columns: rank, symbol, timestamp, current_change, avg_positive,
/// avg_negative, proj_15m, proj_1h, proj_1d
pub fn ranking_to_csv(table: &RankingTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(frame_header(&["rank", "symbol", "timestamp"]))?;
    for (i, row) in table.rows.iter().enumerate() {
        let mut record = vec![
            (i + 1).to_string(),
            row.symbol.clone(),
            row.frame.timestamp.to_rfc3339(),
        ];
        record.extend(frame_cells(&row.frame));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

// ─── Files ──────────────────────────────────────────────────────────

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

pub fn save_chart_json(report: &ChartReport, path: &Path) -> Result<()> {
    write_file(path, &chart_to_json(report)?)
}

pub fn save_frames_csv(frames: &[IndicatorFrame], path: &Path) -> Result<()> {
    write_file(path, &frames_to_csv(frames)?)
}

pub fn save_ranking_csv(table: &RankingTable, path: &Path) -> Result<()> {
    write_file(path, &ranking_to_csv(table)?)
}

pub fn save_ranking_json(table: &RankingTable, path: &Path) -> Result<()> {
    write_file(path, &ranking_to_json(table)?)
}

/// Save the full artifact set for one chart run.
///
/// Creates `{symbol}_{timestamp}/` under `output_dir` with `chart.json`,
/// `prices.csv` and `frames.csv`. Returns the created directory.
pub fn save_chart_artifacts(report: &ChartReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.symbol,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_file(&run_dir.join("chart.json"), &chart_to_json(report)?)?;
    write_file(&run_dir.join("prices.csv"), &prices_to_csv(&report.prices)?)?;
    write_file(&run_dir.join("frames.csv"), &frames_to_csv(&report.frames)?)?;

    Ok(run_dir)
}
