//! ETF Pulse Core: return series, rolling classifier, short-horizon projector.
//!
//! This crate contains the pure computation and its data seams:
//! - Domain types (price series, return series, window stats, projections, frames)
//! - Return Series Builder (percentage change per step)
//! - Rolling Classifier (mean positive / mean negative return, rolling or snapshot)
//! - Short-Horizon Projector (scaled short-window mean per horizon)
//! - Series Assembler (per-timestamp frames, single-row ranking snapshots)
//! - Price fetcher trait with a Yahoo Finance implementation, symbol lists

pub mod assemble;
pub mod data;
pub mod domain;
pub mod indicator;
pub mod indicators;

pub use assemble::SeriesAssembler;
pub use indicator::Indicator;
