//! Domain types for ETF Pulse

pub mod frame;
pub mod price;
pub mod returns;

pub use frame::{
    Horizon, IndicatorFrame, Projection, SymbolSnapshot, WindowStats, SCALE_15M, SCALE_1D,
    SCALE_1H,
};
pub use price::{PriceSample, PriceSeries, SeriesError};
pub use returns::{ReturnPoint, ReturnSeries};
