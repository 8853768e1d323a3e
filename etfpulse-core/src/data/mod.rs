//! Data sources: price fetchers and symbol lists.

pub mod circuit_breaker;
pub mod provider;
pub mod symbols;
pub mod yahoo;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use provider::{DataError, DataSource, FetchRequest, FetchResult, Interval, PriceFetcher};
pub use symbols::{SymbolList, SymbolListError, SymbolListFile, DEFAULT_ETFS};
pub use yahoo::YahooFetcher;
