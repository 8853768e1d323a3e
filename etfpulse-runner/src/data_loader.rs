//! Price loading for the runner.
//!
//! Resolves one symbol's price history with this fallback policy:
//! 1. If a fetcher is available → fetch from it
//! 2. If that yields nothing and `synthetic` is set → generate a synthetic walk (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only mode. Output produced from it is
//! tagged with `DataSource::Synthetic`.

use chrono::{DateTime, Utc};
use etfpulse_core::data::{DataError, DataSource, FetchRequest, PriceFetcher};
use etfpulse_core::domain::{PriceSample, PriceSeries};
use thiserror::Error;

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data available for '{symbol}'")]
    NoData { symbol: String },

    #[error("no fetcher configured for '{symbol}' (use --synthetic for synthetic data)")]
    Offline { symbol: String },

    #[error("fetch failed for '{symbol}': {source}")]
    Fetch {
        symbol: String,
        #[source]
        source: DataError,
    },
}

impl LoadError {
    pub fn symbol(&self) -> &str {
        match self {
            LoadError::NoData { symbol }
            | LoadError::Offline { symbol }
            | LoadError::Fetch { symbol, .. } => symbol,
        }
    }
}

/// Options controlling how prices are loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Generate a synthetic walk when the fetcher has nothing.
    pub synthetic: bool,
}

/// A loaded, non-empty price series with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    pub symbol: String,
    pub prices: PriceSeries,
    pub source: DataSource,
}

/// Load prices for `symbol`, applying the fallback policy.
///
/// An empty series is never returned: it is `LoadError::NoData` unless the
/// synthetic fallback is enabled.
pub fn load_prices(
    symbol: &str,
    fetcher: Option<&dyn PriceFetcher>,
    request: &FetchRequest,
    opts: &LoadOptions,
) -> Result<LoadedPrices, LoadError> {
    let fetched = match fetcher {
        Some(f) if f.is_available() => {
            tracing::debug!(symbol, provider = f.name(), "fetching prices");
            match f.fetch(symbol, request) {
                Ok(result) if !result.prices.is_empty() => {
                    return Ok(LoadedPrices {
                        symbol: symbol.to_string(),
                        prices: result.prices,
                        source: result.source,
                    })
                }
                Ok(_) => Err(LoadError::NoData {
                    symbol: symbol.to_string(),
                }),
                Err(source) => Err(LoadError::Fetch {
                    symbol: symbol.to_string(),
                    source,
                }),
            }
        }
        Some(_) => Err(LoadError::Fetch {
            symbol: symbol.to_string(),
            source: DataError::CircuitBreakerTripped,
        }),
        None => Err(LoadError::Offline {
            symbol: symbol.to_string(),
        }),
    };

    if opts.synthetic {
        tracing::warn!(symbol, "generating synthetic prices, output will be tagged as synthetic");
        return Ok(LoadedPrices {
            symbol: symbol.to_string(),
            prices: generate_synthetic_prices(symbol, request, Utc::now()),
            source: DataSource::Synthetic,
        });
    }

    fetched
}

/// Generate a synthetic price walk for testing/development.
///
/// One sample per interval step over the request's lookback, ending at `end`.
/// Deterministic per symbol: the seed is the BLAKE3 hash of the symbol name.
pub fn generate_synthetic_prices(
    symbol: &str,
    request: &FetchRequest,
    end: DateTime<Utc>,
) -> PriceSeries {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let step = request.interval.duration();
    let start = end - request.lookback();
    let mut samples = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let step_return: f64 = rng.gen_range(-0.01..0.01);
        price *= 1.0 + step_return;
        samples.push(PriceSample::new(current, price));
        current += step;
    }

    PriceSeries::canonicalize(samples)
}
