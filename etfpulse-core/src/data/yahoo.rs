//! Yahoo Finance price fetcher.
//!
//! Fetches close prices from Yahoo's v8 chart API at the requested interval.
//! Handles rate limiting, retries with exponential backoff, response parsing,
//! and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; a format change surfaces as `DataError::ResponseFormatChanged`
//! and the symbol is skipped by the runner.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataSource, FetchRequest, FetchResult, PriceFetcher};
use crate::domain::{PriceSample, PriceSeries};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

pub struct YahooFetcher {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooFetcher {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Build the chart API URL for a symbol, ending at `now`.
    ///
    /// The symbol is pushed as a single percent-encoded path segment.
    fn chart_url(
        symbol: &str,
        request: &FetchRequest,
        now: DateTime<Utc>,
    ) -> Result<reqwest::Url, DataError> {
        let mut url = reqwest::Url::parse(BASE_URL)
            .map_err(|e| DataError::Other(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DataError::Other("base URL cannot take path segments".into()))?
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("period1", &(now - request.lookback()).timestamp().to_string())
            .append_pair("period2", &now.timestamp().to_string())
            .append_pair("interval", request.interval.as_str());
        Ok(url)
    }

    fn breaker_open(&self, symbol: &str) -> DataError {
        tracing::warn!(
            symbol,
            cooldown_secs = self.circuit_breaker.remaining_cooldown().as_secs(),
            "circuit breaker open, request not sent"
        );
        DataError::CircuitBreakerTripped
    }

    /// Parse the chart API response into a canonical price series.
    ///
    /// Rows without a close are dropped. A valid response with no rows is an
    /// empty series, not an error.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<PriceSeries, DataError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (Some(result), _) => result,
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            (None, Some(err)) => {
                return Err(DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => {
                return Err(DataError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // No timestamps: the symbol exists but has no samples in range.
        let Some(timestamps) = data.timestamp else {
            return Ok(PriceSeries::empty());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut samples = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };
            let timestamp = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
            })?;
            samples.push(PriceSample::new(timestamp, close));
        }

        Ok(PriceSeries::canonicalize(samples))
    }

    /// Execute the HTTP request with retry and circuit breaker logic.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        request: &FetchRequest,
    ) -> Result<PriceSeries, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(self.breaker_open(symbol));
        }

        let url = Self::chart_url(symbol, request, Utc::now())?;
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying fetch");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(self.breaker_open(symbol));
            }

            let resp = match self.client.get(url.clone()).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let chart: ChartResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol}: {e}"
                ))
            })?;

            let prices = Self::parse_response(symbol, chart)?;
            self.circuit_breaker.record_success();
            return Ok(prices);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl PriceFetcher for YahooFetcher {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, request: &FetchRequest) -> Result<FetchResult, DataError> {
        let prices = self.fetch_with_retry(symbol, request)?;
        tracing::debug!(symbol, samples = prices.len(), interval = %request.interval, "fetched prices");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            prices,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::Interval;

    fn parse(symbol: &str, json: &str) -> Result<PriceSeries, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooFetcher::parse_response(symbol, resp)
    }

    #[test]
    fn chart_url_spans_lookback() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let url =
            YahooFetcher::chart_url("SPY", &FetchRequest::new(10, Interval::OneHour), now).unwrap();
        assert_eq!(
            url.as_str(),
            "https://query2.finance.yahoo.com/v8/finance/chart/SPY\
             ?period1=1699136000&period2=1700000000&interval=1h"
        );
    }

    #[test]
    fn chart_url_encodes_symbol_as_one_segment() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let request = FetchRequest::new(1, Interval::OneDay);

        let url = YahooFetcher::chart_url("BRK/B", &request, now).unwrap();
        assert!(url.path().ends_with("/chart/BRK%2FB"), "{url}");
        assert_eq!(url.query_pairs().count(), 3);

        let url = YahooFetcher::chart_url("A?B#C", &request, now).unwrap();
        assert!(url.path().ends_with("/chart/A%3FB%23C"), "{url}");
        assert_eq!(url.fragment(), None);
        let interval = url.query_pairs().find(|(k, _)| k == "interval").unwrap().1;
        assert_eq!(interval, "1d");
    }

    #[test]
    fn with_retries_overrides_defaults() {
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(1), 1));
        let fetcher = YahooFetcher::new(breaker).unwrap();
        assert_eq!(fetcher.max_retries(), 3);
        let fetcher = fetcher.with_retries(0, Duration::from_millis(10));
        assert_eq!(fetcher.max_retries(), 0);
        assert_eq!(fetcher.base_delay(), Duration::from_millis(10));
    }

    #[test]
    fn open_breaker_blocks_fetch_without_network() {
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(600), 1));
        breaker.trip();
        let fetcher = YahooFetcher::new(Arc::clone(&breaker)).unwrap();
        assert!(!fetcher.is_available());
        let err = fetcher
            .fetch("SPY", &FetchRequest::new(1, Interval::OneHour))
            .unwrap_err();
        assert!(matches!(err, DataError::CircuitBreakerTripped));
        assert!(breaker.remaining_cooldown() > Duration::ZERO);
    }

    #[test]
    fn parses_closes_and_skips_missing() {
        let json = r#"{"chart":{"result":[{
            "meta":{"symbol":"SPY"},
            "timestamp":[1700000000,1700003600,1700007200],
            "indicators":{"quote":[{"open":[1,2,3],"close":[450.5,null,451.25]}]}
        }],"error":null}}"#;
        let prices = parse("SPY", json).unwrap();
        let closes: Vec<f64> = prices.prices().collect();
        assert_eq!(closes, vec![450.5, 451.25]);
    }

    #[test]
    fn unordered_rows_are_canonicalized() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1700003600,1700000000,1700003600],
            "indicators":{"quote":[{"close":[2.0,1.0,3.0]}]}
        }],"error":null}}"#;
        let closes: Vec<f64> = parse("X", json).unwrap().prices().collect();
        assert_eq!(closes, vec![1.0, 3.0]);
    }

    #[test]
    fn missing_timestamps_is_empty_series() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse("SPY", json).unwrap().is_empty());
    }

    #[test]
    fn not_found_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,
            "error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(
            parse("NOPE", json),
            Err(DataError::SymbolNotFound { symbol }) if symbol == "NOPE"
        ));
    }

    #[test]
    fn other_error_is_format_change() {
        let json = r#"{"chart":{"result":null,
            "error":{"code":"Bad Request","description":"Invalid interval"}}}"#;
        assert!(matches!(
            parse("SPY", json),
            Err(DataError::ResponseFormatChanged(_))
        ));
    }
}
