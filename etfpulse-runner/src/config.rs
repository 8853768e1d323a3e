//! Serializable run configuration.
//!
//! Loaded from TOML. Every section and field has a default, so an empty file
//! (or no file at all) yields a working configuration.

use etfpulse_core::data::{CircuitBreaker, DataError, FetchRequest, Interval, YahooFetcher};
use etfpulse_core::indicators::{DEFAULT_NUM_BARS, SHORT_WINDOW};
use etfpulse_core::SeriesAssembler;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub indicators: IndicatorConfig,
    pub chart: ChartConfig,
    pub ranking: RankingConfig,
    pub symbols: SymbolsConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

/// Window lengths for the classifier and projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Rolling classifier window, in bars.
    pub num_bars: usize,
    /// Projector short window (K), in bars.
    pub short_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            num_bars: DEFAULT_NUM_BARS,
            short_window: SHORT_WINDOW,
        }
    }
}

/// Single-symbol chart mode fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub lookback_days: u32,
    pub interval: Interval,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            lookback_days: 182,
            interval: Interval::OneHour,
        }
    }
}

/// Batch ranking mode fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub lookback_days: u32,
    pub interval: Interval,
    /// Fan symbols out across a rayon pool instead of walking them in order.
    pub parallel: bool,
    /// Worker cap when `parallel` is set; 0 uses rayon's global pool.
    pub threads: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            lookback_days: 10,
            interval: Interval::OneHour,
            parallel: false,
            threads: 0,
        }
    }
}

/// Yahoo fetcher retry and circuit breaker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after the first attempt; backoff doubles from `retry_delay_ms`.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Consecutive failures before the breaker opens.
    pub breaker_threshold: u32,
    pub breaker_cooldown_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 500,
            breaker_threshold: 3,
            breaker_cooldown_secs: 30 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// Newline-delimited ticker file, seeded with defaults when absent.
    pub file: PathBuf,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("etfs.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    /// Emit JSON log lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl PulseConfig {
    /// Load from a TOML file and validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            Some(p) => {
                tracing::debug!(path = %p.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse a TOML string and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("serialize config: {e}")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indicators.num_bars == 0 {
            return Err(ConfigError::Invalid("indicators.num_bars must be >= 1".into()));
        }
        if self.indicators.short_window == 0 {
            return Err(ConfigError::Invalid(
                "indicators.short_window must be >= 1".into(),
            ));
        }
        if self.chart.lookback_days == 0 || self.ranking.lookback_days == 0 {
            return Err(ConfigError::Invalid("lookback_days must be >= 1".into()));
        }
        Ok(())
    }

    /// Assembler built from the indicator windows.
    pub fn assembler(&self) -> SeriesAssembler {
        SeriesAssembler::new(self.indicators.num_bars, self.indicators.short_window)
    }

    pub fn chart_request(&self) -> FetchRequest {
        FetchRequest::new(self.chart.lookback_days, self.chart.interval)
    }

    pub fn ranking_request(&self) -> FetchRequest {
        FetchRequest::new(self.ranking.lookback_days, self.ranking.interval)
    }

    /// Yahoo fetcher with its own circuit breaker, built from `[fetch]`.
    pub fn yahoo_fetcher(&self) -> Result<YahooFetcher, DataError> {
        let breaker = CircuitBreaker::new(
            Duration::from_secs(self.fetch.breaker_cooldown_secs),
            self.fetch.breaker_threshold,
        );
        Ok(YahooFetcher::new(Arc::new(breaker))?.with_retries(
            self.fetch.max_retries,
            Duration::from_millis(self.fetch.retry_delay_ms),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = PulseConfig::from_toml("").unwrap();
        assert_eq!(config, PulseConfig::default());
        assert_eq!(config.indicators.num_bars, 100);
        assert_eq!(config.indicators.short_window, 5);
        assert_eq!(config.chart.interval, Interval::OneHour);
        assert_eq!(config.ranking.lookback_days, 10);
        assert!(!config.ranking.parallel);
        assert_eq!(config.symbols.file, PathBuf::from("etfs.txt"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PulseConfig::from_toml(
            r#"
[indicators]
num_bars = 50

[ranking]
interval = "15m"
parallel = true
"#,
        )
        .unwrap();
        assert_eq!(config.indicators.num_bars, 50);
        assert_eq!(config.indicators.short_window, 5);
        assert_eq!(config.ranking.interval, Interval::FifteenMinutes);
        assert!(config.ranking.parallel);
        assert_eq!(config.ranking.lookback_days, 10);
    }

    #[test]
    fn rejects_zero_windows() {
        let err = PulseConfig::from_toml("[indicators]\nnum_bars = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = PulseConfig::from_toml("[indicators]\nshort_window = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_interval() {
        let err = PulseConfig::from_toml("[chart]\ninterval = \"2h\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = PulseConfig::default();
        config.logging.json = true;
        config.ranking.threads = 4;
        let parsed = PulseConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn requests_follow_sections() {
        let config = PulseConfig::default();
        assert_eq!(config.chart_request(), FetchRequest::new(182, Interval::OneHour));
        assert_eq!(config.ranking_request(), FetchRequest::new(10, Interval::OneHour));
        assert_eq!(config.assembler().warmup(), 100);
    }

    #[test]
    fn interval_alias_accepted_in_toml() {
        let config = PulseConfig::from_toml("[chart]\ninterval = \"60m\"\n").unwrap();
        assert_eq!(config.chart.interval, Interval::OneHour);
    }

    #[test]
    fn fetch_section_configures_fetcher() {
        let config = PulseConfig::from_toml(
            r#"
[fetch]
max_retries = 1
retry_delay_ms = 20
"#,
        )
        .unwrap();
        assert_eq!(config.fetch.breaker_threshold, 3);
        let fetcher = config.yahoo_fetcher().unwrap();
        assert_eq!(fetcher.max_retries(), 1);
        assert_eq!(fetcher.base_delay(), Duration::from_millis(20));

        let defaults = PulseConfig::default().yahoo_fetcher().unwrap();
        assert_eq!(defaults.max_retries(), 3);
        assert_eq!(defaults.base_delay(), Duration::from_millis(500));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PulseConfig::load_or_default(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, PulseConfig::default());
    }
}
