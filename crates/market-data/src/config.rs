//! Tunables for caching, timeouts and history depth.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

const DEFAULT_USER_AGENT: &str = concat!("aurora-market-data/", env!("CARGO_PKG_VERSION"));

/// Market data configuration.
///
/// Every field has a default, so a partial JSON document such as
/// `{"quote_ttl_secs": 5}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// Freshness of a consensus quote.
    pub quote_ttl_secs: u64,
    /// Freshness of market stats (market cap, volume, 24h change).
    pub market_stats_ttl_secs: u64,
    /// Freshness of a fetched candle series.
    pub history_ttl_secs: u64,
    /// Per-call timeout for live price requests.
    pub quote_timeout_ms: u64,
    /// Per-call timeout for historical bar requests.
    pub history_timeout_ms: u64,
    /// Bars requested per series fetch.
    pub max_bars: usize,
    pub user_agent: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            quote_ttl_secs: 1,
            market_stats_ttl_secs: 60,
            history_ttl_secs: 300,
            quote_timeout_ms: 5_000,
            history_timeout_ms: 10_000,
            max_bars: 2_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl MarketDataConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, MarketDataError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MarketDataError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every fetch fail immediately.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.quote_timeout_ms == 0 {
            return Err(MarketDataError::Config(
                "quote_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.history_timeout_ms == 0 {
            return Err(MarketDataError::Config(
                "history_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_bars == 0 {
            return Err(MarketDataError::Config(
                "max_bars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn quote_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_ttl_secs)
    }

    pub fn market_stats_ttl(&self) -> Duration {
        Duration::from_secs(self.market_stats_ttl_secs)
    }

    pub fn history_ttl(&self) -> Duration {
        Duration::from_secs(self.history_ttl_secs)
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_millis(self.quote_timeout_ms)
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::from_millis(self.history_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarketDataConfig::default();
        assert_eq!(config.quote_ttl(), Duration::from_secs(1));
        assert_eq!(config.market_stats_ttl(), Duration::from_secs(60));
        assert_eq!(config.history_ttl(), Duration::from_secs(300));
        assert_eq!(config.quote_timeout(), Duration::from_secs(5));
        assert!(config.user_agent.starts_with("aurora-market-data/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MarketDataConfig::from_json_str(r#"{"quote_ttl_secs": 5}"#).unwrap();
        assert_eq!(config.quote_ttl_secs, 5);
        assert_eq!(config.history_ttl_secs, 300);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = MarketDataConfig::from_json_str(r#"{"quote_timeout_ms": 0}"#).unwrap_err();
        assert_eq!(err.code(), "config-error");
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = MarketDataConfig::from_json_str(r#"{"max_bars": "lots"}"#).unwrap_err();
        assert!(matches!(err, MarketDataError::Config(_)));
    }
}
