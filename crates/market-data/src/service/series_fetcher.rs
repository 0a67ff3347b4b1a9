//! Historical series retrieval with caching and timeframe windowing.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{Instrument, Interval, Series, Timeframe};
use crate::provider::{CandleProvider, MarketDataProvider};

type SeriesKey = (String, Interval);

/// Fetches full-history series from a single candle provider.
///
/// The full series is cached per (symbol, interval); timeframe windows are cut from the
/// cached copy, so switching timeframes on the same interval never hits the network.
/// Provider failures are returned to the caller since there is no second source.
pub struct SeriesFetcher {
    provider: Arc<dyn CandleProvider>,
    cache: TtlCache<SeriesKey, Arc<Series>>,
    ttl: Duration,
    timeout: Duration,
    max_bars: usize,
}

impl SeriesFetcher {
    pub fn new(provider: Arc<dyn CandleProvider>, config: &MarketDataConfig) -> Self {
        Self::with_clock(provider, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        provider: Arc<dyn CandleProvider>,
        config: &MarketDataConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache: TtlCache::with_clock(clock),
            ttl: config.history_ttl(),
            timeout: config.history_timeout(),
            max_bars: config.max_bars,
        }
    }

    /// Bars for `instrument` at `interval`, limited to `timeframe`.
    ///
    /// An empty series means no data to show, not a failure.
    pub async fn get_series(
        &self,
        instrument: &Instrument,
        interval: Interval,
        timeframe: Timeframe,
    ) -> Result<Series, MarketDataError> {
        let full = self.full_series(instrument, interval).await?;
        Ok(full.window(timeframe))
    }

    /// The cached full-history series, fetching it on a miss.
    pub async fn full_series(
        &self,
        instrument: &Instrument,
        interval: Interval,
    ) -> Result<Arc<Series>, MarketDataError> {
        let key = (instrument.symbol.clone(), interval);
        if let Some(series) = self.cache.get(&key) {
            debug!("Series cache hit for {} {}", key.0, interval);
            return Ok(series);
        }

        let provider_id = self.provider.id();
        if !self.provider.supports(instrument) {
            debug!(
                "{} has no {} symbol, returning an empty series",
                instrument.symbol, provider_id
            );
            return Ok(Arc::new(Series::empty(instrument.symbol.clone(), interval)));
        }

        let candles = tokio::time::timeout(
            self.timeout,
            self.provider
                .fetch_candles(instrument, interval, self.max_bars),
        )
        .await
        .map_err(|_| MarketDataError::Timeout {
            provider: provider_id,
        })??;

        let series = Arc::new(Series::new(instrument.symbol.clone(), interval, candles));
        info!(
            "Fetched {} {} bars for {} from {}",
            series.len(),
            interval,
            instrument.symbol,
            provider_id
        );

        self.cache.put(key, series.clone(), self.ttl);
        Ok(series)
    }

    /// Drop expired series from the cache.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}
