//! Entry point for the presentation layer.

use std::sync::Arc;

use aurora_indicators::{
    compute_indicator, percent_change, IndicatorError, IndicatorInput, IndicatorOutput,
    IndicatorSpec, Trend,
};
use log::warn;
use serde::Serialize;

use crate::cache::{Clock, SystemClock};
use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{Interval, Quote, Series, Timeframe};
use crate::provider::coingecko::CoinGeckoProvider;
use crate::provider::cryptocompare::CryptoCompareProvider;
use crate::provider::kraken::KrakenProvider;
use crate::provider::{CandleProvider, PriceProvider};
use crate::registry::InstrumentRegistry;

use super::quote_aggregator::QuoteAggregator;
use super::series_fetcher::SeriesFetcher;

/// One computed indicator in a [`MarketSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub spec: IndicatorSpec,
    /// Legend label, e.g. `RSI(14)`.
    pub label: String,
    pub output: IndicatorOutput,
}

/// Everything one refresh of a chart needs.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub quote: Quote,
    /// The windowed series; empty when the fetch failed or there is no data.
    pub series: Series,
    /// Why `series` is empty, if the fetch failed.
    pub series_error: Option<MarketDataError>,
    pub indicators: Vec<IndicatorResult>,
    /// First-to-last close change over the window, in percent.
    pub change_pct: Option<f64>,
    pub trend: Option<Trend>,
}

/// Quotes, series and indicators by internal symbol.
///
/// ```ignore
/// let service = MarketDataService::new(InstrumentRegistry::builtin(), &MarketDataConfig::default())?;
/// let quote = service.get_quote("BTC").await?;
/// let series = service.get_series("BTC", Interval::OneHour, Timeframe::OneDay).await?;
/// ```
pub struct MarketDataService {
    registry: InstrumentRegistry,
    quotes: QuoteAggregator,
    series: SeriesFetcher,
}

impl MarketDataService {
    /// Wire up the CoinGecko, CryptoCompare and Kraken clients.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Config`] if `config` fails validation.
    pub fn new(registry: InstrumentRegistry, config: &MarketDataConfig) -> Result<Self, MarketDataError> {
        Self::with_clock(registry, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        registry: InstrumentRegistry,
        config: &MarketDataConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, MarketDataError> {
        config.validate()?;

        let cryptocompare = Arc::new(CryptoCompareProvider::new(config));
        let price_providers: Vec<Arc<dyn PriceProvider>> = vec![
            Arc::new(CoinGeckoProvider::new(config)),
            cryptocompare.clone(),
            Arc::new(KrakenProvider::new(config)),
        ];
        let candle_provider: Arc<dyn CandleProvider> = cryptocompare;

        Ok(Self::from_parts(
            registry,
            QuoteAggregator::with_clock(price_providers, config, clock.clone()),
            SeriesFetcher::with_clock(candle_provider, config, clock),
        ))
    }

    /// Assemble a service from prebuilt components, e.g. with custom providers.
    pub fn from_parts(
        registry: InstrumentRegistry,
        quotes: QuoteAggregator,
        series: SeriesFetcher,
    ) -> Self {
        Self {
            registry,
            quotes,
            series,
        }
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    /// Consensus quote for `symbol`.
    ///
    /// Only an unknown symbol is an error; provider failures produce an absent price.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let instrument = self.registry.get(symbol)?;
        Ok(self.quotes.get_quote(&instrument).await)
    }

    /// Windowed series for `symbol`. Provider failures are returned as errors.
    pub async fn get_series(
        &self,
        symbol: &str,
        interval: Interval,
        timeframe: Timeframe,
    ) -> Result<Series, MarketDataError> {
        let instrument = self.registry.get(symbol)?;
        self.series.get_series(&instrument, interval, timeframe).await
    }

    /// Compute one indicator over caller-supplied columns.
    pub fn compute_indicator(
        spec: &IndicatorSpec,
        input: &IndicatorInput<'_>,
    ) -> Result<IndicatorOutput, IndicatorError> {
        compute_indicator(spec, input)
    }

    /// Quote, series and indicators for one chart refresh.
    ///
    /// The quote and series are fetched concurrently. A series failure is reported in
    /// [`MarketSnapshot::series_error`] alongside an empty series so the price can still
    /// be shown.
    pub async fn snapshot(
        &self,
        symbol: &str,
        interval: Interval,
        timeframe: Timeframe,
        indicators: &[IndicatorSpec],
    ) -> Result<MarketSnapshot, MarketDataError> {
        let instrument = self.registry.get(symbol)?;

        let (quote, series) = tokio::join!(
            self.quotes.get_quote(&instrument),
            self.series.get_series(&instrument, interval, timeframe)
        );

        let (series, series_error) = match series {
            Ok(series) => (series, None),
            Err(e) => {
                warn!("Series unavailable for {} {}: {}", symbol, interval, e);
                (Series::empty(symbol, interval), Some(e))
            }
        };

        let columns = series.columns();
        let input = columns.indicator_input();
        let indicators = indicators
            .iter()
            .filter_map(|spec| match compute_indicator(spec, &input) {
                Ok(output) => Some(IndicatorResult {
                    spec: *spec,
                    label: spec.label(),
                    output,
                }),
                Err(e) => {
                    warn!("Skipping {} for {}: {}", spec.label(), symbol, e);
                    None
                }
            })
            .collect();

        let change_pct = percent_change(&columns.closes);

        Ok(MarketSnapshot {
            quote,
            series,
            series_error,
            indicators,
            change_pct,
            trend: change_pct.map(Trend::of),
        })
    }

    /// Drop expired cache entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.quotes.purge_expired() + self.series.purge_expired()
    }
}
