//! Series fetching, timeframe windows and market snapshots against in-process providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use aurora_market_data::indicators::{IndicatorSpec, Trend};
use aurora_market_data::{
    Candle, CandleProvider, Instrument, InstrumentRegistry, Interval, ManualClock,
    MarketDataConfig, MarketDataError, MarketDataProvider, MarketDataService, PriceProvider,
    ProviderId, ProviderPrice, QuoteAggregator, Series, SeriesFetcher, Timeframe,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Daily closes starting at 100 and rising 1% per bar.
fn rising_daily(count: usize) -> Vec<Candle> {
    let mut close = 100.0;
    (0..count)
        .map(|day| {
            let open = close;
            close *= 1.01;
            Candle {
                timestamp: start() + Duration::days(day as i64),
                open,
                high: close,
                low: open,
                close,
                volume: 1_000.0 + day as f64,
            }
        })
        .collect()
}

struct FakeCandles {
    candles: Option<Vec<Candle>>,
    calls: AtomicUsize,
}

impl FakeCandles {
    fn serving(candles: Vec<Candle>) -> Arc<Self> {
        Arc::new(Self {
            candles: Some(candles),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            candles: None,
            calls: AtomicUsize::new(0),
        })
    }
}

impl MarketDataProvider for FakeCandles {
    fn id(&self) -> ProviderId {
        ProviderId::CryptoCompare
    }
}

#[async_trait]
impl CandleProvider for FakeCandles {
    async fn fetch_candles(
        &self,
        instrument: &Instrument,
        _interval: Interval,
        _limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.provider_symbol(instrument)?;
        self.candles.clone().ok_or(MarketDataError::Timeout {
            provider: ProviderId::CryptoCompare,
        })
    }
}

struct FixedPrice(ProviderId, f64);

impl MarketDataProvider for FixedPrice {
    fn id(&self) -> ProviderId {
        self.0
    }
}

#[async_trait]
impl PriceProvider for FixedPrice {
    async fn fetch_price(&self, _instrument: &Instrument) -> Result<ProviderPrice, MarketDataError> {
        Ok(ProviderPrice::new(self.0, self.1))
    }
}

fn service(candles: Arc<FakeCandles>) -> MarketDataService {
    let config = MarketDataConfig::default();
    let clock = Arc::new(ManualClock::new(start()));
    let prices: Vec<Arc<dyn PriceProvider>> = vec![
        Arc::new(FixedPrice(ProviderId::CoinGecko, 130.0)),
        Arc::new(FixedPrice(ProviderId::Kraken, 134.0)),
    ];

    MarketDataService::from_parts(
        InstrumentRegistry::builtin(),
        QuoteAggregator::with_clock(prices, &config, clock.clone()),
        SeriesFetcher::with_clock(candles, &config, clock),
    )
}

#[tokio::test]
async fn test_series_is_fetched_once_within_ttl() {
    let candles = FakeCandles::serving(rising_daily(30));
    let service = service(candles.clone());

    let first = service
        .get_series("BTC", Interval::OneDay, Timeframe::All)
        .await
        .unwrap();
    let second = service
        .get_series("BTC", Interval::OneDay, Timeframe::All)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(candles.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_week_is_suffix_of_all_history() {
    let service = service(FakeCandles::serving(rising_daily(30)));

    let all = service
        .get_series("ETH", Interval::OneDay, Timeframe::All)
        .await
        .unwrap();
    let week = service
        .get_series("ETH", Interval::OneDay, Timeframe::OneWeek)
        .await
        .unwrap();

    assert_eq!(week.len(), 8);
    assert_eq!(week.candles(), &all.candles()[all.len() - week.len()..]);
}

#[tokio::test]
async fn test_empty_upstream_is_empty_series() {
    let service = service(FakeCandles::serving(Vec::new()));
    let series = service
        .get_series("SOL", Interval::OneHour, Timeframe::OneDay)
        .await
        .unwrap();
    assert!(series.is_empty());
}

#[tokio::test]
async fn test_unknown_symbol_is_an_error() {
    let service = service(FakeCandles::serving(Vec::new()));
    let err = service.get_quote("NOPE").await.unwrap_err();
    assert_eq!(err, MarketDataError::UnknownInstrument("NOPE".to_string()));
}

#[tokio::test]
async fn test_snapshot_thirty_rising_days() {
    let candles = rising_daily(30);
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let service = service(FakeCandles::serving(candles));

    let snapshot = service
        .snapshot(
            "BTC",
            Interval::OneDay,
            Timeframe::All,
            &[
                IndicatorSpec::Sma { period: 14 },
                IndicatorSpec::Rsi { period: 14 },
                IndicatorSpec::Ema {
                    period: 20,
                    seed: Default::default(),
                },
                IndicatorSpec::VolumeSma { period: 5 },
            ],
        )
        .await
        .unwrap();

    assert_eq!(snapshot.quote.price, Some(132.0));
    assert_eq!(snapshot.series.len(), 30);
    assert!(snapshot.series_error.is_none());
    assert_eq!(snapshot.trend, Some(Trend::Up));

    let labels: Vec<&str> = snapshot.indicators.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["SMA(14)", "RSI(14)", "EMA(20)", "VOL_SMA(5)"]);

    let sma = snapshot.indicators[0].output.primary();
    let expected_sma = closes[16..].iter().sum::<f64>() / 14.0;
    assert!((sma[29].unwrap() - expected_sma).abs() < 1e-9);

    let rsi = snapshot.indicators[1].output.primary();
    assert!(rsi[29].unwrap() > 99.0);

    let ema = snapshot.indicators[2].output.primary();
    assert!(ema[29].unwrap() < closes[29]);

    let change = snapshot.change_pct.unwrap();
    assert!((change - (closes[29] - closes[0]) / closes[0] * 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_snapshot_keeps_quote_when_series_fails() {
    let service = service(FakeCandles::failing());

    let snapshot = service
        .snapshot(
            "BTC",
            Interval::OneHour,
            Timeframe::OneDay,
            &[IndicatorSpec::default_macd()],
        )
        .await
        .unwrap();

    assert_eq!(snapshot.quote.price, Some(132.0));
    assert!(snapshot.series.is_empty());
    assert_eq!(
        snapshot.series_error.map(|e| e.code()),
        Some("provider-timeout")
    );
    assert_eq!(snapshot.change_pct, None);
    assert!(snapshot.indicators[0].output.is_empty());
}

fn arb_candles() -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec((0i64..400 * 24, 1.0f64..1_000.0), 0..200).prop_map(|bars| {
        bars.into_iter()
            .map(|(hour, close)| Candle {
                timestamp: start() + Duration::hours(hour),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_every_window_is_a_suffix_of_all(candles in arb_candles()) {
        let series = Series::new("BTC", Interval::OneHour, candles);
        let all = series.window(Timeframe::All);

        for timeframe in Timeframe::ALL {
            let window = series.window(timeframe);
            prop_assert!(window.len() <= all.len());
            prop_assert_eq!(window.candles(), &all.candles()[all.len() - window.len()..]);
        }
    }

    #[test]
    fn test_series_is_strictly_ascending(candles in arb_candles()) {
        let series = Series::new("BTC", Interval::OneHour, candles);
        for pair in series.candles().windows(2) {
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }
}
