//! CryptoCompare provider.
//!
//! Serves two roles:
//! - Spot USD price via `data/price` (no market stats)
//! - Historical OHLCV bars via `data/v2/histominute|histohour|histoday`, with the
//!   `aggregate` parameter turning native bars into coarser ones
//!
//! Failed requests come back as HTTP 200 with `"Response": "Error"`; those are reported
//! as malformed responses carrying the upstream message.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{BarUnit, Candle, Instrument, Interval, ProviderPrice};
use crate::provider::http::{build_client, decode, get_text, positive_price};
use crate::provider::{CandleProvider, MarketDataProvider, PriceProvider, ProviderId};

const PROVIDER_ID: ProviderId = ProviderId::CryptoCompare;

const BASE_URL: &str = "https://min-api.cryptocompare.com";

/// Largest `limit` the histo endpoints accept.
pub const MAX_HISTO_LIMIT: usize = 2000;

/// Error envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpotPrice {
    #[serde(rename = "USD")]
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HistoResponse {
    #[serde(rename = "Data")]
    data: HistoData,
}

#[derive(Debug, Deserialize)]
struct HistoData {
    #[serde(rename = "Data", default)]
    bars: Vec<HistoBar>,
}

#[derive(Debug, Deserialize)]
struct HistoBar {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    /// Volume in the base asset.
    volumefrom: f64,
}

pub struct CryptoCompareProvider {
    quote_client: Client,
    history_client: Client,
    base_url: String,
}

impl CryptoCompareProvider {
    pub fn new(config: &MarketDataConfig) -> Self {
        Self {
            quote_client: build_client(config.quote_timeout(), &config.user_agent),
            history_client: build_client(config.history_timeout(), &config.user_agent),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn price_url(&self, symbol: &str) -> String {
        format!(
            "{}/data/price?fsym={}&tsyms=USD",
            self.base_url,
            urlencoding::encode(symbol)
        )
    }

    fn histo_url(&self, symbol: &str, interval: Interval, limit: usize) -> String {
        let spec = interval.bar_spec();
        format!(
            "{}/data/v2/{}?fsym={}&tsym=USD&limit={}&aggregate={}",
            self.base_url,
            histo_endpoint(spec.unit),
            urlencoding::encode(symbol),
            limit.clamp(1, MAX_HISTO_LIMIT),
            spec.aggregate
        )
    }
}

fn histo_endpoint(unit: BarUnit) -> &'static str {
    match unit {
        BarUnit::Minute => "histominute",
        BarUnit::Hour => "histohour",
        BarUnit::Day => "histoday",
    }
}

fn check_envelope(body: &str) -> Result<(), MarketDataError> {
    // Bodies that are not objects fall through to the typed decode and fail there.
    if let Ok(envelope) = serde_json::from_str::<Envelope>(body) {
        if envelope.response.as_deref() == Some("Error") {
            let message = envelope
                .message
                .unwrap_or_else(|| "unspecified error".to_string());
            return Err(MarketDataError::malformed(PROVIDER_ID, message));
        }
    }
    Ok(())
}

/// Parse a `data/price` response (`{"USD": 67000.1}`).
pub fn parse_spot_price(body: &str) -> Result<ProviderPrice, MarketDataError> {
    check_envelope(body)?;
    let response: SpotPrice = decode(PROVIDER_ID, body)?;
    let price = response
        .usd
        .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, "missing 'USD' price"))?;
    Ok(ProviderPrice::new(
        PROVIDER_ID,
        positive_price(PROVIDER_ID, price)?,
    ))
}

/// Parse a `data/v2/histo*` response into candles, ascending by time.
///
/// All-zero padding bars (periods before the asset traded) are dropped. An empty result
/// is not an error.
pub fn parse_histo(body: &str) -> Result<Vec<Candle>, MarketDataError> {
    check_envelope(body)?;
    let response: HistoResponse = decode(PROVIDER_ID, body)?;

    let mut candles = Vec::with_capacity(response.data.bars.len());
    for bar in response.data.bars {
        if bar.open == 0.0 && bar.high == 0.0 && bar.low == 0.0 && bar.close == 0.0 {
            continue;
        }
        candles.push(Candle {
            timestamp: bar_time(bar.time)?,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volumefrom,
        });
    }
    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

fn bar_time(secs: i64) -> Result<DateTime<Utc>, MarketDataError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, format!("invalid bar time {}", secs)))
}

impl MarketDataProvider for CryptoCompareProvider {
    fn id(&self) -> ProviderId {
        PROVIDER_ID
    }
}

#[async_trait]
impl PriceProvider for CryptoCompareProvider {
    async fn fetch_price(&self, instrument: &Instrument) -> Result<ProviderPrice, MarketDataError> {
        let symbol = self.provider_symbol(instrument)?;
        let body = get_text(&self.quote_client, PROVIDER_ID, &self.price_url(symbol)).await?;
        parse_spot_price(&body)
    }
}

#[async_trait]
impl CandleProvider for CryptoCompareProvider {
    async fn fetch_candles(
        &self,
        instrument: &Instrument,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let symbol = self.provider_symbol(instrument)?;
        let url = self.histo_url(symbol, interval, limit);
        let body = get_text(&self.history_client, PROVIDER_ID, &url).await?;

        let mut candles = parse_histo(&body)?;
        // The endpoint returns limit + 1 bars.
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        debug!(
            "{} returned {} {} bars for {}",
            PROVIDER_ID,
            candles.len(),
            interval,
            instrument.symbol
        );
        Ok(candles)
    }
}
