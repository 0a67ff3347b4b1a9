//! Kraken public ticker provider.
//!
//! The ticker result is keyed by Kraken's canonical pair name (`XXBTZUSD`), which is not
//! the name used in the request (`XBTUSD`), so the single result entry is taken as is.
//! Prices are strings; the last-trade price is `c[0]`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{Instrument, ProviderPrice};
use crate::provider::http::{build_client, decode, get_text, positive_price};
use crate::provider::{MarketDataProvider, PriceProvider, ProviderId};

const PROVIDER_ID: ProviderId = ProviderId::Kraken;

const BASE_URL: &str = "https://api.kraken.com";

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    error: Vec<String>,
    result: Option<BTreeMap<String, Ticker>>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    /// Last trade closed: `[price, lot volume]`.
    c: Vec<String>,
}

pub struct KrakenProvider {
    client: Client,
    base_url: String,
}

impl KrakenProvider {
    pub fn new(config: &MarketDataConfig) -> Self {
        Self {
            client: build_client(config.quote_timeout(), &config.user_agent),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn ticker_url(&self, pair: &str) -> String {
        format!(
            "{}/0/public/Ticker?pair={}",
            self.base_url,
            urlencoding::encode(pair)
        )
    }
}

/// Parse a `0/public/Ticker` response for `pair`.
///
/// An exact key match on `pair` wins; otherwise the first result entry is used.
pub fn parse_ticker(body: &str, pair: &str) -> Result<ProviderPrice, MarketDataError> {
    let response: TickerResponse = decode(PROVIDER_ID, body)?;
    if !response.error.is_empty() {
        return Err(MarketDataError::malformed(
            PROVIDER_ID,
            response.error.join("; "),
        ));
    }

    let mut result = response.result.unwrap_or_default();
    let ticker = match result.remove(pair) {
        Some(ticker) => ticker,
        None => result
            .into_values()
            .next()
            .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, "empty ticker result"))?,
    };

    let last = ticker
        .c
        .first()
        .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, "missing last trade price"))?;
    let price: f64 = last.parse().map_err(|_| {
        MarketDataError::malformed(PROVIDER_ID, format!("unparseable price '{}'", last))
    })?;

    Ok(ProviderPrice::new(
        PROVIDER_ID,
        positive_price(PROVIDER_ID, price)?,
    ))
}

impl MarketDataProvider for KrakenProvider {
    fn id(&self) -> ProviderId {
        PROVIDER_ID
    }
}

#[async_trait]
impl PriceProvider for KrakenProvider {
    async fn fetch_price(&self, instrument: &Instrument) -> Result<ProviderPrice, MarketDataError> {
        let pair = self.provider_symbol(instrument)?;
        let body = get_text(&self.client, PROVIDER_ID, &self.ticker_url(pair)).await?;
        parse_ticker(&body, pair)
    }
}
