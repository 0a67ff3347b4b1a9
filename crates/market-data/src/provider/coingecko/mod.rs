//! CoinGecko spot price provider.
//!
//! Uses the `simple/price` endpoint, which returns the USD price together with market
//! cap, 24h volume and 24h change. This is the only provider that supplies
//! [`MarketStats`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{Instrument, MarketStats, ProviderPrice};
use crate::provider::http::{build_client, decode, get_text, positive_price};
use crate::provider::{MarketDataProvider, PriceProvider, ProviderId};

const PROVIDER_ID: ProviderId = ProviderId::CoinGecko;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Per-coin entry of the `simple/price` response.
#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_market_cap: Option<f64>,
    usd_24h_vol: Option<f64>,
    usd_24h_change: Option<f64>,
}

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(config: &MarketDataConfig) -> Self {
        Self {
            client: build_client(config.quote_timeout(), &config.user_agent),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (a mirror or a test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn price_url(&self, coin_id: &str) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_market_cap=true&include_24hr_vol=true&include_24hr_change=true",
            self.base_url,
            urlencoding::encode(coin_id)
        )
    }
}

/// Parse a `simple/price` response for `coin_id`.
///
/// # Errors
///
/// Returns [`MarketDataError::MalformedResponse`] when the body is not JSON, the coin is
/// missing, or it carries no positive `usd` price.
pub fn parse_simple_price(body: &str, coin_id: &str) -> Result<ProviderPrice, MarketDataError> {
    let mut response: HashMap<String, SimplePrice> = decode(PROVIDER_ID, body)?;
    let entry = response.remove(coin_id).ok_or_else(|| {
        MarketDataError::malformed(PROVIDER_ID, format!("no entry for '{}'", coin_id))
    })?;

    let price = entry
        .usd
        .ok_or_else(|| MarketDataError::malformed(PROVIDER_ID, "missing 'usd' price"))?;

    let stats = MarketStats {
        market_cap: entry.usd_market_cap,
        volume_24h: entry.usd_24h_vol,
        change_24h_pct: entry.usd_24h_change,
    };

    Ok(ProviderPrice::new(PROVIDER_ID, positive_price(PROVIDER_ID, price)?).with_stats(stats))
}

impl MarketDataProvider for CoinGeckoProvider {
    fn id(&self) -> ProviderId {
        PROVIDER_ID
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn fetch_price(&self, instrument: &Instrument) -> Result<ProviderPrice, MarketDataError> {
        let coin_id = self.provider_symbol(instrument)?;
        let body = get_text(&self.client, PROVIDER_ID, &self.price_url(coin_id)).await?;
        parse_simple_price(&body, coin_id)
    }
}
