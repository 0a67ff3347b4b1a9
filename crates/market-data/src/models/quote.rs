use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

/// Auxiliary market data supplied alongside a price by some providers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    /// 24h change in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h_pct: Option<f64>,
}

impl MarketStats {
    pub fn is_empty(&self) -> bool {
        self.market_cap.is_none() && self.volume_24h.is_none() && self.change_24h_pct.is_none()
    }
}

/// One provider's answer for a single instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderPrice {
    pub provider: ProviderId,
    /// USD price.
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<MarketStats>,
}

impl ProviderPrice {
    pub fn new(provider: ProviderId, price: f64) -> Self {
        Self {
            provider,
            price,
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: MarketStats) -> Self {
        self.stats = (!stats.is_empty()).then_some(stats);
        self
    }
}

/// Consensus quote for one instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,

    /// Mean of the prices from every provider that succeeded; `None` when all failed.
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<MarketStats>,

    /// Providers that contributed to `price`, in provider order.
    #[serde(default)]
    pub sources: Vec<ProviderId>,

    pub as_of: DateTime<Utc>,
}

impl Quote {
    /// A quote with no price.
    pub fn absent(symbol: impl Into<String>, as_of: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price: None,
            stats: None,
            sources: Vec::new(),
            as_of,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.price.is_none()
    }
}

/// Price to show for an instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayPrice {
    pub price: f64,
    pub as_of: DateTime<Utc>,
    /// `true` when the latest quote was absent and this is an earlier price.
    pub stale: bool,
}

/// Caller-side memory of the last good price per symbol.
///
/// Feed every quote through [`observe`](Self::observe); absent quotes fall back to the last
/// price seen for that symbol, flagged as stale.
#[derive(Debug, Default)]
pub struct LastKnownPrice {
    prices: HashMap<String, (f64, DateTime<Utc>)>,
}

impl LastKnownPrice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `quote` and return what should be displayed, or `None` when the symbol has
    /// never had a price.
    pub fn observe(&mut self, quote: &Quote) -> Option<DisplayPrice> {
        if let Some(price) = quote.price {
            self.prices
                .insert(quote.symbol.clone(), (price, quote.as_of));
            return Some(DisplayPrice {
                price,
                as_of: quote.as_of,
                stale: false,
            });
        }

        self.prices
            .get(&quote.symbol)
            .map(|(price, as_of)| DisplayPrice {
                price: *price,
                as_of: *as_of,
                stale: true,
            })
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).map(|(price, _)| *price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn quote(price: Option<f64>, secs: i64) -> Quote {
        Quote {
            price,
            ..Quote::absent("BTC", at(secs))
        }
    }

    #[test]
    fn test_last_known_price_falls_back_when_absent() {
        let mut last = LastKnownPrice::new();
        assert_eq!(last.observe(&quote(None, 0)), None);

        let shown = last.observe(&quote(Some(100.0), 10)).unwrap();
        assert_eq!(shown.price, 100.0);
        assert!(!shown.stale);

        let shown = last.observe(&quote(None, 20)).unwrap();
        assert_eq!(shown.price, 100.0);
        assert_eq!(shown.as_of, at(10));
        assert!(shown.stale);

        let shown = last.observe(&quote(Some(105.0), 30)).unwrap();
        assert_eq!(shown.price, 105.0);
        assert!(!shown.stale);
        assert_eq!(last.get("BTC"), Some(105.0));
    }

    #[test]
    fn test_empty_stats_are_dropped() {
        let price = ProviderPrice::new(ProviderId::CoinGecko, 1.0).with_stats(MarketStats::default());
        assert_eq!(price.stats, None);
    }
}
