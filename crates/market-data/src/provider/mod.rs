//! Upstream provider clients.
//!
//! This module contains:
//! - The [`PriceProvider`] and [`CandleProvider`] traits the services call through
//! - [`ProviderId`], the fixed set of provider identities attached to every result
//! - Concrete HTTP clients for CoinGecko, CryptoCompare and Kraken
//!
//! Clients are stateless apart from their HTTP connection pool. Each call is a single
//! attempt: there are no retries inside a client, and a provider whose identifier is
//! missing for an instrument is rejected before any request is built.

mod http;
mod traits;

pub mod coingecko;
pub mod cryptocompare;
pub mod kraken;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use traits::{CandleProvider, MarketDataProvider, PriceProvider};

/// Identity of an upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderId {
    /// Spot price plus market cap, 24h volume and 24h change.
    CoinGecko,
    /// Spot price and historical OHLCV bars.
    CryptoCompare,
    /// Last-trade price from the public ticker.
    Kraken,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [Self::CoinGecko, Self::CryptoCompare, Self::Kraken];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CoinGecko => "COINGECKO",
            Self::CryptoCompare => "CRYPTOCOMPARE",
            Self::Kraken => "KRAKEN",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_serde_matches_display() {
        for id in ProviderId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id));
        }
    }
}
