use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;
use crate::provider::ProviderId;

/// Per-provider identifiers for one instrument.
///
/// A missing identifier means the provider is skipped for this instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSymbols {
    /// CoinGecko coin id, e.g. `bitcoin`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coingecko: Option<String>,
    /// CryptoCompare symbol, e.g. `BTC`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptocompare: Option<String>,
    /// Kraken pair, e.g. `XBTUSD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kraken: Option<String>,
}

impl ProviderSymbols {
    pub fn get(&self, provider: ProviderId) -> Option<&str> {
        let symbol = match provider {
            ProviderId::CoinGecko => &self.coingecko,
            ProviderId::CryptoCompare => &self.cryptocompare,
            ProviderId::Kraken => &self.kraken,
        };
        symbol.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// A tracked asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Internal symbol, unique across the registry.
    pub symbol: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form grouping, e.g. `layer1` or `meme`.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub provider_symbols: ProviderSymbols,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            category: String::new(),
            provider_symbols: ProviderSymbols::default(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_coingecko(mut self, id: impl Into<String>) -> Self {
        self.provider_symbols.coingecko = Some(id.into());
        self
    }

    pub fn with_cryptocompare(mut self, symbol: impl Into<String>) -> Self {
        self.provider_symbols.cryptocompare = Some(symbol.into());
        self
    }

    pub fn with_kraken(mut self, pair: impl Into<String>) -> Self {
        self.provider_symbols.kraken = Some(pair.into());
        self
    }

    /// Identifier used by `provider`, if the instrument is listed there.
    pub fn provider_symbol(&self, provider: ProviderId) -> Option<&str> {
        self.provider_symbols.get(provider)
    }

    /// Providers this instrument can be fetched from.
    pub fn providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.provider_symbol(*p).is_some())
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), MarketDataError> {
        if self.symbol.trim().is_empty() {
            return Err(MarketDataError::InvalidInstrument(
                "symbol must not be empty".to_string(),
            ));
        }
        if self.symbol.trim() != self.symbol {
            return Err(MarketDataError::InvalidInstrument(format!(
                "symbol '{}' has surrounding whitespace",
                self.symbol
            )));
        }
        Ok(())
    }
}
