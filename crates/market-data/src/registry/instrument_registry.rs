//! Static instrument table.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::errors::MarketDataError;
use crate::models::Instrument;

/// `(symbol, name, category, coingecko id, cryptocompare symbol, kraken pair)`
const BUILTIN: &[(&str, &str, &str, &str, &str, Option<&str>)] = &[
    ("BTC", "Bitcoin", "layer1", "bitcoin", "BTC", Some("XBTUSD")),
    ("ETH", "Ethereum", "layer1", "ethereum", "ETH", Some("ETHUSD")),
    ("SOL", "Solana", "layer1", "solana", "SOL", Some("SOLUSD")),
    ("XRP", "XRP", "payments", "ripple", "XRP", Some("XRPUSD")),
    ("ADA", "Cardano", "layer1", "cardano", "ADA", Some("ADAUSD")),
    ("AVAX", "Avalanche", "layer1", "avalanche-2", "AVAX", Some("AVAXUSD")),
    ("DOT", "Polkadot", "layer0", "polkadot", "DOT", Some("DOTUSD")),
    ("LINK", "Chainlink", "oracle", "chainlink", "LINK", Some("LINKUSD")),
    ("LTC", "Litecoin", "payments", "litecoin", "LTC", Some("LTCUSD")),
    ("DOGE", "Dogecoin", "meme", "dogecoin", "DOGE", Some("XDGUSD")),
    ("SHIB", "Shiba Inu", "meme", "shiba-inu", "SHIB", Some("SHIBUSD")),
    ("BNB", "BNB", "exchange", "binancecoin", "BNB", None),
];

/// Lookup table from internal symbol to [`Instrument`].
///
/// Symbols are unique. Iteration follows registration order.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    instruments: Vec<Arc<Instrument>>,
    by_symbol: HashMap<String, usize>,
}

impl InstrumentRegistry {
    /// Build a registry, validating every instrument.
    ///
    /// # Errors
    ///
    /// [`MarketDataError::InvalidInstrument`] for an empty or padded symbol and
    /// [`MarketDataError::DuplicateInstrument`] when a symbol appears twice.
    pub fn new(instruments: impl IntoIterator<Item = Instrument>) -> Result<Self, MarketDataError> {
        let mut registry = Self::default();
        for instrument in instruments {
            instrument.validate()?;
            if registry.by_symbol.contains_key(&instrument.symbol) {
                return Err(MarketDataError::DuplicateInstrument(instrument.symbol));
            }
            registry
                .by_symbol
                .insert(instrument.symbol.clone(), registry.instruments.len());
            registry.instruments.push(Arc::new(instrument));
        }
        debug!("Instrument registry loaded with {} instruments", registry.len());
        Ok(registry)
    }

    /// The built-in table of major crypto assets.
    pub fn builtin() -> Self {
        let instruments = BUILTIN
            .iter()
            .map(|(symbol, name, category, coingecko, cryptocompare, kraken)| {
                let instrument = Instrument::new(*symbol, *name)
                    .with_category(*category)
                    .with_coingecko(*coingecko)
                    .with_cryptocompare(*cryptocompare);
                match kraken {
                    Some(pair) => instrument.with_kraken(*pair),
                    None => instrument,
                }
            });

        // The table is a constant with unique, non-empty symbols.
        Self::new(instruments).unwrap_or_default()
    }

    /// Load a JSON array of instruments.
    pub fn from_json_str(json: &str) -> Result<Self, MarketDataError> {
        let instruments: Vec<Instrument> = serde_json::from_str(json)
            .map_err(|e| MarketDataError::InvalidInstrument(e.to_string()))?;
        Self::new(instruments)
    }

    /// Look up an instrument by internal symbol.
    pub fn get(&self, symbol: &str) -> Result<Arc<Instrument>, MarketDataError> {
        self.by_symbol
            .get(symbol)
            .map(|index| self.instruments[*index].clone())
            .ok_or_else(|| MarketDataError::UnknownInstrument(symbol.to_string()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Instrument>> {
        self.instruments.iter()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.instruments.iter().map(|i| i.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
