//! Provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Candle, Instrument, Interval, ProviderPrice};

use super::ProviderId;

/// Common identity of every provider client.
pub trait MarketDataProvider: Send + Sync {
    /// Fixed identity attached to results and errors from this provider.
    fn id(&self) -> ProviderId;

    /// Whether this provider has an identifier for `instrument`.
    ///
    /// Unsupported instruments are skipped by the services, never called.
    fn supports(&self, instrument: &Instrument) -> bool {
        instrument.provider_symbol(self.id()).is_some()
    }

    /// The provider-specific identifier for `instrument`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::UnsupportedInstrument`] when the instrument has no
    /// identifier for this provider.
    fn provider_symbol<'a>(&self, instrument: &'a Instrument) -> Result<&'a str, MarketDataError> {
        instrument
            .provider_symbol(self.id())
            .ok_or_else(|| MarketDataError::UnsupportedInstrument {
                provider: self.id(),
                symbol: instrument.symbol.clone(),
            })
    }
}

/// A live USD spot price source.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use aurora_market_data::provider::{MarketDataProvider, PriceProvider, ProviderId};
///
/// struct FixedPrice(f64);
///
/// impl MarketDataProvider for FixedPrice {
///     fn id(&self) -> ProviderId {
///         ProviderId::Kraken
///     }
/// }
///
/// #[async_trait]
/// impl PriceProvider for FixedPrice {
///     async fn fetch_price(&self, instrument: &Instrument) -> Result<ProviderPrice, MarketDataError> {
///         Ok(ProviderPrice::new(self.id(), self.0))
///     }
/// }
/// ```
#[async_trait]
pub trait PriceProvider: MarketDataProvider {
    /// Fetch the current USD price for an instrument, with market stats when the
    /// provider supplies them.
    async fn fetch_price(&self, instrument: &Instrument) -> Result<ProviderPrice, MarketDataError>;
}

/// A historical OHLCV bar source.
#[async_trait]
pub trait CandleProvider: MarketDataProvider {
    /// Fetch up to `limit` of the most recent bars at `interval`, ordered ascending by
    /// timestamp.
    async fn fetch_candles(
        &self,
        instrument: &Instrument,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;
}
