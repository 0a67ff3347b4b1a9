//! Aurora Market Data Crate
//!
//! Live and historical crypto price data from several independent providers, reconciled
//! into one quote and one OHLCV series per instrument and cached to bound upstream
//! traffic.
//!
//! # Overview
//!
//! - Three live price providers (CoinGecko, CryptoCompare, Kraken) queried concurrently;
//!   the quote is the mean of whichever answered
//! - Historical bars from CryptoCompare, cached per (instrument, interval) and windowed
//!   per timeframe
//! - Time-based caching with independent TTLs for quotes, market stats and series
//! - Indicator computation over the fetched series via `aurora-indicators`
//!
//! # Architecture
//!
//! ```text
//! +---------------------+
//! |  MarketDataService  |  (symbol -> instrument, snapshot)
//! +---------------------+
//!        |          |
//!        v          v
//! +-----------+  +---------------+
//! |   Quote   |  |    Series     |
//! | Aggregator|  |    Fetcher    |
//! +-----------+  +---------------+
//!   |   TtlCache     |   TtlCache
//!   v                v
//! +------------------------------+
//! | PriceProvider / CandleProvider|  (CoinGecko, CryptoCompare, Kraken)
//! +------------------------------+
//! ```
//!
//! # Failure model
//!
//! Individual provider failures never reach the caller of
//! [`MarketDataService::get_quote`]: they are logged and the price is `None` only when
//! every provider failed. Series failures have no fallback source and are returned as
//! [`MarketDataError`].

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod service;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use config::MarketDataConfig;
pub use errors::MarketDataError;
pub use models::{
    BarSpec, BarUnit, Candle, DisplayPrice, Instrument, Interval, LastKnownPrice, MarketStats,
    ProviderPrice, ProviderSymbols, Quote, Series, SeriesColumns, Timeframe,
};
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::cryptocompare::CryptoCompareProvider;
pub use provider::kraken::KrakenProvider;
pub use provider::{CandleProvider, MarketDataProvider, PriceProvider, ProviderId};
pub use registry::InstrumentRegistry;
pub use service::{
    consensus_price, IndicatorResult, MarketDataService, MarketSnapshot, QuoteAggregator,
    SeriesFetcher,
};

pub use aurora_indicators as indicators;
