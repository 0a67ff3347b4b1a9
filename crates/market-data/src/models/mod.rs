//! Market data models
//!
//! - `instrument` - Tracked assets and their per-provider identifiers
//! - `quote` - Provider prices, consensus quotes and the last-known-price tracker
//! - `candle` - OHLCV bars and ordered series
//! - `interval` - Candle granularity and its upstream bar mapping
//! - `timeframe` - Lookback windows over a series

mod candle;
mod instrument;
mod interval;
mod quote;
mod timeframe;

pub use candle::{Candle, Series, SeriesColumns};
pub use instrument::{Instrument, ProviderSymbols};
pub use interval::{BarSpec, BarUnit, Interval, ParseIntervalError};
pub use quote::{DisplayPrice, LastKnownPrice, MarketStats, ProviderPrice, Quote};
pub use timeframe::{ParseTimeframeError, Timeframe};
