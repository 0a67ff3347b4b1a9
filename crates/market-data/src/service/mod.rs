//! Services: quote aggregation, series fetching and the facade over both.

mod market_data_service;
mod quote_aggregator;
mod series_fetcher;

pub use market_data_service::{IndicatorResult, MarketDataService, MarketSnapshot};
pub use quote_aggregator::{consensus_price, QuoteAggregator};
pub use series_fetcher::SeriesFetcher;
