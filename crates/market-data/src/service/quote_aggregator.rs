//! Multi-provider consensus quotes.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{Instrument, MarketStats, ProviderPrice, Quote};
use crate::provider::PriceProvider;

/// Unweighted mean of the successful prices, or `None` when there are none.
pub fn consensus_price(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

/// Fans a quote request out to every applicable provider and reduces the answers.
///
/// Each provider call is independent and bounded by its own timeout; a failed or slow
/// provider only removes its price from the mean. Market stats are cached separately
/// with a longer TTL so a short price outage does not drop them.
pub struct QuoteAggregator {
    providers: Vec<Arc<dyn PriceProvider>>,
    quotes: TtlCache<String, Quote>,
    stats: TtlCache<String, MarketStats>,
    clock: Arc<dyn Clock>,
    quote_ttl: Duration,
    stats_ttl: Duration,
    timeout: Duration,
}

impl QuoteAggregator {
    pub fn new(providers: Vec<Arc<dyn PriceProvider>>, config: &MarketDataConfig) -> Self {
        Self::with_clock(providers, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        providers: Vec<Arc<dyn PriceProvider>>,
        config: &MarketDataConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            providers,
            quotes: TtlCache::with_clock(clock.clone()),
            stats: TtlCache::with_clock(clock.clone()),
            clock,
            quote_ttl: config.quote_ttl(),
            stats_ttl: config.market_stats_ttl(),
            timeout: config.quote_timeout(),
        }
    }

    /// Current consensus quote for `instrument`.
    ///
    /// Never fails: when no provider answers, the quote's price is `None` and the caller
    /// should keep showing its last known price.
    pub async fn get_quote(&self, instrument: &Instrument) -> Quote {
        let key = instrument.symbol.clone();
        if let Some(quote) = self.quotes.get(&key) {
            debug!("Quote cache hit for {}", key);
            return quote;
        }

        let applicable: Vec<&Arc<dyn PriceProvider>> = self
            .providers
            .iter()
            .filter(|provider| {
                let supported = provider.supports(instrument);
                if !supported {
                    debug!("Skipping {} for {}: no provider symbol", provider.id(), key);
                }
                supported
            })
            .collect();

        if applicable.is_empty() {
            debug!("No providers configured for {}", key);
            return Quote::absent(key, self.clock.now());
        }

        let results = join_all(
            applicable
                .iter()
                .map(|provider| self.fetch_one(provider.as_ref(), instrument)),
        )
        .await;

        let mut successes: Vec<ProviderPrice> = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(price) => successes.push(price),
                Err(e) => warn!("Quote fetch failed for {} [{}]: {}", key, e.code(), e),
            }
        }

        let fresh_stats = successes.iter().find_map(|p| p.stats.clone());
        let stats = match fresh_stats {
            Some(stats) => {
                self.stats.put(key.clone(), stats.clone(), self.stats_ttl);
                Some(stats)
            }
            None => self.stats.get(&key),
        };

        let prices: Vec<f64> = successes.iter().map(|p| p.price).collect();
        let Some(price) = consensus_price(&prices) else {
            warn!(
                "{} for {} ({} tried)",
                MarketDataError::AllProvidersFailed,
                key,
                applicable.len()
            );
            return Quote {
                stats,
                ..Quote::absent(key, self.clock.now())
            };
        };

        let quote = Quote {
            symbol: key.clone(),
            price: Some(price),
            stats,
            sources: successes.iter().map(|p| p.provider).collect(),
            as_of: self.clock.now(),
        };
        debug!(
            "Consensus price for {}: {} from {}/{} providers",
            key,
            price,
            prices.len(),
            applicable.len()
        );

        self.quotes.put(key, quote.clone(), self.quote_ttl);
        quote
    }

    /// The cached quote for `symbol`, if still fresh.
    pub fn cached_quote(&self, symbol: &str) -> Option<Quote> {
        self.quotes.get(&symbol.to_string())
    }

    /// Drop expired quotes and stats; returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        self.quotes.purge_expired() + self.stats.purge_expired()
    }

    async fn fetch_one(
        &self,
        provider: &dyn PriceProvider,
        instrument: &Instrument,
    ) -> Result<ProviderPrice, MarketDataError> {
        match tokio::time::timeout(self.timeout, provider.fetch_price(instrument)).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                provider: provider.id(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::provider::{MarketDataProvider, ProviderId};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        id: ProviderId,
        result: Result<ProviderPrice, MarketDataError>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn ok(id: ProviderId, price: f64) -> Arc<Self> {
            Self::with(id, Ok(ProviderPrice::new(id, price)))
        }

        fn failing(id: ProviderId) -> Arc<Self> {
            Self::with(id, Err(MarketDataError::Http {
                provider: id,
                status: Some(500),
            }))
        }

        fn with(id: ProviderId, result: Result<ProviderPrice, MarketDataError>) -> Arc<Self> {
            Arc::new(Self {
                id,
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl MarketDataProvider for StubProvider {
        fn id(&self) -> ProviderId {
            self.id
        }
    }

    #[async_trait]
    impl PriceProvider for StubProvider {
        async fn fetch_price(
            &self,
            _instrument: &Instrument,
        ) -> Result<ProviderPrice, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn btc() -> Instrument {
        Instrument::new("BTC", "Bitcoin")
            .with_coingecko("bitcoin")
            .with_cryptocompare("BTC")
            .with_kraken("XBTUSD")
    }

    fn stats() -> MarketStats {
        MarketStats {
            market_cap: Some(1.0e12),
            volume_24h: Some(3.0e10),
            change_24h_pct: Some(2.5),
        }
    }

    #[test]
    fn test_consensus_price() {
        assert_eq!(consensus_price(&[]), None);
        assert_eq!(consensus_price(&[100.0, 102.0, 104.0]), Some(102.0));
    }

    #[tokio::test]
    async fn test_mean_of_successful_providers() {
        let aggregator = QuoteAggregator::new(
            vec![
                StubProvider::ok(ProviderId::CoinGecko, 100.0),
                StubProvider::failing(ProviderId::CryptoCompare),
                StubProvider::ok(ProviderId::Kraken, 110.0),
            ],
            &MarketDataConfig::default(),
        );

        let quote = aggregator.get_quote(&btc()).await;
        assert_eq!(quote.price, Some(105.0));
        assert_eq!(quote.sources, vec![ProviderId::CoinGecko, ProviderId::Kraken]);
    }

    #[tokio::test]
    async fn test_unsupported_providers_are_not_called() {
        let kraken = StubProvider::ok(ProviderId::Kraken, 1.0);
        let aggregator = QuoteAggregator::new(
            vec![StubProvider::ok(ProviderId::CoinGecko, 2.0), kraken.clone()],
            &MarketDataConfig::default(),
        );

        let instrument = Instrument::new("BNB", "BNB").with_coingecko("binancecoin");
        let quote = aggregator.get_quote(&instrument).await;

        assert_eq!(quote.price, Some(2.0));
        assert_eq!(kraken.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fresh_quote_served_from_cache() {
        let clock = Arc::new(ManualClock::default());
        let provider = StubProvider::ok(ProviderId::Kraken, 50.0);
        let aggregator = QuoteAggregator::with_clock(
            vec![provider.clone()],
            &MarketDataConfig::default(),
            clock.clone(),
        );

        aggregator.get_quote(&btc()).await;
        aggregator.get_quote(&btc()).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::seconds(1));
        aggregator.get_quote(&btc()).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_absent_quote_is_not_cached() {
        let provider = StubProvider::failing(ProviderId::Kraken);
        let aggregator =
            QuoteAggregator::new(vec![provider.clone()], &MarketDataConfig::default());

        assert!(aggregator.get_quote(&btc()).await.is_absent());
        assert!(aggregator.cached_quote("BTC").is_none());
        aggregator.get_quote(&btc()).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stats_outlive_price_ttl() {
        let clock = Arc::new(ManualClock::default());
        let coingecko = StubProvider::with(
            ProviderId::CoinGecko,
            Ok(ProviderPrice::new(ProviderId::CoinGecko, 100.0).with_stats(stats())),
        );
        let aggregator = QuoteAggregator::with_clock(
            vec![coingecko],
            &MarketDataConfig::default(),
            clock.clone(),
        );
        let first = aggregator.get_quote(&btc()).await;
        assert_eq!(first.stats, Some(stats()));

        // CoinGecko now down, Kraken up: price comes from Kraken, stats from cache.
        let later = QuoteAggregator::with_clock(
            vec![
                StubProvider::failing(ProviderId::CoinGecko),
                StubProvider::ok(ProviderId::Kraken, 101.0),
            ],
            &MarketDataConfig::default(),
            clock.clone(),
        );
        later.stats.put("BTC".to_string(), stats(), Duration::from_secs(60));
        clock.advance(chrono::Duration::seconds(30));

        let quote = later.get_quote(&btc()).await;
        assert_eq!(quote.price, Some(101.0));
        assert_eq!(quote.stats, Some(stats()));

        clock.advance(chrono::Duration::seconds(31));
        let quote = later.get_quote(&btc()).await;
        assert_eq!(quote.stats, None);
    }

    #[tokio::test]
    async fn test_no_providers_is_absent() {
        let aggregator = QuoteAggregator::new(Vec::new(), &MarketDataConfig::default());
        let quote = aggregator.get_quote(&btc()).await;
        assert!(quote.is_absent());
        assert!(quote.sources.is_empty());
    }
}
