//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;

use crate::errors::MarketDataError;

use super::ProviderId;

/// Build a client with a fixed per-request timeout.
pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build HTTP client ({}), using defaults", e);
            Client::new()
        })
}

/// Issue one GET and return the response body.
///
/// Timeouts map to [`MarketDataError::Timeout`], transport failures and non-success
/// statuses to [`MarketDataError::Http`].
pub(crate) async fn get_text(
    client: &Client,
    provider: ProviderId,
    url: &str,
) -> Result<String, MarketDataError> {
    debug!("{} GET {}", provider, url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| request_error(provider, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MarketDataError::Http {
            provider,
            status: Some(status.as_u16()),
        });
    }

    response.text().await.map_err(|e| request_error(provider, &e))
}

fn request_error(provider: ProviderId, error: &reqwest::Error) -> MarketDataError {
    if error.is_timeout() {
        MarketDataError::Timeout { provider }
    } else {
        MarketDataError::Http {
            provider,
            status: error.status().map(|s| s.as_u16()),
        }
    }
}

/// Deserialize a response body, mapping failures to a malformed-response error.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    provider: ProviderId,
    body: &str,
) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::malformed(provider, e.to_string()))
}

/// Reject non-finite or non-positive prices.
pub(crate) fn positive_price(provider: ProviderId, price: f64) -> Result<f64, MarketDataError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(MarketDataError::malformed(
            provider,
            format!("invalid price {}", price),
        ))
    }
}
