//! Error types for the market data crate.
//!
//! [`MarketDataError`] is the single error enum for provider calls, registry lookups,
//! configuration and series fetching. Each variant maps to a stable taxonomy code via
//! [`code`](MarketDataError::code), which is what callers should match on when they need
//! to render or log a failure category.

use thiserror::Error;

use crate::provider::ProviderId;

/// Errors that can occur during market data operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// The provider did not answer within its per-call timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: ProviderId,
    },

    /// The provider answered with a non-success HTTP status, or the transport failed
    /// before a status was received (`status` is `None`).
    #[error("HTTP error from {provider}: {}", .status.map_or_else(|| "transport failure".to_string(), |s| s.to_string()))]
    Http {
        /// The provider that returned the error
        provider: ProviderId,
        /// HTTP status code, when one was received
        status: Option<u16>,
    },

    /// The response body could not be parsed into the expected shape.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// The provider that returned the payload
        provider: ProviderId,
        /// What was wrong with the payload
        message: String,
    },

    /// The instrument has no identifier for this provider.
    #[error("{provider} does not support instrument {symbol}")]
    UnsupportedInstrument {
        provider: ProviderId,
        symbol: String,
    },

    /// The provider returned no usable data.
    #[error("No data")]
    NoData,

    /// Every applicable provider failed for a quote.
    ///
    /// The aggregator reports this as an absent price rather than returning it; it exists
    /// so the category can be logged and matched.
    #[error("All providers failed")]
    AllProvidersFailed,

    /// The symbol is not in the instrument registry.
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// The symbol was registered twice.
    #[error("Duplicate instrument: {0}")]
    DuplicateInstrument(String),

    /// An instrument definition failed validation.
    #[error("Invalid instrument: {0}")]
    InvalidInstrument(String),

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarketDataError {
    /// Stable taxonomy code for this error.
    ///
    /// ```
    /// use aurora_market_data::errors::MarketDataError;
    /// use aurora_market_data::provider::ProviderId;
    ///
    /// let error = MarketDataError::Timeout { provider: ProviderId::Kraken };
    /// assert_eq!(error.code(), "provider-timeout");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "provider-timeout",
            Self::Http { .. } => "provider-http-error",
            Self::MalformedResponse { .. } => "provider-malformed-response",
            Self::UnsupportedInstrument { .. } => "unsupported-instrument-for-provider",
            Self::NoData => "no-data",
            Self::AllProvidersFailed => "all-providers-failed",
            Self::UnknownInstrument(_) => "unknown-instrument",
            Self::DuplicateInstrument(_) => "duplicate-instrument",
            Self::InvalidInstrument(_) => "invalid-instrument",
            Self::Config(_) => "config-error",
        }
    }

    /// Whether this is a single-provider failure that the quote aggregator absorbs.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Http { .. }
                | Self::MalformedResponse { .. }
                | Self::UnsupportedInstrument { .. }
                | Self::NoData
        )
    }

    /// The provider this error is attributed to, if any.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::Timeout { provider }
            | Self::Http { provider, .. }
            | Self::MalformedResponse { provider, .. }
            | Self::UnsupportedInstrument { provider, .. } => Some(*provider),
            _ => None,
        }
    }

    pub(crate) fn malformed(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            message: message.into(),
        }
    }
}
