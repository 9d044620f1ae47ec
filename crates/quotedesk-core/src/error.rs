//! Error types for market-data operations.
//!
//! This module defines [`MarketError`] which covers all error cases that can
//! occur when fetching, decoding, or persisting market data.

use thiserror::Error;

/// Errors that can occur during market-data operations.
#[derive(Error, Debug)]
pub enum MarketError {
    /// A caller supplied an unusable symbol, CIK, or price.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network-level failure (connection refused, timeout, DNS, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// A non-2xx HTTP status that is not retryable.
    #[error("HTTP {status} for {url}")]
    Http {
        /// The status code returned by the server.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// Retries against a throttled host were exhausted.
    #[error("Rate limited by {host} after {attempts} attempts")]
    RateLimited {
        /// The host that kept answering 429/503.
        host: String,
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// No company, filing, or document matched the request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A provider is not configured (e.g. missing API credential) or threw.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Reading or writing persisted state failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl MarketError {
    /// Returns a short, stable name for the error kind.
    ///
    /// These names are the `error.kind` values carried across the UI
    /// boundary, so they must stay stable.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::Network(_) => "Network",
            Self::Http { .. } => "HttpError",
            Self::RateLimited { .. } => "RateLimited",
            Self::Decode(_) => "DecodeError",
            Self::NotFound(_) => "NotFound",
            Self::ProviderUnavailable(_) => "ProviderUnavailable",
            Self::Store(_) => "StoreError",
        }
    }
}

/// Result type alias using [`MarketError`].
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(MarketError::InvalidInput("x".into()).kind(), "InvalidInput");
        assert_eq!(
            MarketError::Http {
                status: 404,
                url: "https://example.com".into()
            }
            .kind(),
            "HttpError"
        );
        assert_eq!(
            MarketError::RateLimited {
                host: "data.sec.gov".into(),
                attempts: 4
            }
            .kind(),
            "RateLimited"
        );
        assert_eq!(MarketError::Decode("bad json".into()).kind(), "DecodeError");
    }
}
