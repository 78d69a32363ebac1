//! Error types for the analytics client.

use thiserror::Error;

/// Result type for analytics client operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Analytics client errors.
///
/// Every variant is recorded into the client's shared [`FetchState`](crate::FetchState)
/// before it reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// Caller input rejected before any request was issued
    #[error("{0}")]
    Validation(String),

    /// Backend answered with a non-2xx status
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Transport failure or a response body that is not valid JSON
    #[error("Network error: {0}")]
    Network(String),

    /// Missing or malformed client configuration (base address)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyticsError {
    pub(crate) fn missing_dates() -> Self {
        Self::Validation("Start date and end date are required".to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Network(format!("Failed to parse response body: {}", err))
    }
}
