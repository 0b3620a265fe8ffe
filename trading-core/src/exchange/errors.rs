// exchange/errors.rs

use thiserror::Error;

/// Error types for exchange operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Rejection reported by the exchange itself (`{"code": .., "msg": ..}`)
    #[error("API error {code}: {msg}")]
    ApiError { code: i64, msg: String },

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Missing API credentials: {0}")]
    MissingCredentials(String),
}

// Convert from common error types
impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::NetworkError(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}
