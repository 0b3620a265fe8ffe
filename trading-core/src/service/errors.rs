use crate::exchange::ExchangeError;
use thiserror::Error;
use trading_common::data::ValidationError;

/// Service layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// Operator declined a confirmation prompt
    #[error("Aborted: {0}")]
    Aborted(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

impl ServiceError {
    /// Bad input, as opposed to the exchange being unavailable
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
