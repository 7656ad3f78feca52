use serde::Serialize;
use thiserror::Error;

use crate::model::ProviderError;

/// Errors surfaced by the gateway. Each maps onto an [`ErrorKind`] so callers
/// can branch without matching on message text.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("Error communicating with the model: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Provider,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Configuration(_) => ErrorKind::Configuration,
            GatewayError::Validation(_) => ErrorKind::Validation,
            GatewayError::Provider(_) => ErrorKind::Provider,
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
