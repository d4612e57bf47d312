//! Unified error handling for the client layer.
//!
//! Per-module errors (`StorageError`, `ApiError`, `CheckoutError`,
//! `ConfigError`) convert into one `AppError` at the application surface.
//! Nothing here is fatal to the process: every variant degrades to a
//! visible, retryable state in the presentation layer.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote service call failed.
    #[error("Remote error: {0}")]
    Api(#[from] ApiError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// User-facing message: server-provided when the remote supplied one,
    /// a generic fallback otherwise.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(api) => api.user_message(),
            Self::Checkout(checkout) => checkout.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_surfaces() {
        let err = AppError::Api(ApiError::Remote {
            status: 409,
            message: Some("Data conflict.".to_owned()),
        });
        assert_eq!(err.user_message(), "Data conflict.");
    }

    #[test]
    fn test_config_message_is_display() {
        let err = AppError::Config(ConfigError::MissingEnvVar("COPPERPOT_API_BASE_URL".into()));
        assert!(err.user_message().contains("COPPERPOT_API_BASE_URL"));
    }
}
