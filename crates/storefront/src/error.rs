//! Unified error handling.
//!
//! Every fallible `Storefront` operation returns `Result<T, AppError>`. Front
//! ends show [`AppError::user_message`] rather than the raw `Display` output,
//! which carries transport and file system detail.

use thiserror::Error;

use savat_core::EmailError;

use crate::api::ApiError;
use crate::cart::QuantityError;
use crate::config::ConfigError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The session does not allow the operation.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A requested quantity was refused.
    #[error("Quantity error: {0}")]
    Quantity(#[from] QuantityError),

    /// Malformed email address.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the backend rejected the bearer credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_unauthorized())
    }

    /// Message safe to show an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Storage(_) => "Local storage is unavailable".to_string(),
            Self::Api(err) => match err {
                ApiError::Http(_) | ApiError::Url(_) => {
                    "Could not reach the store, please try again".to_string()
                }
                ApiError::Parse(_) => "The store sent an unexpected response".to_string(),
                ApiError::NotFound(_) => "Not found".to_string(),
                ApiError::Unauthorized(message) | ApiError::Status { message, .. } => {
                    message.clone()
                }
                ApiError::RateLimited(secs) => {
                    format!("Too many requests, retry in {secs} seconds")
                }
            },
            Self::Session(err) => err.to_string(),
            Self::Quantity(err) => err.to_string(),
            Self::InvalidEmail(_) => "Invalid email address".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(message) => message.clone(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("password too short".to_string());
        assert_eq!(err.to_string(), "Bad request: password too short");
    }

    #[test]
    fn test_is_unauthorized() {
        let err = AppError::from(ApiError::Unauthorized("expired".to_string()));
        assert!(err.is_unauthorized());

        let err = AppError::from(ApiError::NotFound("/carts/1".to_string()));
        assert!(!err.is_unauthorized());
        assert!(!AppError::from(SessionError::NotSignedIn).is_unauthorized());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::from(StorageError::Poisoned);
        assert_eq!(err.user_message(), "Local storage is unavailable");

        let err = AppError::from(ApiError::Status {
            status: 400,
            message: "email already registered".to_string(),
        });
        assert_eq!(err.user_message(), "email already registered");

        let err = AppError::from(QuantityError::AboveCeiling {
            ceiling: 99,
            requested: 100,
        });
        assert_eq!(err.user_message(), "maximum quantity is 99 (requested 100)");
    }
}
