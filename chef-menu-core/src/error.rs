//! Error types shared by the API client and the controllers.

use crate::models::{PriceError, ValidationError};

/// Fallback shown when the server declines an operation without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
/// Shown when a request could not be completed at all.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Could not connect to the server. Please check your connection and try again.";

/// Errors surfaced by menu operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    /// Input was rejected locally; no request was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The server answered but declined the operation (non-2xx or `success: false`).
    #[error("{message}")]
    Application {
        status: Option<u16>,
        message: String,
    },
    /// The request could not be completed.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The owning screen was torn down while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,
    /// The image picker could not produce an asset.
    #[error("Could not read image: {0}")]
    Image(String),
    /// The operation needs an entity the server already knows about.
    #[error("Save this entry before {0}")]
    NotSaved(&'static str),
}

impl MenuError {
    pub fn application(status: Option<u16>, message: Option<String>) -> Self {
        MenuError::Application {
            status,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        }
    }

    /// The message a user should see for this failure.
    pub fn user_message(&self) -> String {
        match self {
            MenuError::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, MenuError::Validation(_))
    }
}

impl From<PriceError> for MenuError {
    fn from(e: PriceError) -> Self {
        MenuError::Validation(ValidationError::Price(e))
    }
}

impl From<reqwest::Error> for MenuError {
    fn from(e: reqwest::Error) -> Self {
        MenuError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_message_fallback() {
        let err = MenuError::application(Some(500), None);
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);

        let err = MenuError::application(Some(200), Some("   ".to_string()));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);

        let err = MenuError::application(Some(409), Some("Name taken".to_string()));
        assert_eq!(err.user_message(), "Name taken");
    }

    #[test]
    fn test_transport_message_is_distinct() {
        let err = MenuError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), TRANSPORT_FAILURE_MESSAGE);
        assert_ne!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_validation_message() {
        let err: MenuError = ValidationError::MissingName.into();
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Dish name is required");

        let err: MenuError = PriceError::Missing.into();
        assert_eq!(err.user_message(), "Price is required");
    }
}
