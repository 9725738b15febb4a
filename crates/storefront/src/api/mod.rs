//! REST client for the marketplace backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - JSON envelopes: success bodies are `{ "data": ... }`, errors are
//!   `{ "message": ... }`
//! - Session-cookie authentication: login captures the backend's session
//!   cookie, which the storefront stores per user and replays as a `Cookie`
//!   header on authenticated calls
//! - In-memory caching via `moka` for catalog responses (5 minute TTL);
//!   order and auth calls are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use tiffinbox_storefront::api::BackendClient;
//!
//! let client = BackendClient::new(&config.backend);
//!
//! // Browse the catalog (anonymous)
//! let page = client.list_meals(&MealFilter::default()).await?;
//!
//! // Place an order (authenticated)
//! let order = client.create_order(&auth, &input).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::BackendClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the marketplace backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or expired backend session (401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx response, carrying the backend's `message`.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },
}

impl ApiError {
    /// The one-line text shown to the user when the operation fails.
    ///
    /// Backend `message` fields are written for end users and pass through
    /// verbatim; transport and parse failures get a generic line instead.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach the server. Please try again.".to_string(),
            Self::Parse(_) => "Unexpected response from the server.".to_string(),
            Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Backend { message, .. } => message.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("Meal not found".to_string());
        assert_eq!(err.to_string(), "Not found: Meal not found");

        let err = ApiError::Backend {
            status: 422,
            message: "Meal is not available".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend error (422): Meal is not available"
        );
    }

    #[test]
    fn test_user_message_passes_backend_text_through() {
        let err = ApiError::Backend {
            status: 400,
            message: "Delivery address is required".to_string(),
        };
        assert_eq!(err.user_message(), "Delivery address is required");
    }

    #[test]
    fn test_user_message_hides_parse_details() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::Parse(parse_err);
        assert_eq!(err.user_message(), "Unexpected response from the server.");
    }
}
