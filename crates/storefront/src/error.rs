//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! The response body is always JSON: `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use atmos_core::CartError;

use crate::db::RepositoryError;
use crate::services::{CheckoutError, StripeError, WaitlistError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Stripe API operation failed.
    #[error("Stripe error: {0}")]
    Stripe(#[from] StripeError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Cart operation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Waitlist operation failed.
    #[error("Waitlist error: {0}")]
    Waitlist(#[from] WaitlistError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request refused (e.g. disallowed origin).
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Stripe(_) => StatusCode::BAD_GATEWAY,
            Self::Cart(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Waitlist(err) => err.status(),
            Self::Checkout(err) => err.status(),
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message returned to the client.
    ///
    /// Internal details never leave the server.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Session(_) => "Internal server error".to_owned(),
            Self::Stripe(_) => "Payment service error".to_owned(),
            Self::Cart(err) => err.to_string(),
            Self::Waitlist(err) => err.public_message(),
            Self::Checkout(err) => err.public_message(),
            Self::BadRequest(msg) | Self::Forbidden(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Forbidden("Forbidden origin".to_string());
        assert_eq!(err.to_string(), "Forbidden: Forbidden origin");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::Forbidden("Forbidden origin".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartError::QuantityTooLarge { max: 99 }.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(WaitlistError::AlreadySubscribed.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CheckoutError::EmptyCart.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "bad row in storefront.order".to_string(),
        ));
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::Stripe(StripeError::Parse("unexpected field".to_string()));
        assert_eq!(err.public_message(), "Payment service error");
    }

    #[test]
    fn test_waitlist_messages_pass_through() {
        let err = AppError::from(WaitlistError::AlreadySubscribed);
        assert_eq!(
            err.public_message(),
            crate::services::waitlist::ALREADY_REGISTERED
        );
    }
}
