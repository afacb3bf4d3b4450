//! Webhook error types for payment webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signing secret is not configured on the server.
    #[error("Webhook secret not configured")]
    MissingSecret,

    /// Request carried no signature header.
    #[error("Missing signature header")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Failed to parse webhook payload or signature hex.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Order code does not match our issued format.
    #[error("Unrecognized order code: {0}")]
    ForeignOrderCode(String),

    /// No pending subscription matches the paid order.
    #[error("Pending subscription not found")]
    PendingNotFound,

    /// Attempted state transition is not valid.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    ///
    /// Retryable errors indicate temporary failures that may succeed
    /// on subsequent attempts.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine the provider's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Trust failures - don't retry
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }

            // Bad request - don't retry
            WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            // Foreign order codes are acknowledged as success
            WebhookError::ForeignOrderCode(_) => StatusCode::OK,

            // Consumed or unknown orders - don't retry
            WebhookError::PendingNotFound => StatusCode::NOT_FOUND,

            // Server errors
            WebhookError::MissingSecret
            | WebhookError::InvalidTransition(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
