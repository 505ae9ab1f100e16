//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All JSON route handlers return
//! `Result<T, AppError>`; the webhook handler builds its plain-text
//! responses directly because its contract is bare text, not JSON.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::printify::{OrderValidationError, PrintifyError};
use crate::stripe::StripeError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order payload failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] OrderValidationError),

    /// Request body was not valid JSON.
    #[error("Invalid JSON body")]
    InvalidJson,

    /// Payment provider operation failed.
    #[error("Stripe error: {0}")]
    Stripe(#[from] StripeError),

    /// Fulfillment provider operation failed.
    #[error("Printify error: {0}")]
    Printify(#[from] PrintifyError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry; client mistakes are noise.
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Stripe(_) | Self::Printify(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            // Itemized validation result, in the order endpoint's envelope.
            Self::Validation(err) => {
                let mut body = json!({
                    "ok": false,
                    "error": err.to_string(),
                });
                if let Some(missing) = err.missing() {
                    body["missing"] = json!(missing);
                }
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }

            Self::InvalidJson => (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "error": "Invalid JSON body"})),
            )
                .into_response(),

            // Provider rejections pass the provider's status and body
            // through for operator diagnosis.
            Self::Printify(PrintifyError::Api {
                status,
                message,
                body,
            }) => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (
                    status,
                    Json(json!({
                        "ok": false,
                        "status": status.as_u16(),
                        "error": message,
                        "data": body,
                    })),
                )
                    .into_response()
            }

            // Transport-level fulfillment failures degrade to a generic 500.
            Self::Printify(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"ok": false, "error": "Server error calling Printify"})),
            )
                .into_response(),

            Self::Stripe(_) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "Payment provider error"})),
            )
                .into_response(),

            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
            }

            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = AppError::Validation(OrderValidationError::AddressMissingFields {
            missing: vec!["region"],
        });
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_status_passes_through() {
        let err = AppError::Printify(PrintifyError::Api {
            status: 422,
            message: "variant unavailable".to_string(),
            body: None,
        });
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_stripe_maps_to_bad_gateway() {
        let err = AppError::Stripe(StripeError::MissingRedirectUrl);
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_bad_request_and_internal() {
        assert_eq!(
            status_of(AppError::BadRequest("No items provided".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
