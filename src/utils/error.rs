use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::stripe::client::StripeError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Only {available} tickets available")]
    CapacityExceeded { available: i32 },

    #[error("Event organizer has not completed payout setup")]
    PayoutSetupRequired,

    #[error("Tickets are not on sale: {0}")]
    TicketsUnavailable(String),

    #[error("Webhook signature verification failed: {0}")]
    SignatureVerification(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Payment processor error: {0}")]
    Stripe(#[from] StripeError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CapacityExceeded { .. } => StatusCode::BAD_REQUEST,
            AppError::PayoutSetupRequired => StatusCode::BAD_REQUEST,
            AppError::TicketsUnavailable(_) => StatusCode::BAD_REQUEST,
            AppError::SignatureVerification(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Stripe(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            AppError::PayoutSetupRequired => "PAYOUT_SETUP_REQUIRED",
            AppError::TicketsUnavailable(_) => "TICKETS_UNAVAILABLE",
            AppError::SignatureVerification(_) => "INVALID_SIGNATURE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Stripe(_) => "PAYMENT_PROCESSOR_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            AppError::Stripe(e) => {
                error!(error = ?e, "Payment processor error");
            }
            other => {
                error!(error = ?other, code = other.code(), "Application error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level messages to the client
        let public_message = match &self {
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalServerError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        error_response(code, public_message, status)
    }
}
