//! Error handling - maps failures to the `{ status: "error", ... }` envelope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use agora_core::DomainError;
use agora_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to error envelopes.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    /// Server-side failure; `message` is shown to users, `detail` explains the cause.
    Internal { message: String, detail: String },
}

impl AppError {
    /// Map a domain error, using `failure` as the user-facing message for
    /// server-side failures.
    pub fn domain(err: DomainError, failure: &str) -> Self {
        match err {
            DomainError::InvalidQuery(msg) | DomainError::InvalidMetric(msg) => {
                AppError::BadRequest(msg)
            }
            DomainError::PostNotFound { id } => AppError::NotFound(format!("Post {id} not found")),
            other @ (DomainError::UpstreamUnavailable(_) | DomainError::InternalAggregation(_)) => {
                AppError::Internal {
                    message: failure.to_string(),
                    detail: other.to_string(),
                }
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal { message, detail } => write!(f, "{}: {}", message, detail),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::BadRequest(msg) => ErrorResponse::new(msg.clone()),
            AppError::NotFound(msg) => ErrorResponse::new(msg.clone()),
            AppError::Internal { message, detail } => {
                tracing::error!(detail = %detail, "{}", message);
                ErrorResponse::new(message.clone()).with_error(detail.clone())
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::domain(err, "Request failed")
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
