use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::responses::ApiResponse;
use thiserror::Error;

use crate::domain::calendar::CalendarError;

/// Application-level errors for the availability service.
///
/// Each variant maps to an HTTP status code via the [`IntoResponse`] implementation.
#[derive(Debug, Error)]
pub enum AvailabilityServiceError {
    /// No calendar is provisioned for the referenced worker.
    #[error("Not Found: {0}")]
    NotFound(String),

    /// A range operation received `start > end` or an oversized span.
    #[error("Invalid Range: {0}")]
    InvalidRange(String),

    /// Client sent an otherwise invalid request.
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// A reservation hit an occupied day, or a save lost to a concurrent writer.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Duplicate dates reached the storage boundary; a bug in the assigner, not user error.
    #[error("Calendar invariant violated: {0}")]
    InvariantViolation(String),

    /// Unexpected internal failure.
    #[error("Internal Server Error: {0}")]
    Internal(String),

    /// Database query or connection error.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CalendarError> for AvailabilityServiceError {
    fn from(e: CalendarError) -> Self {
        match &e {
            CalendarError::InvalidRange { .. } => Self::InvalidRange(e.to_string()),
            CalendarError::EmptyDates => Self::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for AvailabilityServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRange(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvariantViolation(_) | Self::Internal(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, %status, "Server error");
        } else {
            tracing::warn!(error = %self, %status, "Client error");
        }

        let message = match self {
            Self::Database(_) => {
                "Oof, Something went wrong while accessing the database.".to_owned()
            }
            other => other.to_string(),
        };

        let body = ApiResponse::<()>::err(message);
        (status, axum::Json(body)).into_response()
    }
}
