//! Link Error Types
//!
//! Link-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Link-specific result type alias
pub type LinkResult<T> = Result<T, LinkError>;

/// Link-specific error variants
#[derive(Debug, Error)]
pub enum LinkError {
    /// Short key already taken
    #[error("Short key already taken")]
    DuplicateKey,

    /// Invalid input (key format, URL, expiry)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Link not found (also returned for links owned by someone else)
    #[error("Link not found")]
    NotFound,

    /// Link exists but its expiry has passed
    #[error("Link expired")]
    Expired,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinkError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LinkError::DuplicateKey => StatusCode::CONFLICT,
            LinkError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkError::NotFound => StatusCode::NOT_FOUND,
            LinkError::Expired => StatusCode::GONE,
            LinkError::Database(_) | LinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkError::DuplicateKey => ErrorKind::Conflict,
            LinkError::Validation(_) => ErrorKind::BadRequest,
            LinkError::NotFound => ErrorKind::NotFound,
            LinkError::Expired => ErrorKind::Gone,
            LinkError::Database(_) | LinkError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError with appropriate message
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            LinkError::Database(e) => {
                tracing::error!(error = %e, "Link database error");
            }
            LinkError::Internal(msg) => {
                tracing::error!(message = %msg, "Link internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Link error");
            }
        }
    }
}

impl From<LinkError> for AppError {
    fn from(err: LinkError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
