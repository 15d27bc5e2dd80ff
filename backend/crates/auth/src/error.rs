//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// User name already exists
    #[error("User name already exists")]
    DuplicateUserName,

    /// Email already registered
    #[error("Email already registered")]
    DuplicateEmail,

    /// Phone number already registered
    #[error("Phone number already registered")]
    DuplicatePhone,

    /// Invalid credentials (unknown user name or wrong password,
    /// deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is locked (too many failed attempts)
    #[error("Account is temporarily locked")]
    AccountLocked,

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Session fingerprint mismatch
    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    /// 2FA enabled but no code supplied yet
    #[error("Two-factor authentication required")]
    TwoFactorRequired,

    /// Invalid TOTP or backup code
    #[error("Invalid two-factor authentication code")]
    InvalidTwoFactorCode,

    /// 2FA not set up
    #[error("Two-factor authentication not set up")]
    TwoFactorNotSetup,

    /// 2FA already enabled
    #[error("Two-factor authentication already enabled")]
    TwoFactorAlreadyEnabled,

    /// Password reset OTP is wrong, already used, or past its window
    #[error("Invalid or expired one-time code")]
    InvalidOrExpiredOtp,

    /// Missing required header
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Input validation error (user name, email, phone, ...)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AccountNotFound => StatusCode::NOT_FOUND,
            AuthError::DuplicateUserName
            | AuthError::DuplicateEmail
            | AuthError::DuplicatePhone
            | AuthError::TwoFactorAlreadyEnabled => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::SessionFingerprintMismatch
            | AuthError::InvalidTwoFactorCode
            | AuthError::InvalidOrExpiredOtp => StatusCode::UNAUTHORIZED,
            AuthError::AccountLocked => StatusCode::LOCKED,
            AuthError::TwoFactorRequired => StatusCode::PRECONDITION_REQUIRED,
            AuthError::TwoFactorNotSetup => StatusCode::PRECONDITION_FAILED,
            AuthError::MissingHeader(_)
            | AuthError::PasswordValidation(_)
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::DuplicateUserName
            | AuthError::DuplicateEmail
            | AuthError::DuplicatePhone
            | AuthError::TwoFactorAlreadyEnabled => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::SessionFingerprintMismatch
            | AuthError::InvalidTwoFactorCode
            | AuthError::InvalidOrExpiredOtp => ErrorKind::Unauthorized,
            AuthError::AccountLocked => ErrorKind::Forbidden,
            AuthError::TwoFactorRequired => ErrorKind::PreconditionRequired,
            AuthError::TwoFactorNotSetup => ErrorKind::UnprocessableEntity,
            AuthError::MissingHeader(_)
            | AuthError::PasswordValidation(_)
            | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::SessionFingerprintMismatch => {
                tracing::warn!("Session fingerprint mismatch detected");
            }
            AuthError::InvalidOrExpiredOtp => {
                tracing::warn!("Rejected password reset code");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::client::FingerprintError> for AuthError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                AuthError::MissingHeader(header)
            }
        }
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::PasswordValidation(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
