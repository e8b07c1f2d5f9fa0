//! Server-side error type.
//!
//! Every handler returns [`CourierResult`]; the error renders itself as
//! `{ code, error, message }` with the matching HTTP status.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::crypto::CryptoError;

/// Core application error type used across the Courier server.
#[derive(Debug, thiserror::Error)]
pub enum CourierError {
    // Session and credentials
    #[error("Invalid code or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("No token provided")]
    Unauthorized,

    // Lookups and uniqueness
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("{resource} already registered")]
    AlreadyExists { resource: String },

    // Request shape
    #[error("Invalid request: {message}")]
    Validation { message: String },

    // Key issuance
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    // Infrastructure
    #[error("Storage failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unexpected failure: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Wire shape of every error.
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error: String,
    message: String,
}

impl CourierError {
    /// Shorthand for the "unknown recipient" case of message submission.
    pub fn recipient_not_found() -> Self {
        Self::NotFound {
            resource: "Recipient".into(),
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::KeyGeneration(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code, sent as `error`.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::KeyGeneration(_) => "KEY_GENERATION_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<CryptoError> for CourierError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyGeneration(msg) => Self::KeyGeneration(msg),
            other => Self::Internal(other.into()),
        }
    }
}

/// Unreadable JSON bodies (wrong content type, bad syntax, mistyped fields)
/// are request-shape errors like any other.
impl From<JsonRejection> for CourierError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for CourierError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 5xx causes go to the log only.
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Something went wrong on our side".to_owned()
            }
            Self::KeyGeneration(e) => {
                tracing::error!(error = %e, "Key issuance failed");
                "Could not issue account keys".to_owned()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "Unexpected failure");
                "Something went wrong on our side".to_owned()
            }
            shown => shown.to_string(),
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            error: self.error_code().to_owned(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Result alias used by handlers and services.
pub type CourierResult<T> = Result<T, CourierError>;
