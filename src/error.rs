//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type handlers return. It is the
//! one place where failure kinds are translated into HTTP responses: every error body
//! has the shape `{"error": <kind>, "message": <text>}`.
//!
//! `From` implementations for store, validation, token and hashing errors allow the
//! `?` operator to be used throughout the services.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::token::AuthFailure;
use crate::store::StoreError;

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input (HTTP 400).
    #[error("{0}")]
    Validation(String),
    /// Missing, invalid or expired token, or a token whose user is gone (HTTP 401).
    #[error("{0}")]
    Unauthenticated(AuthFailure),
    /// Login with an unknown email or a wrong password (HTTP 401).
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// Resource absent or owned by someone else (HTTP 404).
    #[error("{0}")]
    NotFound(String),
    /// Duplicate email on signup. Reported as HTTP 400 but kept distinct internally.
    #[error("{0}")]
    Conflict(String),
    /// Persistence or other unexpected failure (HTTP 500). The detail is logged,
    /// never sent to the client.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error kind carried in the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => "Unauthenticated",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Internal(_) => "InternalError",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.public_message(),
        }))
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::DuplicateEmail => AppError::Conflict("Email already registered".into()),
            StoreError::Backend(detail) => {
                log::error!("store failure: {}", detail);
                AppError::Internal(detail)
            }
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`, naming the
/// offending fields in a stable order.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<&str> = errors.field_errors().into_keys().collect();
        fields.sort_unstable();
        AppError::Validation(format!("Invalid or missing field(s): {}", fields.join(", ")))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::error!("token encoding failed: {}", error);
        AppError::Internal(format!("Failed to generate token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        log::error!("password hashing failed: {}", error);
        AppError::Internal(format!("Password hashing failed: {}", error))
    }
}
