//! Unified error handling.
//!
//! Provides a unified `AppError` type that every route handler returns in its
//! `Result`. The single `IntoResponse` impl below is the centralized
//! translator: it maps each error kind to a status code and renders the
//! `{success: false, error: {message}}` envelope. Unrecognized errors fall
//! through to a generic 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed, missing, or out-of-range input; also business-rule
    /// violations such as insufficient stock.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing/invalid/expired token or bad credentials.
    #[error("auth error: {0}")]
    Auth(String),

    /// Authenticated but not entitled (wrong owner, wrong role).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    AuthService(#[from] AuthError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = translate(&self);

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request error");
        }

        let body = Json(json!({
            "success": false,
            "error": { "message": message },
        }));

        (status, body).into_response()
    }
}

/// Map an error to its status code and client-facing message.
///
/// Internal details (database errors, hashing failures) are never exposed.
fn translate(error: &AppError) -> (StatusCode, String) {
    match error {
        AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        AppError::Repository(err) => translate_repository(err),
        AppError::AuthService(err) => translate_auth(err),
        AppError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        ),
    }
}

fn translate_repository(error: &RepositoryError) -> (StatusCode, String) {
    match error {
        // Unique violations and guarded stock decrements carry a message
        // naming the offending field or product.
        RepositoryError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        ),
    }
}

fn translate_auth(error: &AuthError) -> (StatusCode, String) {
    match error {
        AuthError::InvalidCredentials
        | AuthError::InvalidToken
        | AuthError::TokenExpired
        | AuthError::UserGone => (StatusCode::UNAUTHORIZED, error.to_string()),
        AuthError::UserAlreadyExists | AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => {
            (StatusCode::BAD_REQUEST, error.to_string())
        }
        AuthError::Repository(err) => translate_repository(err),
        AuthError::PasswordHash | AuthError::TokenCreation => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        ),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
