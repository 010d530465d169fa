//! Authentication error types.

use thiserror::Error;

use tienda_core::EmailError;

use crate::db::RepositoryError;

/// Errors from registration, login, and token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Registration against an email that is already taken.
    #[error("email already exists")]
    UserAlreadyExists,

    /// Password fails the strength requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token signing failed.
    #[error("token could not be created")]
    TokenCreation,

    /// Token signature or structure is invalid.
    #[error("invalid token, please log in again")]
    InvalidToken,

    /// Token has expired.
    #[error("session expired, please log in again")]
    TokenExpired,

    /// Token is valid but its user no longer exists.
    #[error("the user behind this token no longer exists")]
    UserGone,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
