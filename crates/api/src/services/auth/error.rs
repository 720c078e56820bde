//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during account and token operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required signup or signin field was missing or blank.
    #[error("{0}")]
    MissingField(&'static str),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bizdesk_core::EmailError),

    /// Invalid credentials (wrong password or unknown username).
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Username or email already registered.
    #[error("{0}")]
    AccountExists(String),

    /// Bearer token missing, malformed, badly signed, or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
