//! Authentication error types.

use thiserror::Error;

use store_ratings_core::ValidationErrors;

use super::TokenError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more input fields failed the validation policy.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Wrong password or unknown email. The two are deliberately
    /// indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// The token verified but its account no longer exists.
    #[error("account no longer exists")]
    AccountNotFound,

    /// Bearer token could not be issued or verified.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
