//! Admin account bootstrap.
//!
//! # Usage
//!
//! ```bash
//! store-ratings-cli admin create -e admin@example.com \
//!     -n "Platform Administrator" -a "1 Main Street" -p 'Str0ng!pw'
//! ```
//!
//! The password can be supplied through `RATINGS_ADMIN_PASSWORD` instead of
//! `--password` to keep it out of shell history.
//!
//! # Environment Variables
//!
//! - `RATINGS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `RATINGS_ADMIN_PASSWORD` - Password when `--password` is omitted

use store_ratings_api::db::{AccountRepository, RepositoryError};
use store_ratings_api::models::NewAccount;
use store_ratings_api::services::AccountInput;
use store_ratings_api::services::auth::hash_password;
use store_ratings_core::{AccountId, Role, ValidationErrors};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No password on the command line or in the environment.
    #[error("Missing password: pass --password or set RATINGS_ADMIN_PASSWORD")]
    MissingPassword,

    /// One or more fields failed the account policy.
    #[error("Invalid account fields: {}", describe(.0))]
    Validation(ValidationErrors),

    /// Account already exists.
    #[error("Account already exists with email: {0}")]
    AccountExists(String),

    /// Password hashing failed.
    #[error("Failed to hash password")]
    PasswordHash,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),
}

fn describe(errors: &ValidationErrors) -> String {
    errors
        .errors()
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Create a new admin account.
///
/// The same field and password policy as API registration applies.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `AdminError` if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_admin(
    email: &str,
    name: &str,
    address: &str,
    password: Option<String>,
) -> Result<AccountId, Box<dyn std::error::Error>> {
    let password = password
        .or_else(|| std::env::var("RATINGS_ADMIN_PASSWORD").ok())
        .ok_or(AdminError::MissingPassword)?;

    let input = AccountInput {
        name: name.to_owned(),
        email: email.to_owned(),
        password,
        address: address.to_owned(),
    };
    let email = input.validate().map_err(AdminError::Validation)?;
    let password_hash = hash_password(&input.password).map_err(|_| AdminError::PasswordHash)?;

    let pool = super::connect().await?;

    tracing::info!("Creating admin account: {}", email);

    let account = AccountRepository::new(&pool)
        .create(NewAccount {
            name: &input.name,
            email: &email,
            password_hash: &password_hash,
            address: &input.address,
            role: Role::Admin,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::DuplicateKey(_) => AdminError::AccountExists(email.to_string()),
            other => AdminError::Database(other),
        })?;

    pool.close().await;
    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        account.id,
        account.email
    );

    Ok(account.id)
}
