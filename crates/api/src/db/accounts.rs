//! Account repository for database operations.
//!
//! Queries are checked at runtime (`query_as`) and decoded into private row
//! types, which are then converted into domain types.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{AccountId, Email, Role};

use super::{RepositoryError, optional_pattern};
use crate::models::{Account, AccountFilter, NewAccount};

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    name: String,
    email: String,
    address: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            address: row.address,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateKey` if the email is already taken.
    /// Returns `RepositoryError::ConstraintViolation` if a schema check fails.
    pub async fn create(&self, account: NewAccount<'_>) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO accounts (name, email, password_hash, address, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, address, role, created_at, updated_at
            ",
        )
        .bind(account.name)
        .bind(account.email.as_str())
        .bind(account.password_hash)
        .bind(account.address)
        .bind(account.role)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is corrupt.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, name, email, address, role, created_at, updated_at
            FROM accounts
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Account::try_from)
        .transpose()
    }

    /// Get an account together with its password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is corrupt.
    pub async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, name, email, address, role, created_at, updated_at, password_hash
            FROM accounts
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.account.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Get the password hash for an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn find_password_hash(&self, id: AccountId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(hash)
    }

    /// Replace an account's password hash and touch `updated_at`.
    ///
    /// Returns the number of rows updated (0 if the account is gone).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the update fails.
    pub async fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// List accounts matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is corrupt.
    pub async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, name, email, address, role, created_at, updated_at
            FROM accounts
            WHERE ($1::text IS NULL OR name ILIKE $1)
              AND ($2::text IS NULL OR email ILIKE $2)
              AND ($3::text IS NULL OR address ILIKE $3)
              AND ($4::account_role IS NULL OR role = $4)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(optional_pattern(filter.name.as_deref()))
        .bind(optional_pattern(filter.email.as_deref()))
        .bind(optional_pattern(filter.address.as_deref()))
        .bind(filter.role)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }
}
