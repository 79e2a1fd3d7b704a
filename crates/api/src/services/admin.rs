//! Admin operations: store creation, listings, and platform statistics.
//!
//! Admin account creation lives in the auth service, since it hashes a
//! password.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use store_ratings_core::validation::{parse_email, validate_address, validate_store_name};
use store_ratings_core::{AccountId, Role, ValidationErrors};

use crate::db::{AccountRepository, RatingRepository, RepositoryError, StoreRepository};
use crate::models::{
    Account, AccountDetail, AccountFilter, NewStore, PlatformStats, Store, StoreFilter,
    StoreSummary,
};

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// One or more input fields failed the validation policy.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A store with this email already exists.
    #[error("a store with this email already exists")]
    EmailTaken,

    /// The requested owner is missing or is not a store owner.
    #[error("owner {0} is not an existing store owner")]
    InvalidOwner(AccountId),

    /// The requested account does not exist.
    #[error("account not found")]
    AccountNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Fields submitted when an admin creates a store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub owner_id: Option<AccountId>,
}

/// Admin service.
pub struct AdminService<'a> {
    accounts: AccountRepository<'a>,
    stores: StoreRepository<'a>,
    ratings: RatingRepository<'a>,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            stores: StoreRepository::new(pool),
            ratings: RatingRepository::new(pool),
        }
    }

    /// Create a store, optionally owned by an existing store owner.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if any field breaks the policy.
    /// Returns `AdminError::InvalidOwner` if `owner_id` does not name an
    /// account with the `store_owner` role.
    /// Returns `AdminError::EmailTaken` if the store email is in use.
    pub async fn create_store(&self, input: &StoreInput) -> Result<Store, AdminError> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_store_name(&input.name));
        let email = errors.take(parse_email("email", &input.email));
        errors.check(validate_address(&input.address));
        let email = match email {
            Some(email) if errors.is_empty() => email,
            _ => return Err(errors.into()),
        };

        if let Some(owner_id) = input.owner_id {
            let owner = self.accounts.find_by_id(owner_id).await?;
            if !owner.is_some_and(|o| o.role == Role::StoreOwner) {
                return Err(AdminError::InvalidOwner(owner_id));
            }
        }

        let store = self
            .stores
            .create(NewStore {
                name: &input.name,
                email: &email,
                address: &input.address,
                owner_id: input.owner_id,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateKey(_) => AdminError::EmailTaken,
                other => AdminError::Repository(other),
            })?;

        tracing::info!(store_id = %store.id, owner_id = ?store.owner_id, "Store created");
        Ok(store)
    }

    /// List accounts matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the query fails.
    pub async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>, AdminError> {
        Ok(self.accounts.list(filter).await?)
    }

    /// One account, plus its stores when it is a store owner.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::AccountNotFound` if the account does not exist.
    pub async fn account_detail(&self, id: AccountId) -> Result<AccountDetail, AdminError> {
        let account = self
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(AdminError::AccountNotFound)?;

        let stores = if account.role == Role::StoreOwner {
            Some(self.stores.list_by_owner(id).await?)
        } else {
            None
        };

        Ok(AccountDetail { account, stores })
    }

    /// List stores matching `filter`, by name.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the query fails.
    pub async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<StoreSummary>, AdminError> {
        Ok(self.stores.list(filter).await?)
    }

    /// Platform-wide counters.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the query fails.
    pub async fn stats(&self) -> Result<PlatformStats, AdminError> {
        Ok(self.ratings.platform_stats().await?)
    }
}
