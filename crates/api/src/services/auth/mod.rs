//! Authentication service.
//!
//! Owns everything that touches a credential: registration, login, password
//! change, admin account creation, and turning a bearer token back into a
//! current [`Identity`].

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use token::{TokenError, TokenKeys};

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use store_ratings_core::validation::{
    parse_email, validate_address, validate_display_name, validate_password,
};
use store_ratings_core::{AccountId, Email, FieldError, Role, ValidationErrors};

use crate::db::{AccountRepository, RepositoryError};
use crate::models::{Account, Identity, NewAccount};

/// Profile and password submitted when creating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInput {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: String,
}

impl AccountInput {
    /// Run the full field policy, collecting every failure.
    ///
    /// # Errors
    ///
    /// Returns all field errors together.
    pub fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_display_name(&self.name));
        let email = errors.take(parse_email("email", &self.email));
        errors.check(validate_password("password", &self.password));
        errors.check(validate_address(&self.address));

        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

/// A freshly issued token and the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub account: Account,
}

/// Authentication service.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenKeys) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            tokens,
        }
    }

    // =========================================================================
    // Public entry points
    // =========================================================================

    /// Self-service registration. The new account always has the `user` role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field breaks the policy.
    /// Returns `AuthError::EmailTaken` if the email is already registered;
    /// nothing is created in that case.
    pub async fn register(&self, input: AccountInput) -> Result<AuthSession, AuthError> {
        let account = self.create_account(input, Role::User).await?;
        let token = self.tokens.issue(&Identity::from(&account))?;

        tracing::info!(account_id = %account.id, "Account registered");
        Ok(AuthSession { token, account })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a wrong
    /// password alike.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (account, password_hash) = self
            .accounts
            .find_credentials_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password_blocking(password.to_owned(), password_hash).await? {
            tracing::debug!(account_id = %account.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&Identity::from(&account))?;
        Ok(AuthSession { token, account })
    }

    // =========================================================================
    // Authenticated operations
    // =========================================================================

    /// Change the caller's own password after confirming the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the new password breaks the policy
    /// or the current password is wrong.
    /// Returns `AuthError::AccountNotFound` if the account was deleted.
    pub async fn change_password(
        &self,
        account_id: AccountId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_password("new_password", new_password));

        let stored = self
            .accounts
            .find_password_hash(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !password::verify_password_blocking(current_password.to_owned(), stored).await? {
            errors.push(FieldError::new(
                "current_password",
                "current password is incorrect",
            ));
        }
        errors.into_result()?;

        let hash = password::hash_password_blocking(new_password.to_owned()).await?;
        if self.accounts.update_password(account_id, &hash).await? == 0 {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(account_id = %account_id, "Password changed");
        Ok(())
    }

    /// Create an account with any role. Used by admins and the CLI bootstrap.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field breaks the policy.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn create_account(
        &self,
        input: AccountInput,
        role: Role,
    ) -> Result<Account, AuthError> {
        let email = input.validate()?;
        let password_hash = password::hash_password_blocking(input.password).await?;

        self.accounts
            .create(NewAccount {
                name: &input.name,
                email: &email,
                password_hash: &password_hash,
                address: &input.address,
                role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateKey(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })
    }

    /// Resolve a bearer token to the caller's current identity.
    ///
    /// The account is reloaded so a deleted account is rejected and a changed
    /// role takes effect immediately.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the token is expired or malformed.
    /// Returns `AuthError::AccountNotFound` if the account no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claimed = self.tokens.verify(token)?;

        let account = self
            .accounts
            .find_by_id(claimed.id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if account.role != claimed.role {
            tracing::debug!(
                account_id = %account.id,
                token_role = %claimed.role,
                current_role = %account.role,
                "Role changed since token was issued"
            );
        }

        Ok(Identity::from(&account))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> AccountInput {
        AccountInput {
            name: "Alice Wonderland Smith".to_owned(),
            email: "Alice@Example.com".to_owned(),
            password: "Secret1!".to_owned(),
            address: "1 Main Street".to_owned(),
        }
    }

    #[test]
    fn test_valid_input_normalizes_email() {
        let email = input().validate().unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_invalid_input_reports_every_field() {
        let bad = AccountInput {
            name: "Al".to_owned(),
            email: "nope".to_owned(),
            password: "weak".to_owned(),
            address: "x".repeat(401),
        };
        let errors = bad.validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "email", "password", "address"]);
    }

    #[test]
    fn test_address_defaults_to_empty() {
        let parsed: AccountInput = serde_json::from_str(
            r#"{"name":"Alice Wonderland Smith","email":"a@b.co","password":"Secret1!"}"#,
        )
        .unwrap();
        assert_eq!(parsed.address, "");
    }
}
