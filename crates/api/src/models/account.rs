//! Account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use store_ratings_core::{AccountId, Email, Role};

use super::store::StoreSummary;

/// A platform account (domain type).
///
/// There is deliberately no password field: the credential is only ever
/// read by the auth service through dedicated repository methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email (normalized lowercase).
    pub email: Email,
    /// Postal address.
    pub address: String,
    /// Current role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting an account. Fields are already validated.
#[derive(Debug, Clone, Copy)]
pub struct NewAccount<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub address: &'a str,
    pub role: Role,
}

/// Filters for the admin account listing.
///
/// `name`, `email`, and `address` are case-insensitive substring matches;
/// `role` is exact. Absent or blank fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// An account as seen by an admin, with owned stores for store owners.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: Account,
    /// Present only when the account is a store owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stores: Option<Vec<StoreSummary>>,
}

/// The authenticated caller.
///
/// Built from a verified token and then refreshed from the database, so
/// `role` is always the account's current role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: AccountId,
    pub email: Email,
    pub role: Role,
}

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
        }
    }
}
