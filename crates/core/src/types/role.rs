//! Account roles.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the three role names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0} (expected admin, user, or store_owner)")]
pub struct ParseRoleError(pub String);

/// The role an account holds on the platform.
///
/// Roles are flat: there is no hierarchy, so an `Admin` is not implicitly a
/// `User`. Each operation lists exactly which roles may perform it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "account_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages accounts and stores, sees platform statistics.
    Admin,
    /// Browses stores and submits ratings.
    #[default]
    User,
    /// Sees the ratings left on the stores they own.
    StoreOwner,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::User, Self::StoreOwner];

    /// The wire and database name of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::StoreOwner => "store_owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "store_owner" => Ok(Self::StoreOwner),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}
