//! Role-based access control.
//!
//! Roles are flat. Each [`Operation`] lists exactly the roles allowed to
//! perform it, and [`authorize`] runs before any data access so a rejected
//! caller learns nothing about the target.
//!
//! Handlers name their operation at the type level through the markers in
//! [`permission`], which the `Authorized` extractor checks while the request
//! head is being extracted. Path, query, and body parsing therefore never
//! run for a caller who would be refused.

use thiserror::Error;

use store_ratings_core::Role;

use crate::models::Identity;

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No verified identity accompanied the request.
    #[error("authentication required")]
    Unauthenticated,

    /// The caller's role may not perform this operation.
    #[error("you do not have permission to perform this action")]
    Forbidden,
}

/// Every operation that requires an authenticated caller.
///
/// Registration and login are public and never pass through [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ChangePassword,
    ListAccounts,
    CreateAccount,
    ViewAccount,
    ListStores,
    CreateStore,
    ViewPlatformStats,
    BrowseStores,
    ViewStore,
    SubmitRating,
    ViewOwnRating,
    ViewOwnStoreRatings,
}

const ANY_ROLE: &[Role] = &Role::ALL;
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const USER_ONLY: &[Role] = &[Role::User];
const STORE_OWNER_ONLY: &[Role] = &[Role::StoreOwner];

impl Operation {
    /// The roles allowed to perform this operation.
    #[must_use]
    pub const fn permitted_roles(self) -> &'static [Role] {
        match self {
            Self::ChangePassword | Self::BrowseStores | Self::ViewStore => ANY_ROLE,
            Self::ListAccounts
            | Self::CreateAccount
            | Self::ViewAccount
            | Self::ListStores
            | Self::CreateStore
            | Self::ViewPlatformStats => ADMIN_ONLY,
            Self::SubmitRating | Self::ViewOwnRating => USER_ONLY,
            Self::ViewOwnStoreRatings => STORE_OWNER_ONLY,
        }
    }

    /// Whether `role` may perform this operation.
    #[must_use]
    pub fn permits(self, role: Role) -> bool {
        self.permitted_roles().contains(&role)
    }
}

/// An [`Operation`] carried at the type level.
pub trait Permission {
    const OPERATION: Operation;
}

macro_rules! permissions {
    ($($name:ident),* $(,)?) => {
        /// One zero-sized marker per [`Operation`], for `Authorized<P>`.
        pub mod permission {
            use super::{Operation, Permission};

            $(
                #[derive(Debug, Clone, Copy)]
                pub struct $name;

                impl Permission for $name {
                    const OPERATION: Operation = Operation::$name;
                }
            )*
        }
    };
}

permissions!(
    ChangePassword,
    ListAccounts,
    CreateAccount,
    ViewAccount,
    ListStores,
    CreateStore,
    ViewPlatformStats,
    BrowseStores,
    ViewStore,
    SubmitRating,
    ViewOwnRating,
    ViewOwnStoreRatings,
);

/// Decide whether `identity` may perform `operation`.
///
/// # Errors
///
/// Returns `AccessError::Unauthenticated` when there is no identity and
/// `AccessError::Forbidden` when its role is not permitted.
pub fn authorize(identity: Option<&Identity>, operation: Operation) -> Result<&Identity, AccessError> {
    let identity = identity.ok_or(AccessError::Unauthenticated)?;

    if !operation.permits(identity.role) {
        tracing::debug!(
            account_id = %identity.id,
            role = %identity.role,
            ?operation,
            "Operation forbidden"
        );
        return Err(AccessError::Forbidden);
    }

    Ok(identity)
}
