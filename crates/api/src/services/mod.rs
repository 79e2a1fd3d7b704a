//! Business logic services.
//!
//! Services are constructed per request from the shared pool and borrow it;
//! they hold no state of their own.
//!
//! - [`auth`] - Credentials, tokens, and account creation
//! - [`access`] - Which role may perform which operation
//! - [`ratings`] - Rating submission, averages, and the owner dashboard
//! - [`admin`] - Store creation, listings, and platform statistics

pub mod access;
pub mod admin;
pub mod auth;
pub mod ratings;

pub use access::{AccessError, Operation, Permission, authorize, permission};
pub use admin::{AdminError, AdminService, StoreInput};
pub use auth::{AccountInput, AuthError, AuthService, AuthSession, TokenError, TokenKeys};
pub use ratings::{RatingError, RatingService};
