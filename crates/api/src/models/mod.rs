//! Domain models for the ratings service.
//!
//! These are the read models handed to services and serialized to clients.
//! Database row types stay private to the `db` module and are converted into
//! these via `TryFrom`.

pub mod account;
pub mod rating;
pub mod stats;
pub mod store;

pub use account::{Account, AccountDetail, AccountFilter, Identity, NewAccount};
pub use rating::{OwnedStoreRatings, Rating, StoreRating};
pub use stats::PlatformStats;
pub use store::{BrowsableStore, NewStore, Store, StoreFilter, StoreSummary};
