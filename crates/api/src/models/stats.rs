//! Platform-wide counters for the admin dashboard.

use serde::Serialize;

/// Row counts across the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub account_count: i64,
    pub store_count: i64,
    pub rating_count: i64,
    /// Stores with at least one rating.
    pub rated_store_count: i64,
}
