//! Local caching of fetched dashboard data.
//!
//! Fetched users and catalog items are written to disk so the dashboard
//! renders immediately on the next start while a background refresh runs.

pub mod manager;

pub use manager::{CacheAges, CacheManager, CachedData};
