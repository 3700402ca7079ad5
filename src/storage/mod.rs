//! Storage module for persisting geolocation results
//!
//! This module handles the on-disk side of the geolocation cache:
//! - SQLite database initialization and schema management
//! - Loading every known IP location at run start
//! - Append-only inserts of newly resolved IPs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteGeoStore;
pub use traits::{GeoStore, StorageError, StorageResult};

use std::path::Path;

/// Opens (or creates) the geolocation cache database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_cache_store(path: &Path) -> StorageResult<SqliteGeoStore> {
    SqliteGeoStore::new(path)
}

/// One persisted IP location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub ip: String,
    pub city: String,
    pub country: String,
}
