//! Storage traits and error types
//!
//! This module defines the trait interface for geolocation cache backends
//! and associated error types.

use crate::storage::CacheEntry;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend for the persistent geolocation cache
///
/// Entries are keyed by IP and never updated: inserting an IP that is
/// already stored leaves the stored row untouched.
pub trait GeoStore {
    /// Loads every stored entry
    fn load_all(&self) -> StorageResult<Vec<CacheEntry>>;

    /// Inserts entries, skipping IPs already present
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted
    fn insert_entries(&mut self, entries: &[CacheEntry]) -> StorageResult<usize>;
}
