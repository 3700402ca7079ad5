//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the GeoStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{GeoStore, StorageResult};
use crate::storage::CacheEntry;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite geolocation cache backend
pub struct SqliteGeoStore {
    conn: Connection,
}

impl SqliteGeoStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl GeoStore for SqliteGeoStore {
    fn load_all(&self) -> StorageResult<Vec<CacheEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT ip, city, country FROM geo_cache ORDER BY ip")?;

        let rows = stmt.query_map([], |row| {
            Ok(CacheEntry {
                ip: row.get(0)?,
                city: row.get(1)?,
                country: row.get(2)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn insert_entries(&mut self, entries: &[CacheEntry]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO geo_cache (ip, city, country, resolved_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for entry in entries {
                inserted += stmt.execute(params![entry.ip, entry.city, entry.country, now])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}
