//! Persistent geolocation cache
//!
//! Resolved locations are kept in memory for the whole run and written to a
//! [`GeoStore`] on [`GeoCache::flush`]. An entry is never replaced once
//! present: the first answer for an IP stays the answer for this run and
//! every later one.

use crate::geo::Location;
use crate::storage::{CacheEntry, GeoStore, StorageResult};
use std::collections::HashMap;

/// IP to location map with write-behind persistence
pub struct GeoCache {
    entries: HashMap<String, Location>,
    pending: Vec<String>,
    store: Option<Box<dyn GeoStore>>,
}

impl GeoCache {
    /// A cache that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            entries: HashMap::new(),
            pending: Vec::new(),
            store: None,
        }
    }

    /// Loads every stored entry and keeps the store for later flushes
    pub fn load<S: GeoStore + 'static>(store: S) -> StorageResult<Self> {
        let entries = store
            .load_all()?
            .into_iter()
            .map(|e| {
                (
                    e.ip,
                    Location {
                        city: e.city,
                        country: e.country,
                    },
                )
            })
            .collect::<HashMap<_, _>>();

        tracing::info!("Loaded {} cached IP locations", entries.len());

        Ok(Self {
            entries,
            pending: Vec::new(),
            store: Some(Box::new(store)),
        })
    }

    pub fn get(&self, ip: &str) -> Option<&Location> {
        self.entries.get(ip)
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.entries.contains_key(ip)
    }

    /// Records a resolved location; returns false if the IP was already known
    pub fn insert(&mut self, ip: &str, location: Location) -> bool {
        if self.entries.contains_key(ip) {
            return false;
        }
        self.entries.insert(ip.to_string(), location);
        self.pending.push(ip.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries not yet written to the store
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Writes pending entries to the store and returns how many were written
    pub fn flush(&mut self) -> StorageResult<usize> {
        let Some(store) = self.store.as_mut() else {
            self.pending.clear();
            return Ok(0);
        };
        if self.pending.is_empty() {
            return Ok(0);
        }

        let batch: Vec<CacheEntry> = self
            .pending
            .iter()
            .filter_map(|ip| {
                self.entries.get(ip).map(|loc| CacheEntry {
                    ip: ip.clone(),
                    city: loc.city.clone(),
                    country: loc.country.clone(),
                })
            })
            .collect();

        let written = store.insert_entries(&batch)?;
        self.pending.clear();
        tracing::debug!("Flushed {} IP locations to the cache store", written);
        Ok(written)
    }
}
