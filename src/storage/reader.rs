//! Read side for year documents.
//!
//! Guards year lookups against anything but a four digit year before the
//! filesystem is touched, and keeps parsed documents in a TTL cache that
//! is invalidated after re-ingestion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{AppError, Result};
use crate::models::HolidayRecord;
use crate::storage::{HolidayStorage, LocalStorage, is_valid_year};

const DEFAULT_MAX_ENTRIES: usize = 64;

#[derive(Clone)]
struct CachedYear {
    records: Arc<Vec<HolidayRecord>>,
    created_at: Instant,
}

/// Keyed TTL cache of parsed year documents.
pub struct YearCache {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<String, CachedYear>,
}

impl YearCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, year: &str) -> Option<Arc<Vec<HolidayRecord>>> {
        self.evict_expired();
        self.entries.get(year).map(|e| Arc::clone(&e.records))
    }

    pub fn insert(&mut self, year: String, records: Arc<Vec<HolidayRecord>>) {
        if self.ttl.is_zero() || self.max_entries == 0 {
            return;
        }
        self.evict_expired();
        if self.entries.len() >= self.max_entries {
            if let Some(victim) = self
                .entries
                .iter()
                .min_by_key(|(_, v)| v.created_at)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&victim);
            }
        }
        self.entries.insert(
            year,
            CachedYear {
                records,
                created_at: Instant::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, v| v.created_at.elapsed() <= ttl);
    }
}

/// Cached reader over an output directory.
pub struct HolidayReader {
    storage: LocalStorage,
    cache: Mutex<YearCache>,
}

impl HolidayReader {
    pub fn new(storage: LocalStorage, cache_ttl: Duration) -> Self {
        Self {
            storage,
            cache: Mutex::new(YearCache::new(cache_ttl, DEFAULT_MAX_ENTRIES)),
        }
    }

    /// Records for one year.
    ///
    /// Anything other than four ASCII digits, a missing document, or an
    /// unreadable one is reported as `NotFound`.
    pub async fn holidays_for_year(&self, year: &str) -> Result<Arc<Vec<HolidayRecord>>> {
        if !is_valid_year(year) {
            return Err(AppError::not_found("year must be exactly 4 digits"));
        }

        if let Some(records) = self.cache.lock().ok().and_then(|mut c| c.get(year)) {
            return Ok(records);
        }

        let records = match self.storage.read_year(year).await {
            Ok(Some(records)) => Arc::new(records),
            Ok(None) => {
                log::warn!("No holiday data for {}", year);
                return Err(AppError::not_found(format!("no holiday data for {year}")));
            }
            Err(e) => {
                log::error!("Failed to read holiday data for {}: {}", year, e);
                return Err(AppError::not_found(format!(
                    "holiday data for {year} is unreadable"
                )));
            }
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(year.to_string(), Arc::clone(&records));
        }
        Ok(records)
    }

    /// The year index, empty when it has not been written yet.
    pub async fn years(&self) -> Result<Vec<String>> {
        self.storage.read_index().await
    }

    /// Drop every cached year.
    ///
    /// A caller that keeps a reader alive across ingestion runs calls this
    /// after each run. The CLI builds a reader per command and never needs to.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}
