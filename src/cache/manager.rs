//! Single-slot in-memory cache for one endpoint's payload
//!
//! Provides a `CacheSlot` that holds the last successfully fetched payload
//! together with its fetch timestamp and an optional key (the UTC calendar
//! date for day-keyed endpoints).

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// A cached payload and the metadata needed to judge its freshness
#[derive(Debug)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub data: T,
    /// When the payload was fetched from upstream
    pub cached_at: DateTime<Utc>,
    /// Optional discriminator, e.g. "2025-03-03" for day-keyed caches
    pub key: Option<String>,
}

impl<T> CacheEntry<T> {
    /// Seconds elapsed since the payload was fetched
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cached_at
    }

    /// Whether the entry is still inside `window` and matches `key`
    ///
    /// A `None` key is only compared when the caller asks for one, so
    /// undated caches ignore the key entirely.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration, key: Option<&str>) -> bool {
        if self.age(now) >= window {
            return false;
        }
        match key {
            Some(expected) => self.key.as_deref() == Some(expected),
            None => true,
        }
    }
}

/// Process-lifetime cache slot for a single endpoint
///
/// Readers get an `Arc` snapshot of the whole entry, so a concurrent
/// `write` can never expose a half-updated payload. No lock is held across
/// an upstream fetch: two requests racing on an empty slot will both fetch
/// and the last writer wins.
#[derive(Debug)]
pub struct CacheSlot<T> {
    entry: RwLock<Option<Arc<CacheEntry<T>>>>,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CacheSlot<T> {
    /// Creates an empty slot (cold start)
    pub fn new() -> Self {
        Self {
            entry: RwLock::new(None),
        }
    }

    /// Returns the current entry, expired or not
    pub fn read(&self) -> Option<Arc<CacheEntry<T>>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the entry and returns the new snapshot
    pub fn write(&self, data: T, now: DateTime<Utc>, key: Option<String>) -> Arc<CacheEntry<T>> {
        let entry = Arc::new(CacheEntry {
            data,
            cached_at: now,
            key,
        });
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&entry));
        entry
    }

    /// Whether anything has ever been written
    pub fn is_populated(&self) -> bool {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
