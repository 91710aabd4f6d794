//! Cache-aside resolution: serve cached, fetch fresh, or fall back to stale

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{CacheEntry, CachePolicy, CacheSlot, Clock};

/// Outcome of resolving one request against a cache slot
#[derive(Debug)]
pub enum Resolution<T> {
    /// Fresh entry served without touching upstream
    Cached {
        entry: Arc<CacheEntry<T>>,
        age_secs: i64,
    },
    /// Upstream fetch succeeded and the slot was updated
    Fresh { entry: Arc<CacheEntry<T>> },
    /// Upstream failed; the last good entry is served past its window
    Stale {
        entry: Arc<CacheEntry<T>>,
        age_secs: i64,
        error: String,
    },
    /// Upstream failed and nothing has ever been cached
    Unavailable { error: String },
}

/// Resolves a request for `endpoint` using the cache-aside pattern
///
/// # Behavior
/// - A fresh entry (inside the window, and on the same UTC day for
///   date-keyed policies) is served as-is
/// - Otherwise `fetch` runs exactly once; success replaces the entry
/// - On failure an existing entry of any age is served as stale
/// - With no entry at all the caller decides on a fallback
pub async fn resolve<T, E, F, Fut>(
    endpoint: &'static str,
    slot: &CacheSlot<T>,
    policy: CachePolicy,
    clock: &dyn Clock,
    fetch: F,
) -> Resolution<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let now = clock.now();
    let key = policy
        .date_keyed
        .then(|| now.date_naive().format("%Y-%m-%d").to_string());

    if let Some(entry) = slot.read() {
        if entry.is_fresh(now, policy.window(), key.as_deref()) {
            let age_secs = entry.age(now).num_seconds();
            debug!(endpoint, age_secs, "cache hit");
            return Resolution::Cached { entry, age_secs };
        }
    }

    match fetch().await {
        Ok(data) => {
            let entry = slot.write(data, clock.now(), key);
            info!(endpoint, "refreshed from upstream");
            Resolution::Fresh { entry }
        }
        Err(err) => {
            let error = err.to_string();
            match slot.read() {
                Some(entry) => {
                    let age_secs = entry.age(clock.now()).num_seconds();
                    warn!(endpoint, %error, age_secs, "upstream failed, serving stale cache");
                    Resolution::Stale {
                        entry,
                        age_secs,
                        error,
                    }
                }
                None => {
                    warn!(endpoint, %error, "upstream failed with nothing cached");
                    Resolution::Unavailable { error }
                }
            }
        }
    }
}
