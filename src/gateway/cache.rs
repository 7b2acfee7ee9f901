//! Short-lived read cache for dashboard endpoints.
//!
//! Entries are keyed by the exact `(endpoint, query)` pair and expire purely
//! by age. Writes to the backend never invalidate entries; the dispatcher
//! forces a fresh cycle instead, so a stale hit can survive at most one TTL.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

/// Endpoints whose responses may be served from cache. Everything else must
/// always reflect the latest backend state.
pub const CACHEABLE_ENDPOINTS: [&str; 4] = [
    "dashboard-stats",
    "pending-rides",
    "active-rides",
    "available-drivers",
];

pub fn is_cacheable(endpoint: &str) -> bool {
    CACHEABLE_ENDPOINTS.contains(&endpoint)
}

struct CacheEntry {
    payload: Value,
    fetched_at: Instant,
}

/// Age-based response cache.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<(String, String), CacheEntry>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached payload if a fresh entry exists for this key.
    pub fn get(&self, endpoint: &str, query: &str) -> Option<Value> {
        let entries = self.entries.lock();
        let entry = entries.get(&(endpoint.to_string(), query.to_string()))?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Store a payload. The caller is responsible for the allow-list check.
    pub fn put(&self, endpoint: &str, query: &str, payload: Value) {
        let mut entries = self.entries.lock();
        entries.insert(
            (endpoint.to_string(), query.to_string()),
            CacheEntry {
                payload,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop every entry, fresh or not.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
