//! TTL-bounded response cache.
//!
//! Memoizes remote read responses in the `response_cache` table. Expiry is
//! lazy: an entry past its TTL is deleted the next time it is read. The
//! periodic `sweep_expired` pass exists so entries that are written but
//! never read again do not accumulate forever.

use crate::error::StoreResult;
use crate::store::Store;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default time-to-live for cached responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Key→value cache with per-entry TTL, backed by the shared store.
pub struct ResponseCache {
    store: Arc<Store>,
}

impl ResponseCache {
    /// Creates a cache over the shared store.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Stores `data` under `key`, overwriting any existing entry.
    /// `ttl` defaults to [`DEFAULT_CACHE_TTL`].
    pub fn put<T: Serialize>(&self, key: &str, data: &T, ttl: Option<Duration>) -> StoreResult<()> {
        let ttl_ms = ttl.unwrap_or(DEFAULT_CACHE_TTL).as_millis() as i64;
        let json = serde_json::to_string(data)?;
        self.store.lock().execute(
            "INSERT INTO response_cache (key, data, timestamp_ms, ttl_ms) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, \
             timestamp_ms = excluded.timestamp_ms, ttl_ms = excluded.ttl_ms",
            params![key, json, now_ms(), ttl_ms],
        )?;
        Ok(())
    }

    /// Returns the cached value for `key`, or `None` if absent or expired.
    /// An expired entry is deleted on the way out.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let conn = self.store.lock();
        let row: Option<(String, i64, i64)> = conn
            .query_row(
                "SELECT data, timestamp_ms, ttl_ms FROM response_cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((json, timestamp_ms, ttl_ms)) = row else {
            return Ok(None);
        };

        if now_ms() - timestamp_ms > ttl_ms {
            conn.execute("DELETE FROM response_cache WHERE key = ?1", params![key])?;
            debug!(key, "evicted expired cache entry");
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Deletes every expired entry and returns how many were removed.
    pub fn sweep_expired(&self) -> StoreResult<usize> {
        let removed = self.store.lock().execute(
            "DELETE FROM response_cache WHERE ?1 - timestamp_ms > ttl_ms",
            params![now_ms()],
        )?;
        if removed > 0 {
            debug!(removed, "swept expired cache entries");
        }
        Ok(removed)
    }

    /// Number of entries currently stored, expired or not.
    pub fn len(&self) -> StoreResult<usize> {
        let count: i64 =
            self.store
                .lock()
                .query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
