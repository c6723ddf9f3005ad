//! Per-session query cache with moka.
//!
//! Backend query results are cached as serialized JSON, keyed by session and
//! query name, so a page reload or a redirect after a form post does not
//! refetch the whole appointment list. Mutations write through or
//! invalidate the affected key.
//!
//! ## Cache Key Strategy
//!
//! Keys are `"{session_id}:{query}"`, where `query` is one of the names in
//! [`queries`]. Cached data never crosses sessions because the backend may
//! answer differently per caller.

use std::future::Future;
use std::time::Duration;

use clinic_core::BackendError;
use moka::future::Cache;
use serde::{Serialize, de::DeserializeOwned};

/// Default cache capacity (number of entries).
pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Default TTL for cached entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Extra attempts for the appointment list query.
pub const LIST_RETRIES: u32 = 2;

/// Query names used in cache keys.
pub mod queries {
    pub const APPOINTMENTS: &str = "appointments";
    pub const STAFF: &str = "staff";

    pub const ALL: [&str; 2] = [APPOINTMENTS, STAFF];
}

/// Cached query result with metadata.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    /// Serialized JSON value.
    pub json: String,
    /// When this entry was cached.
    pub cached_at: chrono::DateTime<chrono::Utc>,
}

/// Query cache shared by all sessions.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<String, CachedEntry>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL)
    }
}

impl QueryCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }

    pub fn key(session_id: &str, query: &str) -> String {
        format!("{session_id}:{query}")
    }

    /// Cached value for `key`, if present and readable.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key).await?;
        match serde_json::from_str(&entry.json) {
            Ok(value) => {
                tracing::debug!(key = %key, cached_at = %entry.cached_at, "cache hit");
                Some(value)
            }
            Err(e) => {
                // Corrupted entry: drop it and let the caller refetch.
                tracing::warn!(key = %key, error = %e, "failed to deserialize cached entry");
                self.entries.invalidate(key).await;
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                let entry = CachedEntry {
                    json,
                    cached_at: chrono::Utc::now(),
                };
                self.entries.insert(key.to_string(), entry).await;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to serialize for cache");
            }
        }
    }

    /// Get a cached value or compute and cache it.
    ///
    /// Errors from `compute` are returned as-is and never cached.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &str, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        tracing::debug!(key = %key, "cache miss, computing");
        let value = compute().await?;
        self.put(key, &value).await;
        Ok(value)
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Drop every cached query belonging to a session.
    pub async fn invalidate_session(&self, session_id: &str) {
        for query in queries::ALL {
            self.entries
                .invalidate(&Self::key(session_id, query))
                .await;
        }
    }
}

/// Run `op`, retrying up to `retries` more times after `delay`.
///
/// Authorization failures are returned immediately: asking again will not
/// change the caller's permissions.
pub async fn with_retry<T, F, Fut>(
    retries: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_authorization() || attempt >= retries => return Err(err),
            Err(err) => {
                attempt += 1;
                tracing::warn!(attempt, error = %err, "backend query failed, retrying");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_cache_hit() {
        let cache = QueryCache::default();
        let key = QueryCache::key("s1", queries::APPOINTMENTS);

        let result: Result<i32, BackendError> =
            cache.get_or_compute(&key, || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);

        let result: Result<i32, BackendError> = cache
            .get_or_compute(&key, || async {
                panic!("compute should not be called on cache hit")
            })
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = QueryCache::default();
        let key = QueryCache::key("s1", queries::STAFF);

        let result: Result<i32, &str> = cache.get_or_compute(&key, || async { Err("down") }).await;
        assert_eq!(result, Err("down"));
        assert_eq!(cache.get::<i32>(&key).await, None);
    }

    #[tokio::test]
    async fn sessions_do_not_share_entries() {
        let cache = QueryCache::default();
        cache
            .put(&QueryCache::key("s1", queries::APPOINTMENTS), &vec![1, 2])
            .await;
        let other: Option<Vec<i32>> = cache
            .get(&QueryCache::key("s2", queries::APPOINTMENTS))
            .await;
        assert_eq!(other, None);
    }

    #[tokio::test]
    async fn invalidate_session_drops_all_queries() {
        let cache = QueryCache::default();
        for query in queries::ALL {
            cache.put(&QueryCache::key("s1", query), &1).await;
        }
        cache.put(&QueryCache::key("s2", queries::STAFF), &2).await;

        cache.invalidate_session("s1").await;

        for query in queries::ALL {
            assert_eq!(cache.get::<i32>(&QueryCache::key("s1", query)).await, None);
        }
        assert_eq!(
            cache.get::<i32>(&QueryCache::key("s2", queries::STAFF)).await,
            Some(2)
        );
    }

    #[tokio::test]
    async fn corrupted_entry_is_dropped() {
        let cache = QueryCache::default();
        cache.put("s1:appointments", &"not a number").await;
        assert_eq!(cache.get::<i32>("s1:appointments").await, None);
        assert_eq!(cache.get::<String>("s1:appointments").await, None);
    }

    #[tokio::test]
    async fn retry_recovers_from_transient_failure() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retry(LIST_RETRIES, Duration::ZERO, move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(BackendError::Unavailable("flaky".to_string()))
            } else {
                Ok("ok")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_gives_up_after_limit() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(LIST_RETRIES, Duration::ZERO, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::Unavailable("down".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_skips_authorization_errors() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(LIST_RETRIES, Duration::ZERO, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::Rejected(
                "Unauthorized: Only staff can view appointments".to_string(),
            ))
        })
        .await;
        assert!(result.unwrap_err().is_authorization());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
