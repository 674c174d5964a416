//! Injectable TTL cache using moka
//!
//! Replaces module-level memoization (a process-wide "current user" and the
//! like) with an explicit object that is handed to whoever needs it and can
//! be invalidated or dropped in tests.
//!
//! Every invalidation bumps an epoch shared by all clones. A load that
//! overlaps an invalidation returns its value but does not keep it, so a
//! snapshot taken before a write can never outlive that write's invalidation.

use moka::future::Cache;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use treeline_data::{FieldValue, NestedValues};

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache (approximate)
    pub entry_count: u64,
}

/// String-keyed cache with optional time-to-live
///
/// Cloning is cheap and clones share entries.
#[derive(Debug, Clone)]
pub struct TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<String, V>,
    ttl: Option<Duration>,
    epoch: Arc<AtomicU64>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create cache with max capacity and no expiry
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .support_invalidation_closures()
                .build(),
            ttl: None,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create cache whose entries expire `ttl` after insertion
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .support_invalidation_closures()
                .build(),
            ttl: Some(ttl),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Configured time-to-live
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Cached value for `key`
    #[inline]
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).await
    }

    /// Insert or replace
    #[inline]
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.inner.insert(key.into(), value).await;
    }

    /// Cached value, or compute, store and return it
    ///
    /// Errors from `f` are returned and nothing is cached. A value loaded
    /// while any invalidation ran is returned but not cached.
    ///
    /// # Errors
    /// Whatever `f` fails with
    pub async fn get_or_try_insert_with<E, F, Fut>(&self, key: &str, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let value = f().await?;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::trace!(key, "cache invalidated during load, not storing");
            return Ok(value);
        }

        self.insert(key, value.clone()).await;
        // An invalidation between the check and the insert would miss this entry.
        if self.epoch.load(Ordering::SeqCst) != epoch {
            self.inner.invalidate(key).await;
        }
        Ok(value)
    }

    /// Drop one entry
    #[inline]
    pub async fn invalidate(&self, key: &str) {
        self.bump();
        self.inner.invalidate(key).await;
    }

    /// Drop every entry whose key starts with `prefix`
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.bump();
        let prefix = prefix.to_string();
        if let Err(e) = self
            .inner
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix))
        {
            tracing::warn!(error = %e, "prefix invalidation unavailable, clearing cache");
            self.inner.invalidate_all();
        }
    }

    /// Drop all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.bump();
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }

    fn bump(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create cache with default capacity (1,000 entries), no expiry
    fn default() -> Self {
        Self::new(1_000)
    }
}

/// Read-through cache for the client's structured reads
///
/// Single-level and nested reads live in separate caches under the same
/// `container/normalized-key` keys, so an entry always has the shape its
/// read produces. Clones share entries.
#[derive(Debug, Clone)]
pub struct ReadCache {
    values: TtlCache<Option<FieldValue>>,
    nested: TtlCache<Option<NestedValues>>,
}

impl ReadCache {
    /// Create with max capacity per read kind and entry TTL
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            values: TtlCache::with_ttl(max_capacity, ttl),
            nested: TtlCache::with_ttl(max_capacity, ttl),
        }
    }

    /// Cache for `read_value`
    #[inline]
    #[must_use]
    pub fn values(&self) -> &TtlCache<Option<FieldValue>> {
        &self.values
    }

    /// Cache for `read_nested_values`
    #[inline]
    #[must_use]
    pub fn nested(&self) -> &TtlCache<Option<NestedValues>> {
        &self.nested
    }

    /// Entry TTL
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.values.ttl()
    }

    /// Drop `key` from both kinds
    pub async fn invalidate(&self, key: &str) {
        self.values.invalidate(key).await;
        self.nested.invalidate(key).await;
    }

    /// Drop every key starting with `prefix` from both kinds
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.values.invalidate_prefix(prefix);
        self.nested.invalidate_prefix(prefix);
    }

    /// Combined statistics of both kinds
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.values.stats().entry_count + self.nested.stats().entry_count,
        }
    }
}
