//! Treeline client
//!
//! [`Treeline`] is the single entry point presentation code talks to. It
//! owns the engine, extractor and writer over one shared store and applies
//! the caller-facing policies: writes report a plain success flag and log
//! their failures, reads can go through an optional [`ReadCache`].

use crate::cache::ReadCache;
use crate::config::TreelineConfig;
use crate::error::{TreelineError, TreelineResult};
use std::sync::Arc;
use std::time::Duration;
use treeline_cascade::{CascadeEngine, CascadePath};
use treeline_data::{DataExtractor, DataWriter, FieldValue, NestedValues, WriteOutcome};
use treeline_header::{normalize, HeaderFormat};
use treeline_tree::{NodeId, TreeStore};

/// Read cache TTL used by [`Treeline::with_default_read_cache`]
pub const DEFAULT_READ_CACHE_TTL: Duration = Duration::from_secs(30);

/// Path cascading and structured data over a host store
#[derive(Clone)]
pub struct Treeline {
    store: Arc<dyn TreeStore>,
    engine: CascadeEngine,
    extractor: DataExtractor,
    writer: DataWriter,
    config: TreelineConfig,
    cache: Option<ReadCache>,
}

impl Treeline {
    /// Create client over a store
    ///
    /// The read cache is enabled when `config.read_cache_ttl_ms` is set.
    #[must_use]
    pub fn new(store: Arc<dyn TreeStore>, config: TreelineConfig) -> Self {
        let cache = config
            .read_cache_ttl()
            .map(|ttl| ReadCache::with_ttl(config.read_cache_capacity, ttl));

        Self {
            engine: CascadeEngine::new(store.clone(), config.cascade),
            extractor: DataExtractor::new(store.clone()),
            writer: DataWriter::new(store.clone()).with_config(config.cascade),
            store,
            config,
            cache,
        }
    }

    /// Use `cache` for reads, replacing any configured one
    ///
    /// The cache may be shared with other clients over the same store.
    #[inline]
    #[must_use]
    pub fn with_read_cache(mut self, cache: ReadCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enable a private read cache with [`DEFAULT_READ_CACHE_TTL`]
    #[must_use]
    pub fn with_default_read_cache(self) -> Self {
        let capacity = self.config.read_cache_capacity;
        self.with_read_cache(ReadCache::with_ttl(capacity, DEFAULT_READ_CACHE_TTL))
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TreeStore> {
        &self.store
    }

    /// Client configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TreelineConfig {
        &self.config
    }

    /// Read cache, if enabled
    #[inline]
    #[must_use]
    pub fn read_cache(&self) -> Option<&ReadCache> {
        self.cache.as_ref()
    }

    /// Ensure `segments` exists as a path and return the leaf id
    ///
    /// Creates only the missing levels. Repeating a call that already
    /// converged performs no writes.
    ///
    /// # Errors
    /// - `CascadeError::InvalidPath` for an empty path or blank segment,
    ///   before any store call
    /// - `CascadeError::Timeout` when the path did not converge in time
    pub async fn cascade_to_path<S: AsRef<str>>(&self, segments: &[S]) -> TreelineResult<NodeId> {
        let id = self
            .engine
            .cascade(segments.iter().map(|s| s.as_ref().to_string()))
            .await?;
        Ok(id)
    }

    /// Same as [`cascade_to_path`](Self::cascade_to_path) for a validated path
    ///
    /// # Errors
    /// `CascadeError::Timeout` when the path did not converge in time
    pub async fn ensure_path(&self, path: &CascadePath) -> TreelineResult<NodeId> {
        Ok(self.engine.cascade_to_path(path).await?)
    }

    /// Value(s) stored under `key` in `container`
    ///
    /// # Errors
    /// Store errors from the reads
    pub async fn read_value(&self, container: &NodeId, key: &str) -> TreelineResult<Option<FieldValue>> {
        let load = move || async move { Ok::<_, TreelineError>(self.extractor.find_value(container, key).await?) };
        match &self.cache {
            Some(cache) => {
                cache
                    .values()
                    .get_or_try_insert_with(&cache_key(container, key), load)
                    .await
            }
            None => load().await,
        }
    }

    /// Category → value map stored under `parent_key` in `container`
    ///
    /// `None` when the header is missing; categories never written are
    /// absent from the map.
    ///
    /// # Errors
    /// Store errors from the reads
    pub async fn read_nested_values(
        &self,
        container: &NodeId,
        parent_key: &str,
    ) -> TreelineResult<Option<NestedValues>> {
        let load = move || async move {
            Ok::<_, TreelineError>(self.extractor.find_nested_values(container, parent_key).await?)
        };
        match &self.cache {
            Some(cache) => {
                cache
                    .nested()
                    .get_or_try_insert_with(&cache_key(container, parent_key), load)
                    .await
            }
            None => load().await,
        }
    }

    /// Every header-shaped child of `container` with its values
    ///
    /// Not cached.
    ///
    /// # Errors
    /// Store errors from the reads
    pub async fn read_all(&self, container: &NodeId) -> TreelineResult<NestedValues> {
        Ok(self.extractor.read_all(container).await?)
    }

    /// Replace the value(s) under `key`; `true` on success
    ///
    /// `attribute_format` picks `Key::` over `**Key:**` for a header that
    /// has to be created. Failures are logged.
    pub async fn write_value(
        &self,
        container: &NodeId,
        key: &str,
        value: impl Into<FieldValue>,
        attribute_format: bool,
    ) -> bool {
        let format = HeaderFormat::from_attribute_flag(attribute_format);
        match self.try_write_value(container, key, value, format).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%container, key, error = %e, "write_value failed");
                false
            }
        }
    }

    /// [`write_value`](Self::write_value) in the configured default format
    pub async fn write_value_with_default_format(
        &self,
        container: &NodeId,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> bool {
        let attribute = self.config.default_format == HeaderFormat::Attribute;
        self.write_value(container, key, value, attribute).await
    }

    /// Replace the value(s) under `key`, returning the error on failure
    ///
    /// # Errors
    /// Invalid key or any store error
    pub async fn try_write_value(
        &self,
        container: &NodeId,
        key: &str,
        value: impl Into<FieldValue>,
        format: HeaderFormat,
    ) -> TreelineResult<()> {
        let result = self.writer.set_value(container, key, value, format).await;
        self.forget(container, &[key]).await;
        Ok(result?)
    }

    /// Replace every category under `parent_key`; `true` if at least one
    /// category was written or `values` is empty
    ///
    /// Per-category failures are logged and do not stop the others.
    pub async fn write_nested_values(
        &self,
        container: &NodeId,
        parent_key: &str,
        values: &NestedValues,
        attribute_format: bool,
    ) -> bool {
        let format = HeaderFormat::from_attribute_flag(attribute_format);
        match self.try_write_nested_values(container, parent_key, values, format).await {
            Ok(outcome) => {
                for (category, error) in &outcome.failed {
                    tracing::warn!(%container, parent_key, category = %category, %error, "category not written");
                }
                outcome.is_success()
            }
            Err(e) => {
                tracing::warn!(%container, parent_key, error = %e, "write_nested_values failed");
                false
            }
        }
    }

    /// [`write_nested_values`](Self::write_nested_values) in the configured
    /// default format
    pub async fn write_nested_values_with_default_format(
        &self,
        container: &NodeId,
        parent_key: &str,
        values: &NestedValues,
    ) -> bool {
        let attribute = self.config.default_format == HeaderFormat::Attribute;
        self.write_nested_values(container, parent_key, values, attribute).await
    }

    /// Replace every category under `parent_key` and report per category
    ///
    /// # Errors
    /// Invalid parent key, or a store error before any category was attempted
    pub async fn try_write_nested_values(
        &self,
        container: &NodeId,
        parent_key: &str,
        values: &NestedValues,
        format: HeaderFormat,
    ) -> TreelineResult<WriteOutcome> {
        let result = self
            .writer
            .set_nested_values(container, parent_key, values, format)
            .await;
        self.forget(container, &[parent_key]).await;
        Ok(result?)
    }

    /// Cascade `segments`, then write `value` under `key` at the leaf
    ///
    /// Returns the leaf id.
    ///
    /// # Errors
    /// Cascade errors, invalid key or store errors from the write
    pub async fn write_value_at_path<S: AsRef<str>>(
        &self,
        segments: &[S],
        key: &str,
        value: impl Into<FieldValue>,
        format: HeaderFormat,
    ) -> TreelineResult<NodeId> {
        let container = self.cascade_to_path(segments).await?;
        self.try_write_value(&container, key, value, format).await?;
        Ok(container)
    }

    /// Delete `key` and its values; returns whether it existed
    ///
    /// # Errors
    /// Store errors from the read or delete
    pub async fn remove_value(&self, container: &NodeId, key: &str) -> TreelineResult<bool> {
        let result = self.writer.remove_value(container, key).await;
        self.forget(container, &[key]).await;
        Ok(result?)
    }

    /// Rename `old_key` to `new_key` keeping its values; returns whether
    /// `old_key` existed
    ///
    /// # Errors
    /// Invalid new key or store errors
    pub async fn rename_key(
        &self,
        container: &NodeId,
        old_key: &str,
        new_key: &str,
        format: HeaderFormat,
    ) -> TreelineResult<bool> {
        let result = self.writer.rename_key(container, old_key, new_key, format).await;
        self.forget(container, &[old_key, new_key]).await;
        Ok(result?)
    }

    /// Drop every cached read for `container`
    ///
    /// For hosts that change the store without going through this client.
    pub fn invalidate_container(&self, container: &NodeId) {
        if let Some(cache) = &self.cache {
            cache.invalidate_prefix(&format!("{container}/"));
        }
    }

    // Keys are compared normalized, so "Tags", "tags" and "**Tags:**" share entries.
    async fn forget(&self, container: &NodeId, keys: &[&str]) {
        let Some(cache) = &self.cache else {
            return;
        };
        for key in keys {
            cache.invalidate(&cache_key(container, key)).await;
        }
    }
}

fn cache_key(container: &NodeId, key: &str) -> String {
    format!("{container}/{}", normalize(key))
}

impl std::fmt::Debug for Treeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Treeline")
            .field("config", &self.config)
            .field("read_cache_ttl", &self.cache.as_ref().and_then(ReadCache::ttl))
            .finish_non_exhaustive()
    }
}
