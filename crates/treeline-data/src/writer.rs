//! Data writing
//!
//! [`DataWriter`] writes single-level and two-level key/value data with
//! full-replace semantics: callers always supply the complete value set.
//!
//! Every create is confirmed the way a cascade confirms a level: the writer
//! re-reads the parent until the new node shows up, and never issues a
//! second create for a header it already claimed. The wait is bounded by
//! [`CascadeConfig`].
//!
//! Clearing and rewriting are two awaited steps, not a transaction. If the
//! process stops between them the header is left with partial children.

use crate::error::{DataError, DataResult};
use crate::value::{FieldValue, NestedValues};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use treeline_cascade::{CascadeConfig, PendingClaim};
use treeline_header::{normalize, HeaderFormat, HeaderMatcher, HeaderPattern};
use treeline_tree::{NodeId, TreeStore};

/// Depth of a header below its container
const HEADER_LEVEL: usize = 1;

/// Per-field result of a nested write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Categories written completely
    pub written: Vec<String>,
    /// Categories that failed, with the first error hit
    pub failed: Vec<(String, DataError)>,
}

impl WriteOutcome {
    /// True when at least one field was written, or there was nothing to write
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.written.is_empty() || self.failed.is_empty()
    }

    /// True when every field was written
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes header → value data
#[derive(Clone)]
pub struct DataWriter {
    store: Arc<dyn TreeStore>,
    matcher: HeaderMatcher,
    config: CascadeConfig,
}

impl DataWriter {
    /// Create writer over a store with default visibility timing
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self {
            store,
            matcher: HeaderMatcher::new(),
            config: CascadeConfig::default(),
        }
    }

    /// With visibility timing (bound and re-read interval)
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = config;
        self
    }

    /// Visibility timing
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Find the header for `key` under `container`, creating it if missing
    ///
    /// An existing header is reused whatever syntax it was written in. A new
    /// one is appended after the container's current children, at most once
    /// per call, and returned only after a fresh read shows it.
    ///
    /// # Errors
    /// - `DataError::InvalidKey` for a blank key
    /// - `DataError::NotVisible` if the created header never shows up
    /// - store errors from the reads or the create
    pub async fn ensure_header(
        &self,
        container: &NodeId,
        key: &str,
        format: HeaderFormat,
    ) -> DataResult<NodeId> {
        validate_key(key)?;
        let pattern = HeaderPattern::for_key(key);
        let started = Instant::now();
        let mut claim: Option<PendingClaim> = None;

        loop {
            let children = self.store.get_children(container).await?;
            if let Some(found) = self.matcher.match_key(&children, &pattern) {
                return Ok(found.id.clone());
            }

            match &claim {
                None => {
                    let text = format.render(key.trim());
                    let id = self.store.create_child(container, &text, children.len()).await?;
                    tracing::debug!(%container, %id, header = %text, "created header");
                    claim = Some(PendingClaim::child(HEADER_LEVEL, container.clone(), text));
                }
                Some(pending) => {
                    if started.elapsed() >= self.config.timeout {
                        return Err(self.not_visible(pending.clone(), started));
                    }
                    tracing::debug!(claim = %pending, "header not visible yet");
                    sleep(self.config.retry_interval).await;
                }
            }
        }
    }

    /// Replace everything under `key` with `value`
    ///
    /// A single value is written as a one-element list. Values are created
    /// in input order with orders `0..n` and confirmed before returning.
    ///
    /// # Errors
    /// Invalid key, `NotVisible`, or any store error; a failure after the
    /// clear leaves the header with whatever was written so far
    pub async fn set_value(
        &self,
        container: &NodeId,
        key: &str,
        value: impl Into<FieldValue>,
        format: HeaderFormat,
    ) -> DataResult<()> {
        let values = value.into().into_values();
        let header = self.ensure_header(container, key, format).await?;
        self.clear_children(&header).await?;
        self.write_children(&header, HEADER_LEVEL + 1, &values).await?;
        tracing::info!(%container, key, count = values.len(), "wrote value");
        Ok(())
    }

    /// Replace every category under `parent_key` with `values`
    ///
    /// Categories are created in map order with orders `0..n`, each with its
    /// value(s) below it. A failing category is logged and skipped; the rest
    /// are still written.
    ///
    /// # Errors
    /// Invalid key, or a store error while resolving or clearing the parent
    /// header. Per-category failures are reported in the [`WriteOutcome`]
    pub async fn set_nested_values(
        &self,
        container: &NodeId,
        parent_key: &str,
        values: &NestedValues,
        format: HeaderFormat,
    ) -> DataResult<WriteOutcome> {
        let header = self.ensure_header(container, parent_key, format).await?;
        self.clear_children(&header).await?;

        let mut outcome = WriteOutcome::default();
        for (order, (category, value)) in values.iter().enumerate() {
            match self.write_category(&header, order, category, value, format).await {
                Ok(()) => outcome.written.push(category.clone()),
                Err(e) => {
                    tracing::warn!(%container, parent_key, category = %category, error = %e, "category write failed");
                    outcome.failed.push((category.clone(), e));
                }
            }
        }

        tracing::info!(
            %container,
            parent_key,
            written = outcome.written.len(),
            failed = outcome.failed.len(),
            "wrote nested values"
        );
        Ok(outcome)
    }

    /// Delete the header for `key` and everything below it
    ///
    /// Returns whether a header was found.
    ///
    /// # Errors
    /// Store errors from the read or delete
    pub async fn remove_value(&self, container: &NodeId, key: &str) -> DataResult<bool> {
        let children = self.store.get_children(container).await?;
        let Some(header) = self.matcher.match_key(&children, &HeaderPattern::for_key(key)) else {
            return Ok(false);
        };
        self.store.delete_node(&header.id).await?;
        tracing::info!(%container, key, "removed value");
        Ok(true)
    }

    /// Rewrite the header text of `old_key` as `new_key` in `format`,
    /// keeping its values
    ///
    /// Returns whether a header was found.
    ///
    /// # Errors
    /// `DataError::InvalidKey` for a blank new key, or store errors
    pub async fn rename_key(
        &self,
        container: &NodeId,
        old_key: &str,
        new_key: &str,
        format: HeaderFormat,
    ) -> DataResult<bool> {
        validate_key(new_key)?;
        let children = self.store.get_children(container).await?;
        let Some(header) = self.matcher.match_key(&children, &HeaderPattern::for_key(old_key)) else {
            return Ok(false);
        };
        self.store
            .update_text(&header.id, &format.render(new_key.trim()))
            .await?;
        Ok(true)
    }

    async fn write_category(
        &self,
        header: &NodeId,
        order: usize,
        category: &str,
        value: &FieldValue,
        format: HeaderFormat,
    ) -> DataResult<()> {
        validate_key(category)?;
        let text = format.render(category.trim());
        let id = self.store.create_child(header, &text, order).await?;
        self.write_children(&id, HEADER_LEVEL + 2, &value.as_list()).await?;
        self.confirm(header, HEADER_LEVEL + 1, &[(id, text)]).await
    }

    async fn clear_children(&self, header: &NodeId) -> DataResult<()> {
        let children = self.store.get_children(header).await?;
        for child in &children {
            self.store.delete_node(&child.id).await?;
        }
        if !children.is_empty() {
            tracing::debug!(%header, cleared = children.len(), "cleared header children");
        }
        Ok(())
    }

    async fn write_children<S: AsRef<str> + Sync>(
        &self,
        parent: &NodeId,
        level: usize,
        values: &[S],
    ) -> DataResult<()> {
        let mut created = Vec::with_capacity(values.len());
        for (order, value) in values.iter().enumerate() {
            let id = self.store.create_child(parent, value.as_ref(), order).await?;
            created.push((id, value.as_ref().to_string()));
        }
        self.confirm(parent, level, &created).await
    }

    /// Re-read `parent` until every node in `created` shows up
    async fn confirm(&self, parent: &NodeId, level: usize, created: &[(NodeId, String)]) -> DataResult<()> {
        if created.is_empty() {
            return Ok(());
        }
        let started = Instant::now();

        loop {
            let children = self.store.get_children(parent).await?;
            let Some((_, text)) = created
                .iter()
                .find(|(id, _)| !children.iter().any(|c| c.id == *id))
            else {
                return Ok(());
            };

            let claim = PendingClaim::child(level, parent.clone(), text.as_str());
            if started.elapsed() >= self.config.timeout {
                return Err(self.not_visible(claim, started));
            }
            tracing::debug!(%claim, "write not visible yet");
            sleep(self.config.retry_interval).await;
        }
    }

    fn not_visible(&self, claim: PendingClaim, started: Instant) -> DataError {
        let elapsed = started.elapsed();
        tracing::error!(%claim, ?elapsed, timeout = ?self.config.timeout, "write never became visible");
        DataError::NotVisible { claim, elapsed }
    }
}

impl std::fmt::Debug for DataWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataWriter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn validate_key(key: &str) -> DataResult<()> {
    if normalize(key).is_empty() {
        return Err(DataError::InvalidKey(key.to_string()));
    }
    Ok(())
}
