//! Testing utilities for the treeline workspace
//!
//! Store wrappers that stack over any [`TreeStore`]:
//! - [`RecordingStore`] counts calls per operation
//! - [`LaggyStore`] hides freshly created nodes for a number of reads
//! - [`FaultyStore`] fails scripted operations

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use treeline_tree::{MemoryStore, Node, NodeId, StoreError, StoreResult, TreeStore};

/// Per-operation call counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub resolve_root: usize,
    pub create_root: usize,
    pub get_children: usize,
    pub create_child: usize,
    pub update_text: usize,
    pub delete_node: usize,
}

impl CallCounts {
    /// Calls that change the tree
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.create_root + self.create_child + self.update_text + self.delete_node
    }

    /// Calls that only read
    #[must_use]
    pub fn reads(&self) -> usize {
        self.resolve_root + self.get_children
    }
}

#[derive(Debug, Default)]
struct Counters {
    resolve_root: AtomicUsize,
    create_root: AtomicUsize,
    get_children: AtomicUsize,
    create_child: AtomicUsize,
    update_text: AtomicUsize,
    delete_node: AtomicUsize,
}

/// Counts every call (successful or not) before delegating
#[derive(Debug, Default)]
pub struct RecordingStore<S = MemoryStore> {
    inner: S,
    counters: Counters,
}

impl<S: TreeStore> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counters: Counters::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn counts(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            resolve_root: c.resolve_root.load(Ordering::SeqCst),
            create_root: c.create_root.load(Ordering::SeqCst),
            get_children: c.get_children.load(Ordering::SeqCst),
            create_child: c.create_child.load(Ordering::SeqCst),
            update_text: c.update_text.load(Ordering::SeqCst),
            delete_node: c.delete_node.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl<S: TreeStore> TreeStore for RecordingStore<S> {
    async fn resolve_root_by_title(&self, title: &str) -> StoreResult<Option<NodeId>> {
        self.counters.resolve_root.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_root_by_title(title).await
    }

    async fn create_root(&self, title: &str) -> StoreResult<NodeId> {
        self.counters.create_root.fetch_add(1, Ordering::SeqCst);
        self.inner.create_root(title).await
    }

    async fn get_children(&self, parent: &NodeId) -> StoreResult<Vec<Node>> {
        self.counters.get_children.fetch_add(1, Ordering::SeqCst);
        self.inner.get_children(parent).await
    }

    async fn create_child(&self, parent: &NodeId, text: &str, order: usize) -> StoreResult<NodeId> {
        self.counters.create_child.fetch_add(1, Ordering::SeqCst);
        self.inner.create_child(parent, text, order).await
    }

    async fn update_text(&self, id: &NodeId, text: &str) -> StoreResult<()> {
        self.counters.update_text.fetch_add(1, Ordering::SeqCst);
        self.inner.update_text(id, text).await
    }

    async fn delete_node(&self, id: &NodeId) -> StoreResult<()> {
        self.counters.delete_node.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_node(id).await
    }
}

/// Simulates read-after-write lag
///
/// Every node created through this wrapper stays invisible to
/// `resolve_root_by_title` and `get_children` for the next `lag` reads that
/// would otherwise have returned it.
#[derive(Debug)]
pub struct LaggyStore<S = MemoryStore> {
    inner: S,
    lag: usize,
    hidden: Mutex<HashMap<NodeId, usize>>,
}

impl<S: TreeStore> LaggyStore<S> {
    pub fn new(inner: S, lag: usize) -> Self {
        Self {
            inner,
            lag,
            hidden: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Nodes still hidden from at least one more read
    pub fn hidden_count(&self) -> usize {
        self.hidden.lock().values().filter(|r| **r > 0).count()
    }

    fn hide(&self, id: &NodeId) {
        if self.lag > 0 {
            self.hidden.lock().insert(id.clone(), self.lag);
        }
    }

    /// True if `id` is still hidden; consumes one hidden read
    fn conceal(&self, id: &NodeId) -> bool {
        let mut hidden = self.hidden.lock();
        match hidden.get_mut(id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl<S: TreeStore> TreeStore for LaggyStore<S> {
    async fn resolve_root_by_title(&self, title: &str) -> StoreResult<Option<NodeId>> {
        let found = self.inner.resolve_root_by_title(title).await?;
        Ok(found.filter(|id| !self.conceal(id)))
    }

    async fn create_root(&self, title: &str) -> StoreResult<NodeId> {
        let id = self.inner.create_root(title).await?;
        self.hide(&id);
        Ok(id)
    }

    async fn get_children(&self, parent: &NodeId) -> StoreResult<Vec<Node>> {
        let children = self.inner.get_children(parent).await?;
        Ok(children.into_iter().filter(|n| !self.conceal(&n.id)).collect())
    }

    async fn create_child(&self, parent: &NodeId, text: &str, order: usize) -> StoreResult<NodeId> {
        let id = self.inner.create_child(parent, text, order).await?;
        self.hide(&id);
        Ok(id)
    }

    async fn update_text(&self, id: &NodeId, text: &str) -> StoreResult<()> {
        self.inner.update_text(id, text).await
    }

    async fn delete_node(&self, id: &NodeId) -> StoreResult<()> {
        self.inner.delete_node(id).await
    }
}

/// Fails scripted operations with `StoreError::Unavailable`
#[derive(Debug, Default)]
pub struct FaultyStore<S = MemoryStore> {
    inner: S,
    failing_reads: AtomicUsize,
    fail_all_child_creates: bool,
    failing_texts: HashSet<String>,
}

impl<S: TreeStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_reads: AtomicUsize::new(0),
            fail_all_child_creates: false,
            failing_texts: HashSet::new(),
        }
    }

    /// Fail the next `n` reads (either kind)
    #[must_use]
    pub fn with_failing_reads(self, n: usize) -> Self {
        self.failing_reads.store(n, Ordering::SeqCst);
        self
    }

    /// Every `create_child` fails
    #[must_use]
    pub fn with_failing_child_creates(mut self) -> Self {
        self.fail_all_child_creates = true;
        self
    }

    /// `create_child` fails whenever the text is exactly `text`
    #[must_use]
    pub fn with_failing_text(mut self, text: impl Into<String>) -> Self {
        self.failing_texts.insert(text.into());
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn read_fault(&self) -> StoreResult<()> {
        let tripped = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(StoreError::unavailable("injected read failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<S: TreeStore> TreeStore for FaultyStore<S> {
    async fn resolve_root_by_title(&self, title: &str) -> StoreResult<Option<NodeId>> {
        self.read_fault()?;
        self.inner.resolve_root_by_title(title).await
    }

    async fn create_root(&self, title: &str) -> StoreResult<NodeId> {
        self.inner.create_root(title).await
    }

    async fn get_children(&self, parent: &NodeId) -> StoreResult<Vec<Node>> {
        self.read_fault()?;
        self.inner.get_children(parent).await
    }

    async fn create_child(&self, parent: &NodeId, text: &str, order: usize) -> StoreResult<NodeId> {
        if self.fail_all_child_creates || self.failing_texts.contains(text) {
            return Err(StoreError::unavailable(format!("injected create failure for '{text}'")));
        }
        self.inner.create_child(parent, text, order).await
    }

    async fn update_text(&self, id: &NodeId, text: &str) -> StoreResult<()> {
        self.inner.update_text(id, text).await
    }

    async fn delete_node(&self, id: &NodeId) -> StoreResult<()> {
        self.inner.delete_node(id).await
    }
}

/// Shared empty in-memory store
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Build `root → header → values` directly in a store
pub async fn seed_header(
    store: &dyn TreeStore,
    root_title: &str,
    header_text: &str,
    values: &[&str],
) -> (NodeId, NodeId) {
    let root = match store.resolve_root_by_title(root_title).await.unwrap() {
        Some(id) => id,
        None => store.create_root(root_title).await.unwrap(),
    };
    let order = store.get_children(&root).await.unwrap().len();
    let header = store.create_child(&root, header_text, order).await.unwrap();
    for (i, value) in values.iter().enumerate() {
        store.create_child(&header, value, i).await.unwrap();
    }
    (root, header)
}
