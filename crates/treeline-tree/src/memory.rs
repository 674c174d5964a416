//! In-process tree store
//!
//! [`MemoryStore`] implements [`TreeStore`] over a lock-guarded map. Writes are
//! visible immediately; wrap it in a lagging or faulty store to exercise the
//! eventual-consistency paths.

use crate::node::{Node, NodeId};
use crate::store::{StoreError, StoreResult, TreeStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: HashMap<NodeId, Entry>,
    roots: Vec<NodeId>,
}

impl Inner {
    fn snapshot(&self, id: &NodeId, order: usize) -> Option<Node> {
        self.nodes.get(id).map(|entry| {
            Node::new(id.clone(), entry.text.clone(), order).with_children(entry.children.clone())
        })
    }

    fn order_of(&self, id: &NodeId) -> Option<usize> {
        let entry = self.nodes.get(id)?;
        let siblings = match &entry.parent {
            Some(parent) => &self.nodes.get(parent)?.children,
            None => &self.roots,
        };
        siblings.iter().position(|s| s == id)
    }

    fn remove_subtree(&mut self, id: &NodeId) {
        if let Some(entry) = self.nodes.remove(id) {
            for child in entry.children {
                self.remove_subtree(&child);
            }
        }
    }
}

/// Tree store held entirely in memory
///
/// Sibling `order` is always the node's index among its siblings, so
/// inserting at an occupied position shifts the later siblings down.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes (roots included)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Whether the store holds no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().nodes.is_empty()
    }

    /// Snapshot a node by id
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<Node> {
        let inner = self.inner.read();
        let order = inner.order_of(id)?;
        inner.snapshot(id, order)
    }

    /// Texts of a node's direct children, in order
    ///
    /// Returns an empty list for unknown ids.
    #[must_use]
    pub fn child_texts(&self, id: &NodeId) -> Vec<String> {
        let inner = self.inner.read();
        inner
            .nodes
            .get(id)
            .map(|entry| {
                entry
                    .children
                    .iter()
                    .filter_map(|c| inner.nodes.get(c).map(|e| e.text.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl TreeStore for MemoryStore {
    async fn resolve_root_by_title(&self, title: &str) -> StoreResult<Option<NodeId>> {
        let inner = self.inner.read();
        Ok(inner
            .roots
            .iter()
            .find(|id| inner.nodes.get(*id).is_some_and(|e| e.text == title))
            .cloned())
    }

    async fn create_root(&self, title: &str) -> StoreResult<NodeId> {
        let id = NodeId::generate();
        let mut inner = self.inner.write();
        inner.nodes.insert(
            id.clone(),
            Entry {
                text: title.to_string(),
                parent: None,
                children: Vec::new(),
            },
        );
        inner.roots.push(id.clone());
        tracing::trace!(%id, title, "memory store: created root");
        Ok(id)
    }

    async fn get_children(&self, parent: &NodeId) -> StoreResult<Vec<Node>> {
        let inner = self.inner.read();
        let entry = inner
            .nodes
            .get(parent)
            .ok_or_else(|| StoreError::NotFound(parent.clone()))?;

        Ok(entry
            .children
            .iter()
            .enumerate()
            .filter_map(|(order, child)| inner.snapshot(child, order))
            .collect())
    }

    async fn create_child(&self, parent: &NodeId, text: &str, order: usize) -> StoreResult<NodeId> {
        let id = NodeId::generate();
        let mut inner = self.inner.write();
        let siblings = &mut inner
            .nodes
            .get_mut(parent)
            .ok_or_else(|| StoreError::NotFound(parent.clone()))?
            .children;
        let position = order.min(siblings.len());
        siblings.insert(position, id.clone());

        inner.nodes.insert(
            id.clone(),
            Entry {
                text: text.to_string(),
                parent: Some(parent.clone()),
                children: Vec::new(),
            },
        );
        tracing::trace!(%id, %parent, position, "memory store: created child");
        Ok(id)
    }

    async fn update_text(&self, id: &NodeId, text: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let entry = inner
            .nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        entry.text = text.to_string();
        Ok(())
    }

    async fn delete_node(&self, id: &NodeId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let parent = inner
            .nodes
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?
            .parent
            .clone();

        match parent {
            Some(parent) => {
                if let Some(entry) = inner.nodes.get_mut(&parent) {
                    entry.children.retain(|c| c != id);
                }
            }
            None => inner.roots.retain(|r| r != id),
        }
        inner.remove_subtree(id);
        Ok(())
    }
}
