//! Store contract
//!
//! [`TreeStore`] is the narrow interface the host backend must provide. The
//! backend is eventually consistent from the caller's point of view: a create
//! may not show up in a read issued immediately afterwards.

use crate::node::{Node, NodeId};
use async_trait::async_trait;

/// Errors reported by a store backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Node does not exist (or is not visible yet)
    #[error("node not found: {0}")]
    NotFound(NodeId),

    /// Backend temporarily unavailable (network hiccup, rate limit, ...)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the operation
    #[error("store rejected operation: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Create unavailable error
    #[inline]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create rejected error
    #[inline]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Whether retrying the same call later may succeed
    ///
    /// `NotFound` counts as transient: on an eventually-consistent store a
    /// missing node is often one that is not visible yet.
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Unavailable(_))
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Hierarchical document backend
///
/// Every call is a suspension point. Implementations must be shareable
/// across tasks (`Send + Sync`); callers hold them as `Arc<dyn TreeStore>`.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Look up a top-level node by exact title
    async fn resolve_root_by_title(&self, title: &str) -> StoreResult<Option<NodeId>>;

    /// Create a top-level node
    async fn create_root(&self, title: &str) -> StoreResult<NodeId>;

    /// Direct children of `parent`, ordered by `order`
    ///
    /// # Errors
    /// `StoreError::NotFound` if `parent` does not exist
    async fn get_children(&self, parent: &NodeId) -> StoreResult<Vec<Node>>;

    /// Create a child of `parent` at sibling position `order`
    async fn create_child(&self, parent: &NodeId, text: &str, order: usize) -> StoreResult<NodeId>;

    /// Replace a node's text
    async fn update_text(&self, id: &NodeId, text: &str) -> StoreResult<()>;

    /// Delete a node and its subtree
    async fn delete_node(&self, id: &NodeId) -> StoreResult<()>;
}
