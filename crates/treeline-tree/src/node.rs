//! Node model
//!
//! Provides [`NodeId`] (opaque, store-assigned) and [`Node`] (a snapshot of one
//! tree entry as returned by a store read).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use ulid::Ulid;

/// Opaque node identifier
///
/// Assigned by the store. Remote backends hand out their own identifiers,
/// so this wraps a string rather than a fixed-width id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an identifier handed out by a store
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generate a fresh identifier (ULID, sortable by creation time)
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Borrow the raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NodeId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Snapshot of a single node
///
/// `order` is the position among siblings and defines iteration order.
/// `children` lists direct child ids in sibling order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Store-assigned identifier
    pub id: NodeId,
    /// Text content
    pub text: String,
    /// Position among siblings
    pub order: usize,
    /// Direct children, ordered
    #[serde(default)]
    pub children: Vec<NodeId>,
}

impl Node {
    /// Create a leaf node snapshot
    #[inline]
    #[must_use]
    pub fn new(id: NodeId, text: impl Into<String>, order: usize) -> Self {
        Self {
            id,
            text: text.into(),
            order,
            children: Vec::new(),
        }
    }

    /// With child ids
    #[inline]
    #[must_use]
    pub fn with_children(mut self, children: Vec<NodeId>) -> Self {
        self.children = children;
        self
    }

    /// Whether this node has any children
    #[inline]
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
