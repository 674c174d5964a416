//! In-flight create markers
//!
//! A [`PendingClaim`] records that this cascade already issued a create for
//! one `(level, parent, content)` target. Claims live only as long as one
//! cascade call; they are not a lock and other callers never see them.

use std::fmt::{self, Display, Formatter};
use treeline_tree::NodeId;

/// A create issued by the current cascade and not yet observed on read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingClaim {
    /// Path level (0 = root)
    pub level: usize,
    /// Parent node; `None` for the root level
    pub parent: Option<NodeId>,
    /// Text of the node being created
    pub content: String,
}

impl PendingClaim {
    /// Claim for the root level
    #[inline]
    #[must_use]
    pub fn root(title: impl Into<String>) -> Self {
        Self {
            level: 0,
            parent: None,
            content: title.into(),
        }
    }

    /// Claim for a child level
    #[inline]
    #[must_use]
    pub fn child(level: usize, parent: NodeId, content: impl Into<String>) -> Self {
        Self {
            level,
            parent: Some(parent),
            content: content.into(),
        }
    }

    /// Whether this claim targets the root level
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl Display for PendingClaim {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(
                f,
                "level {} '{}' under parent {}",
                self.level, self.content, parent
            ),
            None => write!(f, "root '{}'", self.content),
        }
    }
}
