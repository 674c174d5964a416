//! Treeline Tree
//!
//! The hierarchical document model every other treeline crate works against.
//!
//! # Overview
//!
//! - **Node**: one unit of the tree (`id`, `text`, `order`, `children`)
//! - **TreeStore**: the host-provided backend contract (roots by title, ordered children,
//!   create/update/delete)
//! - **MemoryStore**: an in-process `TreeStore` used by tests and by hosts without a remote store
//!
//! The store is shared and externally owned. Nothing in this workspace holds a [`Node`]
//! beyond a single operation; ids are the only durable handle.
//!
//! # Example
//!
//! ```rust
//! use treeline_tree::{MemoryStore, TreeStore};
//!
//! # async fn example() -> Result<(), treeline_tree::StoreError> {
//! let store = MemoryStore::new();
//! let root = store.create_root("Profile").await?;
//! store.create_child(&root, "Location::", 0).await?;
//!
//! let children = store.get_children(&root).await?;
//! assert_eq!(children[0].text, "Location::");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod memory;
pub mod node;
pub mod store;

pub use memory::MemoryStore;
pub use node::{Node, NodeId};
pub use store::{StoreError, StoreResult, TreeStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the tree
    pub use crate::{MemoryStore, Node, NodeId, StoreError, StoreResult, TreeStore};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
