//! Treeline Core
//!
//! The client callers use. Wraps a host [`TreeStore`](treeline_tree::TreeStore)
//! and exposes five operations:
//!
//! - **cascade_to_path**: make sure a path of nodes exists, get the leaf id
//! - **read_value** / **read_nested_values**: exact-match structured reads
//! - **write_value** / **write_nested_values**: full-replace structured writes
//!
//! # Architecture
//!
//! ```text
//!            Treeline (facade, config, optional read cache)
//!            /            |                 \
//!   CascadeEngine   DataExtractor      DataWriter
//!            \            |                 /
//!             HeaderMatcher (exact, normalized)
//!                         |
//!                  dyn TreeStore (host)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use treeline_core::{Treeline, TreelineConfig};
//! use treeline_tree::MemoryStore;
//!
//! # async fn example() -> Result<(), treeline_core::TreelineError> {
//! let client = Treeline::new(Arc::new(MemoryStore::new()), TreelineConfig::default());
//!
//! let profile = client.cascade_to_path(&["Team", "Members", "ada"]).await?;
//! client.write_value(&profile, "Location", "Oakland", true).await;
//! let location = client.read_value(&profile, "Location").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod telemetry;

pub use cache::{CacheStats, ReadCache, TtlCache};
pub use client::{Treeline, DEFAULT_READ_CACHE_TTL};
pub use config::TreelineConfig;
pub use error::{TreelineError, TreelineResult};

pub use treeline_cascade::{CascadeConfig, CascadeError, CascadePath, PendingClaim};
pub use treeline_data::{FieldValue, NestedValues, WriteOutcome};
pub use treeline_header::HeaderFormat;
pub use treeline_tree::{Node, NodeId, StoreError, TreeStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for treeline clients
    pub use crate::{
        FieldValue, HeaderFormat, NestedValues, NodeId, TreeStore, Treeline, TreelineConfig,
        TreelineError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
