//! Treeline Cascade
//!
//! Ensures a named path of nodes (`root → child → … → leaf`) exists and
//! returns the leaf id, creating only what is missing.
//!
//! # Why a loop
//!
//! The backing store does not guarantee read-after-write from the caller's
//! point of view: a child created a moment ago may be missing from the next
//! `get_children`. The engine therefore never trusts an id it just created.
//! Any miss triggers (at most one) create for that exact target and then
//! restarts resolution from the root on a fresh read, until a full pass from
//! root to leaf finds everything, or the wall-clock bound runs out.
//!
//! ```text
//!   ResolveRoot ──found──▶ Descend(1) ──found──▶ … ──found──▶ Converged(id)
//!        │  ▲                  │
//!   miss │  └──── restart ─────┘ miss (claim + create once)
//!        ▼
//!   claim + create once, retry
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use treeline_cascade::{CascadeConfig, CascadeEngine};
//! use treeline_tree::MemoryStore;
//!
//! # async fn example() -> Result<(), treeline_cascade::CascadeError> {
//! let engine = CascadeEngine::new(Arc::new(MemoryStore::new()), CascadeConfig::default());
//! let leaf = engine.cascade(["Team", "My Info", "Location"]).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod claim;
pub mod config;
pub mod engine;
pub mod error;
pub mod machine;
pub mod path;

pub use claim::PendingClaim;
pub use config::CascadeConfig;
pub use engine::CascadeEngine;
pub use error::{CascadeError, CascadeResult};
pub use machine::{CascadeRun, CascadeState, StepOutcome};
pub use path::CascadePath;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for cascading paths
    pub use crate::{CascadeConfig, CascadeEngine, CascadeError, CascadePath, PendingClaim};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
