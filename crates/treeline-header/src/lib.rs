//! Treeline Header Matching
//!
//! Data lives in the tree as header → value pairs, where a header is a node
//! whose text is a key label in one of several surface syntaxes
//! (`Key`, `Key:`, `Key::`, `**Key:**`, `**Key**:`).
//!
//! # Overview
//!
//! - **normalize**: canonical form of a label (pure, idempotent)
//! - **HeaderMatcher**: first node whose normalized text *equals* a normalized pattern
//! - **HeaderFormat**: the two syntaxes this workspace writes (`Attribute`, `Bold`)
//! - **HeaderPattern**: the five read-side variants of one key
//!
//! Matching is exact equality on normalized forms. Containment is never used:
//! a prose node such as "Notes about My Info usage" must not match `My Info`.
//!
//! # Example
//!
//! ```rust
//! use treeline_header::{normalize, HeaderFormat};
//!
//! assert_eq!(normalize("**My Info:**"), "my info");
//! assert_eq!(HeaderFormat::Attribute.render("Location"), "Location::");
//! ```

#![warn(missing_docs)]

pub mod format;
pub mod matcher;
pub mod normalize;

pub use format::{HeaderFormat, HeaderPattern};
pub use matcher::HeaderMatcher;
pub use normalize::{category_name, normalize};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for header matching
    pub use crate::{category_name, normalize, HeaderFormat, HeaderMatcher, HeaderPattern};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
