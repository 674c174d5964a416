//! Treeline Data
//!
//! Reads and writes structured data kept in the tree as parent → child text
//! pairs:
//!
//! ```text
//! container
//! ├── Location::            ← header (single value)
//! │   └── Oakland           ← value child
//! ├── Tags::                ← header (multi value)
//! │   ├── a
//! │   └── b
//! └── **My Info:**          ← nested header
//!     ├── **Avatar:**       ← category
//!     │   └── https://…     ← value child
//!     └── **Role:**
//!         └── Dev
//! ```
//!
//! Headers are found with exact normalized matching (see `treeline-header`),
//! so prose that merely mentions a key is never read as its header.
//! Writes are full replace: a header's previous children are deleted before
//! the new ones are created.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod extractor;
pub mod value;
pub mod writer;

pub use error::{DataError, DataResult};
pub use extractor::DataExtractor;
pub use value::{FieldValue, NestedValues};
pub use writer::{DataWriter, WriteOutcome};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for reading and writing tree data
    pub use crate::{DataError, DataExtractor, DataWriter, FieldValue, NestedValues, WriteOutcome};
    pub use treeline_header::HeaderFormat;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
