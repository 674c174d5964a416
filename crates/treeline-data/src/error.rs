//! Error types for data reads and writes

use std::time::Duration;
use treeline_cascade::PendingClaim;
use treeline_tree::StoreError;

/// Data layer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// Underlying store call failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Key is blank or normalizes to nothing
    #[error("invalid key: '{0}'")]
    InvalidKey(String),

    /// A created node never showed up on a fresh read
    #[error("write not visible after {elapsed:?}: {claim}")]
    NotVisible {
        /// First create still missing from reads
        claim: PendingClaim,
        /// Time spent waiting
        elapsed: Duration,
    },
}

impl DataError {
    /// Whether retrying may succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Store(e) => e.is_transient(),
            Self::NotVisible { .. } => true,
            Self::InvalidKey(_) => false,
        }
    }
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;
