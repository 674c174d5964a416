//! Error types for the treeline client

use treeline_cascade::CascadeError;
use treeline_data::DataError;
use treeline_tree::StoreError;

/// Combined client error
#[derive(Debug, thiserror::Error)]
pub enum TreelineError {
    /// Path could not be ensured
    #[error("cascade error: {0}")]
    Cascade(#[from] CascadeError),

    /// Structured read or write failed
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Direct store call failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl TreelineError {
    /// Create configuration error
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the caller may reasonably retry
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Cascade(e) => e.is_timeout(),
            Self::Data(e) => e.is_transient(),
            Self::Store(e) => e.is_transient(),
            Self::Config(_) => false,
        }
    }
}

/// Result type alias for client operations
pub type TreelineResult<T> = Result<T, TreelineError>;
