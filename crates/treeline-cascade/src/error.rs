//! Error types for cascading
//!
//! Transient store errors never appear here; the engine absorbs them and
//! retries. Only bad input and the wall-clock bound are surfaced.

use crate::claim::PendingClaim;
use std::time::Duration;

/// Cascade failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CascadeError {
    /// Empty or malformed path; reported before any store call
    #[error("invalid cascade path: {reason}")]
    InvalidPath {
        /// What is wrong with the path
        reason: String,
    },

    /// Did not converge within the configured bound
    #[error("cascade timed out after {elapsed:?} ({passes} passes), last claim: {}", describe(.last_claim))]
    Timeout {
        /// Time spent before giving up
        elapsed: Duration,
        /// Resolution passes started
        passes: u32,
        /// Most recent create this cascade issued, if any
        last_claim: Option<PendingClaim>,
    },
}

fn describe(claim: &Option<PendingClaim>) -> String {
    claim
        .as_ref()
        .map_or_else(|| "none".to_string(), ToString::to_string)
}

impl CascadeError {
    /// Create invalid path error
    #[inline]
    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            reason: reason.into(),
        }
    }

    /// Whether this is a timeout
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The claim a timeout was stuck on
    #[inline]
    #[must_use]
    pub fn stuck_claim(&self) -> Option<&PendingClaim> {
        match self {
            Self::Timeout { last_claim, .. } => last_claim.as_ref(),
            Self::InvalidPath { .. } => None,
        }
    }
}

/// Result type alias for cascade operations
pub type CascadeResult<T> = Result<T, CascadeError>;
