//! Cascade paths
//!
//! Provides [`CascadePath`], the validated `[root, seg1, seg2, ...]` input
//! of a cascade.

use crate::error::CascadeError;
use std::fmt::{self, Display, Formatter};

/// Ordered, non-empty list of plain-text segments
///
/// The first segment names a top-level node and is matched by exact title.
/// Every later segment names a child of the previous one and is matched by
/// normalized header equality.
///
/// # Examples
/// - `["Team", "My Info"]` → root page `Team`, child `My Info`
/// - `["Inbox"]` → just the root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CascadePath(Vec<String>);

impl CascadePath {
    /// Create path from segments
    ///
    /// # Errors
    /// `CascadeError::InvalidPath` if there are no segments or any segment
    /// is blank
    pub fn new(segments: Vec<String>) -> Result<Self, CascadeError> {
        if segments.is_empty() {
            return Err(CascadeError::invalid_path("empty path"));
        }
        if let Some(index) = segments.iter().position(|s| s.trim().is_empty()) {
            return Err(CascadeError::invalid_path(format!("segment {index} is blank")));
        }
        Ok(Self(segments))
    }

    /// Create path from anything yielding string-like segments
    ///
    /// # Errors
    /// Same as [`CascadePath::new`]
    pub fn from_segments<I, S>(segments: I) -> Result<Self, CascadeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(segments.into_iter().map(Into::into).collect())
    }

    /// Root title (first segment)
    #[inline]
    #[must_use]
    pub fn root(&self) -> &str {
        &self.0[0]
    }

    /// Segment at `level` (0 = root)
    #[inline]
    #[must_use]
    pub fn segment(&self, level: usize) -> Option<&str> {
        self.0.get(level).map(String::as_str)
    }

    /// All segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of levels, root included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; paths are non-empty by construction
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `level` is the last one
    #[inline]
    #[must_use]
    pub fn is_leaf(&self, level: usize) -> bool {
        level + 1 == self.0.len()
    }

    /// Path extended by one segment
    ///
    /// # Errors
    /// `CascadeError::InvalidPath` if `segment` is blank
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, CascadeError> {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self::new(segments)
    }
}

impl Display for CascadePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" / "))
    }
}

impl TryFrom<Vec<String>> for CascadePath {
    type Error = CascadeError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl TryFrom<&[&str]> for CascadePath {
    type Error = CascadeError;

    fn try_from(segments: &[&str]) -> Result<Self, Self::Error> {
        Self::from_segments(segments.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_accessors() {
        let path = CascadePath::from_segments(["Team", "My Info", "Location"]).unwrap();

        assert_eq!(path.root(), "Team");
        assert_eq!(path.segment(1), Some("My Info"));
        assert_eq!(path.segment(3), None);
        assert_eq!(path.len(), 3);
        assert!(!path.is_empty());
        assert!(path.is_leaf(2));
        assert!(!path.is_leaf(1));
    }

    #[test]
    fn empty_path_is_invalid() {
        let err = CascadePath::new(Vec::new()).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidPath { .. }));
    }

    #[test]
    fn blank_segment_is_invalid() {
        let err = CascadePath::from_segments(["Team", "  "]).unwrap_err();
        assert_eq!(err.to_string(), "invalid cascade path: segment 1 is blank");
    }

    #[test]
    fn child_extends() {
        let path = CascadePath::from_segments(["Team"]).unwrap();
        let child = path.child("Roles").unwrap();
        assert_eq!(child.to_string(), "Team / Roles");
        assert!(path.child("").is_err());
    }

    #[test]
    fn try_from_slice() {
        let segments: &[&str] = &["A", "B"];
        let path = CascadePath::try_from(segments).unwrap();
        assert_eq!(path.segments(), ["A", "B"]);
    }
}
