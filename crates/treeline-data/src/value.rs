//! Value shapes
//!
//! A header holds either one value child or an ordered list of them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category name → value, in sibling order
pub type NestedValues = IndexMap<String, FieldValue>;

/// Value(s) stored under one header
///
/// Serializes untagged: a string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Exactly one value child
    Single(String),
    /// Several value children, ordered
    List(Vec<String>),
}

impl FieldValue {
    /// Build from value-child texts: `None` for none, `Single` for one,
    /// `List` otherwise
    #[must_use]
    pub fn from_texts(mut texts: Vec<String>) -> Option<Self> {
        match texts.len() {
            0 => None,
            1 => texts.pop().map(Self::Single),
            _ => Some(Self::List(texts)),
        }
    }

    /// The single value, if this is one
    #[inline]
    #[must_use]
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value.as_str()),
            Self::List(_) => None,
        }
    }

    /// Values as a slice-like list (one element for `Single`)
    #[must_use]
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Owned values, one element for `Single`
    #[must_use]
    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::Single(value) => vec![value],
            Self::List(values) => values,
        }
    }

    /// Number of value children this writes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(values) => values.len(),
        }
    }

    /// True only for an empty list
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldValue {
    fn from(values: [&str; N]) -> Self {
        Self::List(values.iter().map(|v| (*v).to_string()).collect())
    }
}
