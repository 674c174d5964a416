//! Header surface syntaxes
//!
//! [`HeaderFormat`] is the closed set of syntaxes this workspace writes.
//! [`HeaderPattern`] expands a key into every variant accepted on read.

use serde::{Deserialize, Serialize};

/// How a header label is written into the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderFormat {
    /// `Key::`
    #[default]
    Attribute,
    /// `**Key:**`
    Bold,
}

impl HeaderFormat {
    /// Pick the format from the attribute-format flag
    #[inline]
    #[must_use]
    pub fn from_attribute_flag(use_attribute_format: bool) -> Self {
        if use_attribute_format {
            Self::Attribute
        } else {
            Self::Bold
        }
    }

    /// Header text for `key` in this format
    #[must_use]
    pub fn render(self, key: &str) -> String {
        match self {
            Self::Attribute => format!("{key}::"),
            Self::Bold => format!("**{key}:**"),
        }
    }

    /// Key label if `text` is written in this format
    #[must_use]
    pub fn label(self, text: &str) -> Option<&str> {
        let text = text.trim();
        let label = match self {
            Self::Attribute => text.strip_suffix("::")?,
            Self::Bold => text
                .strip_prefix("**")
                .and_then(|t| t.strip_suffix(":**").or_else(|| t.strip_suffix("**:")))?,
        };
        let label = label.trim();
        (!label.is_empty()).then_some(label)
    }

    /// Detect which format `text` is written in, if any
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        [Self::Bold, Self::Attribute]
            .into_iter()
            .find(|format| format.label(text).is_some())
    }
}

/// Read-side variants for one logical key
///
/// For key `K`: `K`, `K:`, `K::`, `**K:**`, `**K**:`. Only used to generate
/// match candidates; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPattern {
    key: String,
    variants: [String; 5],
}

impl HeaderPattern {
    /// Build all variants for `key`
    #[must_use]
    pub fn for_key(key: &str) -> Self {
        let key = key.trim();
        Self {
            key: key.to_string(),
            variants: [
                key.to_string(),
                format!("{key}:"),
                format!("{key}::"),
                format!("**{key}:**"),
                format!("**{key}**:"),
            ],
        }
    }

    /// The key the variants were built from
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// All surface variants
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}
