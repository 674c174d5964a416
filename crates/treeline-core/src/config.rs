//! Client configuration
//!
//! Loadable from TOML; every field has a default so partial files work.
//!
//! ```toml
//! default_format = "bold"
//! read_cache_ttl_ms = 5000
//!
//! [cascade]
//! timeout_ms = 3000
//! retry_interval_ms = 50
//! ```

use crate::error::{TreelineError, TreelineResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use treeline_cascade::CascadeConfig;
use treeline_header::HeaderFormat;

/// Treeline client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreelineConfig {
    /// Header syntax used by `*_with_default_format` writes
    pub default_format: HeaderFormat,
    /// Enable the read-through cache with this TTL
    pub read_cache_ttl_ms: Option<u64>,
    /// Maximum cached reads
    pub read_cache_capacity: u64,
    /// Cascade engine tuning (kept last: TOML tables follow plain keys)
    pub cascade: CascadeConfig,
}

impl TreelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With cascade configuration
    #[inline]
    #[must_use]
    pub fn with_cascade(mut self, cascade: CascadeConfig) -> Self {
        self.cascade = cascade;
        self
    }

    /// With default header format
    #[inline]
    #[must_use]
    pub fn with_default_format(mut self, format: HeaderFormat) -> Self {
        self.default_format = format;
        self
    }

    /// With read cache TTL
    #[inline]
    #[must_use]
    pub fn with_read_cache(mut self, ttl: Duration) -> Self {
        self.read_cache_ttl_ms = Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Read cache TTL, if the cache is enabled
    #[inline]
    #[must_use]
    pub fn read_cache_ttl(&self) -> Option<Duration> {
        self.read_cache_ttl_ms.map(Duration::from_millis)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `TreelineError::Config` on malformed TOML or wrong field types
    pub fn from_toml_str(content: &str) -> TreelineResult<Self> {
        toml::from_str(content).map_err(|e| TreelineError::config(format!("parse treeline config: {e}")))
    }

    /// Render as TOML text
    ///
    /// # Errors
    /// `TreelineError::Config` if serialization fails
    pub fn to_toml_string(&self) -> TreelineResult<String> {
        toml::to_string(self).map_err(|e| TreelineError::config(format!("render treeline config: {e}")))
    }
}

impl Default for TreelineConfig {
    fn default() -> Self {
        Self {
            default_format: HeaderFormat::Attribute,
            read_cache_ttl_ms: None,
            read_cache_capacity: 1_000,
            cascade: CascadeConfig::default(),
        }
    }
}
