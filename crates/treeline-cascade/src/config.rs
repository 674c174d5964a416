//! Cascade tuning
//!
//! Durations are (de)serialized as whole milliseconds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wall-clock bound for one cascade call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Default pause between resolution passes
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Cascade engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Give up after this much wall-clock time
    #[serde(rename = "timeout_ms", with = "millis")]
    pub timeout: Duration,
    /// Pause after a pass that created something or hit a store error
    #[serde(rename = "retry_interval_ms", with = "millis")]
    pub retry_interval: Duration,
}

impl CascadeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// With retry interval
    #[inline]
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_bounds() {
        let config = CascadeConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(3000));
        assert_eq!(config.retry_interval, Duration::from_millis(50));
    }

    #[test]
    fn builder_overrides() {
        let config = CascadeConfig::new()
            .with_timeout(Duration::from_secs(1))
            .with_retry_interval(Duration::from_millis(10));
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.retry_interval, Duration::from_millis(10));
    }

    #[test]
    fn serde_uses_milliseconds() {
        let json = serde_json::to_string(&CascadeConfig::default()).unwrap();
        assert_eq!(json, r#"{"timeout_ms":3000,"retry_interval_ms":50}"#);

        let parsed: CascadeConfig = serde_json::from_str(r#"{"timeout_ms":500}"#).unwrap();
        assert_eq!(parsed.timeout, Duration::from_millis(500));
        assert_eq!(parsed.retry_interval, DEFAULT_RETRY_INTERVAL);
    }
}
