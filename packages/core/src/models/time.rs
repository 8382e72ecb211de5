//! Time Provider Abstraction
//!
//! Provides a trait-based abstraction for time operations to enable
//! deterministic testing without thread sleeps.
//!
//! All timestamps handed out are truncated to millisecond precision. Stored
//! projects carry ISO-8601 text with exactly three fractional digits, so a
//! timestamp that survives a save/load cycle compares equal to the original.
//!
//! # Examples
//!
//! ```rust
//! use mindmap_core::models::time::{TimeProvider, SystemTimeProvider};
//! use chrono::Utc;
//!
//! let provider = SystemTimeProvider;
//! let now = provider.now();
//! assert!(now <= Utc::now());
//! ```

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use std::sync::Mutex;

/// Trait for providing current time
pub trait TimeProvider: Send + Sync {
    /// Get the current UTC time, millisecond precision
    fn now(&self) -> DateTime<Utc>;
}

/// System time provider using actual system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// Manually driven clock for tests
///
/// Shared behind an `Arc` by the storage layer and the test body, so the
/// current time lives behind a mutex.
///
/// ```rust
/// use mindmap_core::models::time::{TimeProvider, MockTimeProvider};
/// use chrono::Duration;
///
/// let provider = MockTimeProvider::new();
/// let time1 = provider.now();
/// provider.advance(Duration::hours(1));
/// assert_eq!(provider.now() - time1, Duration::hours(1));
/// ```
#[derive(Debug)]
pub struct MockTimeProvider {
    current_time: Mutex<DateTime<Utc>>,
}

impl MockTimeProvider {
    /// Create a new mock time provider starting at the current time
    pub fn new() -> Self {
        Self::with_time(Utc::now())
    }

    /// Create a mock time provider with a specific starting time
    pub fn with_time(time: DateTime<Utc>) -> Self {
        Self {
            current_time: Mutex::new(time.trunc_subsecs(3)),
        }
    }

    /// Set the current time to a specific value
    pub fn set_time(&self, time: DateTime<Utc>) {
        if let Ok(mut current) = self.current_time.lock() {
            *current = time.trunc_subsecs(3);
        }
    }

    /// Advance time by the given duration
    pub fn advance(&self, duration: chrono::Duration) {
        if let Ok(mut current) = self.current_time.lock() {
            *current = (*current + duration).trunc_subsecs(3);
        }
    }
}

impl TimeProvider for MockTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        match self.current_time.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl Default for MockTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Serde adapter writing `2024-05-01T08:00:00.000Z` style timestamps
///
/// Accepts any RFC 3339 input on the way in, which covers what a browser's
/// `Date.toISOString()` produces.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc).trunc_subsecs(3))
            .map_err(serde::de::Error::custom)
    }
}

/// Format a timestamp the way it is persisted
pub fn to_iso_millis(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
