//! Timestamp type used throughout the service.
//!
//! Timestamps are Unix epoch seconds (UTC).

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `secs`.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Seconds remaining until this timestamp (zero once it has passed).
    pub fn secs_until(&self, now: Timestamp) -> u64 {
        self.0.saturating_sub(now.0)
    }

    /// RFC 3339 / ISO 8601 rendering with millisecond precision, e.g.
    /// `2026-10-15T12:00:00.000Z`.
    pub fn to_rfc3339(&self) -> String {
        let secs = i64::try_from(self.0).unwrap_or(i64::MAX);
        DateTime::from_timestamp(secs, 0)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the current time. Tests substitute a controllable clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_secs_saturates() {
        assert_eq!(Timestamp::new(1_000).plus_secs(300), Timestamp::new(1_300));
        assert_eq!(Timestamp::new(u64::MAX).plus_secs(1), Timestamp::new(u64::MAX));
    }

    #[test]
    fn secs_until_saturates() {
        let deadline = Timestamp::new(100);
        assert_eq!(deadline.secs_until(Timestamp::new(40)), 60);
        assert_eq!(deadline.secs_until(Timestamp::new(400)), 0);
    }

    #[test]
    fn rfc3339_uses_millisecond_utc_form() {
        assert_eq!(
            Timestamp::new(1_700_000_000).to_rfc3339(),
            "2023-11-14T22:13:20.000Z"
        );
    }
}
