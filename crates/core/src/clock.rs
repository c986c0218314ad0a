//! Wall-clock abstraction.
//!
//! Grant expiry is decided against "now" in several places (validity checks,
//! the reaper, issuing grants). Routing every read through [`Clock`] keeps
//! those decisions deterministic in tests.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync + core::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and scripted sessions.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at the current system time, truncated to whole milliseconds so
    /// values survive a round-trip through persisted epoch-millisecond records.
    pub fn starting_now() -> Self {
        let millis = Utc::now().timestamp_millis();
        Self::new(DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let start = DateTime::from_timestamp_millis(1_000).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::milliseconds(250));
        assert_eq!(clock.now().timestamp_millis(), 1_250);

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
