//! Time source abstraction.
//!
//! # Responsibilities
//! - Provide "now" for cache expiry decisions
//! - Answer "is this instant in the past" and "now + N minutes"
//!
//! # Design Decisions
//! - Injected as `Arc<dyn Clock>` so expiry can be driven deterministically in tests
//! - Timestamps are UTC `chrono::DateTime`, which serialize cleanly if persisted

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// True if `instant` lies at or before the current instant.
    fn is_past(&self, instant: DateTime<Utc>) -> bool {
        instant <= self.now()
    }

    /// The current instant shifted forward by `minutes`.
    fn add_minutes(&self, minutes: u64) -> DateTime<Utc> {
        let delta = i64::try_from(minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or(Duration::MAX);
        self.now()
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_expiry() {
        let clock = ManualClock::default();
        let deadline = clock.add_minutes(5);
        assert!(!clock.is_past(deadline));

        clock.advance(Duration::minutes(4));
        assert!(!clock.is_past(deadline));

        clock.advance(Duration::minutes(1));
        assert!(clock.is_past(deadline));
    }

    #[test]
    fn test_system_clock_past() {
        let clock = SystemClock;
        assert!(clock.is_past(Utc::now() - Duration::seconds(1)));
        assert!(!clock.is_past(clock.add_minutes(1)));
    }
}
