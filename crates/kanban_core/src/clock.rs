//! Wall-clock source for "now".
//!
//! # Responsibility
//! - Provide the local wall-clock time used for creation stamps and reminder
//!   windows.
//! - Let tests pin and advance time deterministically.
//!
//! # Invariants
//! - Returned values are naive local time truncated to whole seconds.

use crate::model::timestamp::truncate_to_seconds;
use chrono::{Duration, Local, NaiveDateTime};
use std::sync::Mutex;

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Current local time, second precision.
pub fn local_now() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

/// System clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        local_now()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(truncate_to_seconds(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.lock() = truncate_to_seconds(now);
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        // A poisoned clock still holds a valid timestamp.
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, LocalClock};
    use chrono::{Duration, NaiveDate, Timelike};

    #[test]
    fn fixed_clock_advances_by_duration() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::hours(36));
        assert_eq!(clock.now(), start + Duration::hours(36));
    }

    #[test]
    fn local_clock_has_whole_seconds() {
        assert_eq!(LocalClock.now().nanosecond(), 0);
    }
}
