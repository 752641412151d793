//! Tier windows and reminder wording.
//!
//! Windows, with `delta = due_at - now`:
//!
//! | Tier    | Window                  |
//! |---------|-------------------------|
//! | 10-day  | `5 days < delta <= 10 days` |
//! | 5-day   | `1 day < delta <= 5 days`   |
//! | 1-day   | `0 < delta <= 1 day`        |
//! | due     | `delta <= 0`                |
//!
//! The windows are contiguous and disjoint, so at a given instant a task
//! belongs to at most one tier. Only the due tier is open-ended; a task whose
//! due date passed while nothing was polling still gets exactly that one.

use crate::model::task::ReminderTier;
use chrono::{Duration, NaiveDateTime};

/// Heading and body shown to the user for one reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    pub heading: String,
    pub body: String,
}

impl ReminderTier {
    /// Half-open bounds `(lower, upper]` on `due_at - now`; `None` is unbounded.
    fn window(self) -> (Option<Duration>, Option<Duration>) {
        match self {
            Self::TenDay => (Some(Duration::days(5)), Some(Duration::days(10))),
            Self::FiveDay => (Some(Duration::days(1)), Some(Duration::days(5))),
            Self::OneDay => (Some(Duration::zero()), Some(Duration::days(1))),
            Self::Due => (None, Some(Duration::zero())),
        }
    }

    /// Whether a task due at `due_at` falls in this tier at `now`.
    pub fn window_contains(self, due_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        let remaining = due_at - now;
        let (lower, upper) = self.window();
        let above_lower = lower.map_or(true, |lower| remaining > lower);
        let within_upper = upper.map_or(true, |upper| remaining <= upper);
        above_lower && within_upper
    }

    /// The tier whose window holds `due_at` at `now`.
    pub fn for_due_date(due_at: NaiveDateTime, now: NaiveDateTime) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.window_contains(due_at, now))
    }

    /// Message for a task titled `title`.
    pub fn message(self, title: &str) -> ReminderMessage {
        let (prefix, body) = match self {
            Self::TenDay => ("Notice", "10 days left for your task.".to_string()),
            Self::FiveDay => ("Attention", "5 days left for your task.".to_string()),
            Self::OneDay => ("Urgent", "1 day left for your task!".to_string()),
            Self::Due => ("Reminder", format!("Your task '{title}' is due now.")),
        };
        ReminderMessage {
            heading: format!("{prefix}: {title}"),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::task::ReminderTier;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn boundaries_are_exclusive_lower_inclusive_upper() {
        let now = now();
        let cases = [
            (Duration::days(10) + Duration::seconds(1), None),
            (Duration::days(10), Some(ReminderTier::TenDay)),
            (Duration::days(5) + Duration::seconds(1), Some(ReminderTier::TenDay)),
            (Duration::days(5), Some(ReminderTier::FiveDay)),
            (Duration::days(1) + Duration::seconds(1), Some(ReminderTier::FiveDay)),
            (Duration::days(1), Some(ReminderTier::OneDay)),
            (Duration::seconds(1), Some(ReminderTier::OneDay)),
            (Duration::zero(), Some(ReminderTier::Due)),
            (-Duration::days(30), Some(ReminderTier::Due)),
        ];

        for (remaining, expected) in cases {
            assert_eq!(
                ReminderTier::for_due_date(now + remaining, now),
                expected,
                "remaining={remaining}"
            );
        }
    }

    #[test]
    fn windows_never_overlap() {
        let now = now();
        let mut remaining = -Duration::days(2);
        while remaining <= Duration::days(12) {
            let matching = ReminderTier::ALL
                .into_iter()
                .filter(|tier| tier.window_contains(now + remaining, now))
                .count();
            assert!(matching <= 1, "remaining={remaining} matched {matching} tiers");
            remaining += Duration::hours(1);
        }
    }

    #[test]
    fn messages_carry_title_in_heading() {
        let message = ReminderTier::OneDay.message("Pay rent");
        assert_eq!(message.heading, "Urgent: Pay rent");
        assert_eq!(message.body, "1 day left for your task!");

        let due = ReminderTier::Due.message("Pay rent");
        assert_eq!(due.heading, "Reminder: Pay rent");
        assert!(due.body.contains("'Pay rent'"));
    }
}
