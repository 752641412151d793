//! Tiered due-date reminders.
//!
//! # Responsibility
//! - Decide which tasks cross a reminder tier on each poll.
//! - Deliver reminder messages to a notification sink.
//! - Run polls on a fixed cadence on a dedicated worker thread.
//!
//! # Invariants
//! - Within one reminder epoch each tier fires at most once per task
//!   (check-then-set against the tier's own flag).
//! - The scheduler only ever sets flags; it never clears them.
//! - Sink failures are logged and never abort a poll.

pub mod runner;
pub mod scheduler;
pub mod sink;
pub mod tier;
