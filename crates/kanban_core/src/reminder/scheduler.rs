//! One reminder poll cycle.
//!
//! # Responsibility
//! - For each tier, in order 10-day, 5-day, 1-day, due: load tasks whose
//!   tier flag is clear, keep those inside the tier window, notify, then set
//!   the flag.
//!
//! # Invariants
//! - Notify happens before the flag write; a sink failure still sets the
//!   flag so a broken notifier cannot cause a reminder storm.
//! - Storage failure aborts the cycle with an error; the next tick is the
//!   only retry.
//! - A task deleted between query and flag write is skipped, not an error.
//! - Tiers are checked independently. A task that slept through a window
//!   skips that tier for good; only the due tier catches up.

use crate::clock::{Clock, LocalClock};
use crate::model::task::{ReminderTier, TaskId};
use crate::reminder::sink::NotificationSink;
use crate::repo::task_repo::{RepoError, RepoResult, TaskRepository};
use chrono::NaiveDateTime;
use log::{debug, warn};
use std::sync::Arc;

/// One reminder that was delivered (or attempted) and recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredReminder {
    pub task_id: TaskId,
    pub tier: ReminderTier,
}

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Reminders whose flag was set this cycle, in firing order.
    pub fired: Vec<FiredReminder>,
    /// Sink failures swallowed this cycle.
    pub sink_failures: usize,
}

impl PollReport {
    pub fn fired_for(&self, tier: ReminderTier) -> usize {
        self.fired.iter().filter(|fired| fired.tier == tier).count()
    }
}

/// Tiered reminder scheduler over a task repository and a sink.
pub struct ReminderScheduler<R, S> {
    repo: R,
    sink: S,
    clock: Arc<dyn Clock>,
}

impl<R: TaskRepository, S: NotificationSink> ReminderScheduler<R, S> {
    pub fn new(repo: R, sink: S) -> Self {
        Self::with_clock(repo, sink, Arc::new(LocalClock))
    }

    pub fn with_clock(repo: R, sink: S, clock: Arc<dyn Clock>) -> Self {
        Self { repo, sink, clock }
    }

    /// Runs one poll cycle at the clock's current time.
    pub fn poll_once(&self) -> RepoResult<PollReport> {
        self.poll_at(self.clock.now())
    }

    /// Runs one poll cycle as if the time were `now`.
    pub fn poll_at(&self, now: NaiveDateTime) -> RepoResult<PollReport> {
        let mut report = PollReport::default();

        for tier in ReminderTier::ALL {
            let candidates = self.repo.list_unnotified(tier)?;

            for task in candidates {
                let Some(due_at) = task.due_at else {
                    continue;
                };
                if task.flags.is_set(tier) || !tier.window_contains(due_at, now) {
                    continue;
                }

                let message = tier.message(&task.title);
                if let Err(err) = self.sink.notify(&message.heading, &message.body) {
                    report.sink_failures += 1;
                    warn!(
                        "event=notify module=reminder status=error task_id={} tier={} error={}",
                        task.id, tier, err
                    );
                }

                match self.repo.set_flag(task.id, tier) {
                    Ok(()) => {
                        debug!(
                            "event=reminder_fired module=reminder status=ok task_id={} tier={}",
                            task.id, tier
                        );
                        report.fired.push(FiredReminder {
                            task_id: task.id,
                            tier,
                        });
                    }
                    Err(RepoError::NotFound(id)) => {
                        debug!(
                            "event=reminder_fired module=reminder status=skipped task_id={} tier={} reason=deleted",
                            id, tier
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Ok(report)
    }
}
