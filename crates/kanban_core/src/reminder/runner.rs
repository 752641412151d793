//! Periodic reminder worker.
//!
//! # Responsibility
//! - Run one poll immediately at start, then one per interval, on a
//!   dedicated thread so storage I/O never blocks the caller.
//! - Stop cleanly on request.
//!
//! # Invariants
//! - Stopping never interrupts a poll mid-way: the stop signal is only
//!   observed between polls, so no flag write is left half-done.
//! - A failed poll is logged and the worker waits for the next tick.

use crate::reminder::scheduler::ReminderScheduler;
use crate::reminder::sink::NotificationSink;
use crate::repo::task_repo::TaskRepository;
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use log::{error, info, warn};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const WORKER_THREAD_NAME: &str = "kanban-reminders";

/// Handle to a running reminder worker. Dropping it stops the worker.
pub struct SchedulerHandle {
    stop_tx: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Spawns the worker thread.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned.
    pub fn start<R, S>(
        scheduler: ReminderScheduler<R, S>,
        interval: Duration,
    ) -> std::io::Result<Self>
    where
        R: TaskRepository + Send + 'static,
        S: NotificationSink + 'static,
    {
        let (stop_tx, stop_rx) = bounded(1);
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(&scheduler, interval, &stop_rx))?;

        info!(
            "event=scheduler_start module=reminder status=ok interval_secs={}",
            interval.as_secs()
        );
        Ok(Self {
            stop_tx,
            worker: Some(worker),
        })
    }

    /// Whether the worker thread is still alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Signals the worker and waits for any in-flight poll to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // The worker may already be gone; a closed channel is fine.
        let _ = self.stop_tx.try_send(());
        if worker.join().is_err() {
            error!("event=scheduler_stop module=reminder status=error error_code=worker_panicked");
            return;
        }
        info!("event=scheduler_stop module=reminder status=ok");
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<R, S>(scheduler: &ReminderScheduler<R, S>, interval: Duration, stop_rx: &Receiver<()>)
where
    R: TaskRepository,
    S: NotificationSink,
{
    let ticker = tick(interval);
    run_cycle(scheduler);

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => run_cycle(scheduler),
        }
    }
}

fn run_cycle<R, S>(scheduler: &ReminderScheduler<R, S>)
where
    R: TaskRepository,
    S: NotificationSink,
{
    let started_at = Instant::now();
    match scheduler.poll_once() {
        Ok(report) => info!(
            "event=poll_cycle module=reminder status=ok fired={} sink_failures={} duration_ms={}",
            report.fired.len(),
            report.sink_failures,
            started_at.elapsed().as_millis()
        ),
        Err(err) if err.is_storage_failure() => warn!(
            "event=poll_cycle module=reminder status=skipped error_code=storage_unavailable duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
        Err(err) => error!(
            "event=poll_cycle module=reminder status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
