//! Application context.
//!
//! # Responsibility
//! - Own the single store handle and clock shared by the board and the
//!   reminder scheduler.
//! - Build services and start the reminder worker on request.
//!
//! # Invariants
//! - Constructing a context verifies the store can be opened and migrated.
//! - The context holds no global state; callers own its lifetime.

use crate::clock::{Clock, LocalClock};
use crate::config::AppConfig;
use crate::reminder::runner::SchedulerHandle;
use crate::reminder::scheduler::ReminderScheduler;
use crate::reminder::sink::{
    CommandNotificationSink, FallbackSink, LogNotificationSink, NotificationSink,
};
use crate::repo::task_repo::RepoResult;
use crate::service::board_service::BoardService;
use crate::store::TaskStore;
use log::info;
use std::sync::Arc;

pub struct AppContext {
    config: AppConfig,
    store: TaskStore,
    clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Opens the configured store using the local system clock.
    ///
    /// # Errors
    /// - `RepoError::StorageUnavailable` when the database cannot be opened.
    pub fn open(config: AppConfig) -> RepoResult<Self> {
        Self::open_with_clock(config, Arc::new(LocalClock))
    }

    pub fn open_with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> RepoResult<Self> {
        let store = TaskStore::new(config.db_path.clone());
        store.check()?;
        info!(
            "event=context_open module=context status=ok poll_interval_secs={} notifier={}",
            config.poll_interval.as_secs(),
            if config.notify_command.is_some() {
                "command"
            } else {
                "log"
            }
        );
        Ok(Self {
            config,
            store,
            clock,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn board(&self) -> BoardService<TaskStore> {
        BoardService::with_clock(self.store.clone(), Arc::clone(&self.clock))
    }

    pub fn scheduler<S: NotificationSink>(&self, sink: S) -> ReminderScheduler<TaskStore, S> {
        ReminderScheduler::with_clock(self.store.clone(), sink, Arc::clone(&self.clock))
    }

    /// Sink chosen by configuration: the external notifier with a log-line
    /// fallback, or log lines only.
    pub fn default_sink(&self) -> Box<dyn NotificationSink> {
        match &self.config.notify_command {
            Some(program) => Box::new(FallbackSink::new(
                CommandNotificationSink::new(program.clone()),
                LogNotificationSink,
            )),
            None => Box::new(LogNotificationSink),
        }
    }

    /// Starts the periodic reminder worker at the configured cadence.
    pub fn start_scheduler<S>(&self, sink: S) -> std::io::Result<SchedulerHandle>
    where
        S: NotificationSink + 'static,
    {
        SchedulerHandle::start(self.scheduler(sink), self.config.poll_interval)
    }
}
