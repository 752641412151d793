//! Core domain logic for the kanban task board.
//! This crate is the single source of truth for board and reminder invariants.

pub mod clock;
pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{AppConfig, ConfigError};
pub use context::AppContext;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    Column, InvalidColumn, InvalidFlagName, NotificationFlags, ReminderTier, Task, TaskDraft,
    TaskId, TaskValidationError,
};
pub use reminder::runner::SchedulerHandle;
pub use reminder::scheduler::{FiredReminder, PollReport, ReminderScheduler};
pub use reminder::sink::{
    CommandNotificationSink, FallbackSink, LogNotificationSink, NotificationSink, SinkError,
};
pub use reminder::tier::ReminderMessage;
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::board_service::{BoardError, BoardResult, BoardService, BoardView};
pub use store::TaskStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
