//! File-backed task store.
//!
//! # Responsibility
//! - Implement the task repository contract on a database file.
//! - Open one short-lived connection per call and close it afterwards.
//!
//! # Invariants
//! - No connection outlives the call that opened it, so the store handle is
//!   cheap to clone and safe to move onto the scheduler thread.
//! - Failing to open the file surfaces as `RepoError::StorageUnavailable`.

use crate::db::open_db;
use crate::model::task::{Column, ReminderTier, Task, TaskDraft, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
use chrono::NaiveDateTime;
use log::warn;
use std::path::{Path, PathBuf};

/// Handle to the durable task store.
#[derive(Debug, Clone)]
pub struct TaskStore {
    db_path: PathBuf,
}

impl TaskStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Opens the store once, applying migrations, to fail fast at startup.
    pub fn check(&self) -> RepoResult<()> {
        self.with_repo("check", |_| Ok(()))
    }

    fn with_repo<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(SqliteTaskRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = open_db(&self.db_path).map_err(|err| {
            warn!(
                "event=store_open module=store status=error op={} error_code=storage_unavailable error={}",
                op, err
            );
            RepoError::StorageUnavailable(err)
        })?;
        f(SqliteTaskRepository::new(&conn))
    }
}

impl TaskRepository for TaskStore {
    fn create_task(&self, draft: &TaskDraft, created_at: NaiveDateTime) -> RepoResult<TaskId> {
        // Reject before touching storage at all.
        let draft = draft.normalized()?;
        self.with_repo("create", |repo| repo.create_task(&draft, created_at))
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Task> {
        self.with_repo("get", |repo| repo.get_task(id))
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.with_repo("list", |repo| repo.list_tasks())
    }

    fn update_fields(&self, id: TaskId, draft: &TaskDraft) -> RepoResult<()> {
        let draft = draft.normalized()?;
        self.with_repo("update_fields", |repo| repo.update_fields(id, &draft))
    }

    fn update_column(&self, id: TaskId, column: Column) -> RepoResult<()> {
        self.with_repo("update_column", |repo| repo.update_column(id, column))
    }

    fn set_flag(&self, id: TaskId, tier: ReminderTier) -> RepoResult<()> {
        self.with_repo("set_flag", |repo| repo.set_flag(id, tier))
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.with_repo("delete", |repo| repo.delete_task(id))
    }

    fn list_unnotified(&self, tier: ReminderTier) -> RepoResult<Vec<Task>> {
        self.with_repo("list_unnotified", |repo| repo.list_unnotified(tier))
    }
}
