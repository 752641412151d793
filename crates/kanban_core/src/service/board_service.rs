//! Board use-case service.
//!
//! # Responsibility
//! - Validate and apply the user mutations: create, edit, move, delete.
//! - Serve the board queries: single task, newest-first list, column view.
//!
//! # Invariants
//! - Empty titles are rejected before any repository call.
//! - `edit_task` replaces title/description/due date together and starts a
//!   new reminder epoch (all notification flags cleared).
//! - `move_task` changes the column only.
//! - The service holds no durable state of its own.

use crate::clock::{Clock, LocalClock};
use crate::model::task::{Column, Task, TaskDraft, TaskId, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Service error for board use-cases.
#[derive(Debug)]
pub enum BoardError {
    /// Input rejected; nothing was written.
    Validation(TaskValidationError),
    /// Target task does not exist; callers should refresh their view.
    TaskNotFound(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl BoardError {
    /// Whether the store itself could not be reached.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::Repo(RepoError::StorageUnavailable(_)))
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent board state: {details}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<TaskValidationError> for BoardError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type BoardResult<T> = Result<T, BoardError>;

/// Tasks grouped by column, each newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    pub todo: Vec<Task>,
    pub doing: Vec<Task>,
    pub done: Vec<Task>,
}

impl BoardView {
    pub fn column(&self, column: Column) -> &[Task] {
        match column {
            Column::Todo => &self.todo,
            Column::Doing => &self.doing,
            Column::Done => &self.done,
        }
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.doing.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Validating facade over a task repository.
pub struct BoardService<R: TaskRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: TaskRepository> BoardService<R> {
    /// Creates a service stamping tasks with the local system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(LocalClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Creates a task in `todo` and returns the stored record.
    pub fn create_task(&self, draft: &TaskDraft) -> BoardResult<Task> {
        let draft = draft.normalized()?;
        let id = self.repo.create_task(&draft, self.clock.now())?;
        info!(
            "event=task_create module=board status=ok task_id={} has_due={}",
            id,
            draft.due_at.is_some()
        );

        self.read_back(id, "created task not found in read-back")
    }

    /// Replaces the editable fields and resets reminder state.
    pub fn edit_task(&self, id: TaskId, draft: &TaskDraft) -> BoardResult<Task> {
        let draft = draft.normalized()?;
        self.repo.update_fields(id, &draft)?;
        info!(
            "event=task_edit module=board status=ok task_id={} has_due={} flags_reset=true",
            id,
            draft.due_at.is_some()
        );

        self.read_back(id, "edited task not found in read-back")
    }

    /// Moves a task to `column`. Reminder flags are left as they are.
    pub fn move_task(&self, id: TaskId, column: Column) -> BoardResult<()> {
        self.repo.update_column(id, column)?;
        info!(
            "event=task_move module=board status=ok task_id={} column={}",
            id, column
        );
        Ok(())
    }

    /// Hard-deletes a task.
    pub fn delete_task(&self, id: TaskId) -> BoardResult<()> {
        self.repo.delete_task(id)?;
        info!("event=task_delete module=board status=ok task_id={}", id);
        Ok(())
    }

    pub fn get_task(&self, id: TaskId) -> BoardResult<Task> {
        Ok(self.repo.get_task(id)?)
    }

    /// Snapshot of all tasks, newest first.
    pub fn list_tasks(&self) -> BoardResult<Vec<Task>> {
        Ok(self.repo.list_tasks()?)
    }

    /// Snapshot grouped into the three board columns.
    pub fn board(&self) -> BoardResult<BoardView> {
        let mut view = BoardView::default();
        for task in self.repo.list_tasks()? {
            match task.column {
                Column::Todo => view.todo.push(task),
                Column::Doing => view.doing.push(task),
                Column::Done => view.done.push(task),
            }
        }
        Ok(view)
    }

    fn read_back(&self, id: TaskId, details: &'static str) -> BoardResult<Task> {
        match self.repo.get_task(id) {
            Ok(task) => Ok(task),
            Err(RepoError::NotFound(_)) => Err(BoardError::InconsistentState(details)),
            Err(err) => Err(err.into()),
        }
    }
}
