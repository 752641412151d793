//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the task store CRUD API over the `tasks` table.
//! - Provide the per-tier candidate query used by the reminder scheduler.
//! - Keep SQL and column naming inside the persistence boundary.
//!
//! # Invariants
//! - Every operation is a single statement, hence a single transaction.
//! - `update_fields` always clears all four notification flags.
//! - `update_column` and `set_flag` never touch any other field.
//! - Malformed stored timestamps read as "now"; any other invalid persisted
//!   value is rejected instead of masked.
//! - The reminder candidate query skips rows it cannot decode, so one bad row
//!   cannot starve every other task of reminders.

use crate::clock::local_now;
use crate::db::DbError;
use crate::model::task::{
    Column, NotificationFlags, ReminderTier, Task, TaskDraft, TaskId, TaskValidationError,
};
use crate::model::timestamp::{format_timestamp, parse_timestamp};
use chrono::NaiveDateTime;
use log::warn;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    titulo,
    descricao,
    coluna,
    data_criacao,
    notificar_em,
    notificado,
    notificado_10d,
    notificado_5d,
    notificado_1d
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Task fields were rejected before any mutation.
    Validation(TaskValidationError),
    /// A statement failed on an open connection.
    Db(DbError),
    NotFound(TaskId),
    /// The store could not be opened at all.
    StorageUnavailable(DbError),
    InvalidData(String),
}

impl RepoError {
    /// Whether the failure is transient storage trouble rather than a caller
    /// mistake.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Db(_) | Self::StorageUnavailable(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::StorageUnavailable(err) => write!(f, "task store unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) | Self::StorageUnavailable(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable task record store.
pub trait TaskRepository {
    /// Inserts a task in `todo` with all flags clear and returns its id.
    fn create_task(&self, draft: &TaskDraft, created_at: NaiveDateTime) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Task>;
    /// Snapshot of every task, newest first.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Replaces title/description/due date and starts a new reminder epoch.
    fn update_fields(&self, id: TaskId, draft: &TaskDraft) -> RepoResult<()>;
    fn update_column(&self, id: TaskId, column: Column) -> RepoResult<()>;
    /// Sets exactly the flag guarding `tier`.
    fn set_flag(&self, id: TaskId, tier: ReminderTier) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Tasks with a due date whose `tier` flag is still clear, earliest due
    /// first. Window filtering is left to the caller. Rows holding invalid
    /// persisted values are skipped.
    fn list_unnotified(&self, tier: ReminderTier) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository over one borrowed connection.
#[derive(Clone, Copy)]
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_tasks(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Task>> {
        let now = local_now();
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row, now)?);
        }

        Ok(tasks)
    }

    /// Like `query_tasks`, but drops undecodable rows with a warning.
    fn query_decodable_tasks(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Task>> {
        let now = local_now();
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            match parse_task_row(row, now) {
                Ok(task) => tasks.push(task),
                Err(RepoError::InvalidData(reason)) => {
                    warn!(
                        "event=row_skipped module=repo status=degraded reason={:?}",
                        reason
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, draft: &TaskDraft, created_at: NaiveDateTime) -> RepoResult<TaskId> {
        let draft = draft.normalized()?;

        self.conn.execute(
            "INSERT INTO tasks (titulo, descricao, coluna, data_criacao, notificar_em)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.title,
                draft.description,
                Column::Todo.as_str(),
                format_timestamp(created_at),
                draft.due_at.map(format_timestamp),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Task> {
        self.query_tasks(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"), [id])?
            .pop()
            .ok_or(RepoError::NotFound(id))
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} ORDER BY data_criacao DESC, id DESC;"),
            [],
        )
    }

    fn update_fields(&self, id: TaskId, draft: &TaskDraft) -> RepoResult<()> {
        let draft = draft.normalized()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                titulo = ?1,
                descricao = ?2,
                notificar_em = ?3,
                notificado = 0,
                notificado_10d = 0,
                notificado_5d = 0,
                notificado_1d = 0
             WHERE id = ?4;",
            params![
                draft.title,
                draft.description,
                draft.due_at.map(format_timestamp),
                id
            ],
        )?;

        ensure_changed(changed, id)
    }

    fn update_column(&self, id: TaskId, column: Column) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET coluna = ?1 WHERE id = ?2;",
            params![column.as_str(), id],
        )?;

        ensure_changed(changed, id)
    }

    fn set_flag(&self, id: TaskId, tier: ReminderTier) -> RepoResult<()> {
        // `flag_column` is a closed set of static names, never caller text.
        let changed = self.conn.execute(
            &format!("UPDATE tasks SET {} = 1 WHERE id = ?1;", tier.flag_column()),
            [id],
        )?;

        ensure_changed(changed, id)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        ensure_changed(changed, id)
    }

    fn list_unnotified(&self, tier: ReminderTier) -> RepoResult<Vec<Task>> {
        self.query_decodable_tasks(
            &format!(
                "{TASK_SELECT_SQL}
                 WHERE notificar_em IS NOT NULL
                   AND {} = 0
                 ORDER BY notificar_em ASC, id ASC;",
                tier.flag_column()
            ),
            [],
        )
    }
}

fn ensure_changed(changed: usize, id: TaskId) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound(id));
    }
    Ok(())
}

fn parse_task_row(row: &Row<'_>, now: NaiveDateTime) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let column_text: String = row.get("coluna")?;
    let column = column_text.parse::<Column>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid column `{column_text}` in tasks.coluna for id {id}"
        ))
    })?;

    let created_at = match row.get::<_, Option<String>>("data_criacao")? {
        Some(raw) => read_timestamp(id, "data_criacao", &raw, now),
        None => now,
    };
    let due_at = row
        .get::<_, Option<String>>("notificar_em")?
        .map(|raw| read_timestamp(id, "notificar_em", &raw, now));

    let flags = NotificationFlags {
        due: parse_flag(row, id, ReminderTier::Due)?,
        ten_day: parse_flag(row, id, ReminderTier::TenDay)?,
        five_day: parse_flag(row, id, ReminderTier::FiveDay)?,
        one_day: parse_flag(row, id, ReminderTier::OneDay)?,
    };

    Ok(Task {
        id,
        title: row.get("titulo")?,
        description: row.get("descricao")?,
        column,
        created_at,
        due_at,
        flags,
    })
}

fn read_timestamp(id: TaskId, field: &str, raw: &str, now: NaiveDateTime) -> NaiveDateTime {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!(
            "event=timestamp_fallback module=repo status=degraded task_id={} field={}",
            id, field
        );
        now
    })
}

fn parse_flag(row: &Row<'_>, id: TaskId, tier: ReminderTier) -> RepoResult<bool> {
    match row.get::<_, i64>(tier.flag_column())? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in tasks.{} for id {id}",
            tier.flag_column()
        ))),
    }
}
