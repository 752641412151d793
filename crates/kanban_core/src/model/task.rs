//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record owned by the task store.
//! - Define the closed sets of board columns and reminder tiers.
//! - Validate user-supplied task fields before any persistence.
//!
//! # Invariants
//! - `title` is never empty (after trimming) for a persisted task.
//! - `column` is always one of `todo|doing|done`.
//! - Notification flags only move false -> true within a reminder epoch; an
//!   edit clears all four at once.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned surrogate key. Monotonic, never reused while the row lives.
pub type TaskId = i64;

/// Board column a task currently sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Not started. Every new task lands here.
    #[default]
    Todo,
    /// In progress.
    Doing,
    /// Finished.
    Done,
}

impl Column {
    /// All columns in board order.
    pub const ALL: [Column; 3] = [Column::Todo, Column::Doing, Column::Done];

    /// Persisted `coluna` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }

    /// Human-readable column heading.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::Doing => "Doing",
            Self::Done => "Done",
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected column name from string input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColumn(pub String);

impl Display for InvalidColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid column `{}`; expected todo|doing|done", self.0)
    }
}

impl Error for InvalidColumn {}

impl FromStr for Column {
    type Err = InvalidColumn;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            other => Err(InvalidColumn(other.to_string())),
        }
    }
}

/// One of the four reminder thresholds, each guarded by its own flag.
///
/// Declared in poll order: earliest warning first, terminal tier last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderTier {
    TenDay,
    FiveDay,
    OneDay,
    /// Due or overdue. The only tier whose window is open toward the past.
    Due,
}

impl ReminderTier {
    /// Tiers in the order a poll cycle evaluates them.
    pub const ALL: [ReminderTier; 4] = [
        ReminderTier::TenDay,
        ReminderTier::FiveDay,
        ReminderTier::OneDay,
        ReminderTier::Due,
    ];

    /// Name of the flag column guarding this tier.
    pub fn flag_column(self) -> &'static str {
        match self {
            Self::TenDay => "notificado_10d",
            Self::FiveDay => "notificado_5d",
            Self::OneDay => "notificado_1d",
            Self::Due => "notificado",
        }
    }

    /// Short label used in logs and CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Self::TenDay => "10d",
            Self::FiveDay => "5d",
            Self::OneDay => "1d",
            Self::Due => "due",
        }
    }

    /// Resolves a flag column name to its tier.
    ///
    /// Only the four flag columns are accepted; any other name is rejected so
    /// an arbitrary field name can never reach SQL.
    pub fn from_flag_name(name: &str) -> Result<Self, InvalidFlagName> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.flag_column() == name)
            .ok_or_else(|| InvalidFlagName(name.to_string()))
    }
}

impl Display for ReminderTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejected notification flag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFlagName(pub String);

impl Display for InvalidFlagName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid notification flag `{}`; expected notificado|notificado_10d|notificado_5d|notificado_1d",
            self.0
        )
    }
}

impl Error for InvalidFlagName {}

/// Per-tier "already fired in this epoch" markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFlags {
    pub ten_day: bool,
    pub five_day: bool,
    pub one_day: bool,
    pub due: bool,
}

impl NotificationFlags {
    /// Whether `tier` already fired in the current epoch.
    pub fn is_set(&self, tier: ReminderTier) -> bool {
        match tier {
            ReminderTier::TenDay => self.ten_day,
            ReminderTier::FiveDay => self.five_day,
            ReminderTier::OneDay => self.one_day,
            ReminderTier::Due => self.due,
        }
    }

    /// Marks `tier` as fired. Never clears a flag.
    pub fn mark(&mut self, tier: ReminderTier) {
        match tier {
            ReminderTier::TenDay => self.ten_day = true,
            ReminderTier::FiveDay => self.five_day = true,
            ReminderTier::OneDay => self.one_day = true,
            ReminderTier::Due => self.due = true,
        }
    }

    /// True when no tier has fired yet (fresh epoch).
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub column: Column,
    /// Set once at creation, local wall-clock.
    pub created_at: NaiveDateTime,
    /// `None` means the task never produces reminders.
    pub due_at: Option<NaiveDateTime>,
    pub flags: NotificationFlags,
}

/// Validation failures for user-supplied task fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Editable task fields, as entered by the user.
///
/// Used by both create and edit; an edit replaces all three fields at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<NaiveDateTime>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_at(mut self, due_at: NaiveDateTime) -> Self {
        self.due_at = Some(due_at);
        self
    }

    /// Returns the storage form of this draft.
    ///
    /// Trims the title, maps a blank description to `None` and drops
    /// sub-second precision from the due date.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is empty or whitespace only.
    pub fn normalized(&self) -> Result<TaskDraft, TaskValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Ok(TaskDraft {
            title: title.to_string(),
            description,
            due_at: self.due_at.map(super::timestamp::truncate_to_seconds),
        })
    }
}
