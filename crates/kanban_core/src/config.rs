//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve database path, poll cadence, logging and notifier settings from
//!   the environment, with defaults.
//!
//! # Invariants
//! - `poll_interval` is never zero.
//! - `log_dir` is always absolute (required by `init_logging`).

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_PATH_ENV: &str = "KANBAN_DB_PATH";
pub const POLL_INTERVAL_ENV: &str = "KANBAN_POLL_INTERVAL_SECS";
pub const LOG_LEVEL_ENV: &str = "KANBAN_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "KANBAN_LOG_DIR";
pub const NOTIFY_COMMAND_ENV: &str = "KANBAN_NOTIFY_COMMAND";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

const APP_DIR_NAME: &str = "kanban";
const DB_FILE_NAME: &str = "kanban.db";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPollInterval(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPollInterval(raw) => write!(
                f,
                "invalid {POLL_INTERVAL_ENV} `{raw}`; expected a positive number of seconds"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub poll_interval: Duration,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// External notifier program; `None` renders reminders as log lines.
    pub notify_command: Option<PathBuf>,
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = get(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let poll_interval = match get(POLL_INTERVAL_ENV) {
            Some(raw) => parse_poll_interval(&raw)?,
            None => DEFAULT_POLL_INTERVAL,
        };

        let log_dir = get(LOG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_log_dir(&db_path));

        Ok(Self {
            db_path,
            poll_interval,
            log_level: get(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: absolutize(log_dir),
            notify_command: get(NOTIFY_COMMAND_ENV).map(PathBuf::from),
        })
    }

    /// Overrides the database path, moving the default log directory along.
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        let previous_default = absolutize(default_log_dir(&self.db_path));
        self.db_path = db_path.into();
        if self.log_dir == previous_default {
            self.log_dir = absolutize(default_log_dir(&self.db_path));
        }
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Result<Self, ConfigError> {
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval("0".to_string()));
        }
        self.poll_interval = poll_interval;
        Ok(self)
    }
}

fn parse_poll_interval(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidPollInterval(raw.to_string())),
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(DB_FILE_NAME)
}

fn default_log_dir(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(LOG_DIR_NAME)
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
