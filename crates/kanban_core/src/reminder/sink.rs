//! Notification sinks.
//!
//! # Responsibility
//! - Define the seam through which reminders reach the user.
//! - Provide the textual log-line renderer and an external-command renderer.
//! - Chain a primary renderer with a fallback.
//!
//! # Invariants
//! - `notify` reports failure through `SinkError`; it never panics.
//! - An external notifier runs for at most its timeout, then is killed.

use crate::logging::logging_status;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

pub const DEFAULT_NOTIFIER_TIMEOUT: Duration = Duration::from_secs(10);
const NOTIFIER_POLL_STEP: Duration = Duration::from_millis(50);

/// Failure to render a reminder.
#[derive(Debug)]
pub enum SinkError {
    /// The notifier program could not be started.
    Spawn(std::io::Error),
    /// The notifier program exited unsuccessfully.
    CommandFailed { code: Option<i32> },
    /// The notifier outlived its deadline and was killed.
    TimedOut { after: Duration },
    /// Waiting on the notifier process failed.
    Wait(std::io::Error),
    Rejected(String),
}

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to start notifier: {err}"),
            Self::CommandFailed { code: Some(code) } => {
                write!(f, "notifier exited with status {code}")
            }
            Self::CommandFailed { code: None } => write!(f, "notifier terminated by signal"),
            Self::TimedOut { after } => {
                write!(f, "notifier timed out after {}ms", after.as_millis())
            }
            Self::Wait(err) => write!(f, "failed to wait for notifier: {err}"),
            Self::Rejected(reason) => write!(f, "notification rejected: {reason}"),
        }
    }
}

impl Error for SinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) | Self::Wait(err) => Some(err),
            _ => None,
        }
    }
}

/// Consumer of `(heading, body)` reminder pairs.
pub trait NotificationSink: Send {
    fn notify(&self, heading: &str, body: &str) -> Result<(), SinkError>;
}

impl<S: NotificationSink + ?Sized> NotificationSink for Box<S> {
    fn notify(&self, heading: &str, body: &str) -> Result<(), SinkError> {
        (**self).notify(heading, body)
    }
}

/// Renders reminders as a log line, or on stderr while file logging is not
/// running. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, heading: &str, body: &str) -> Result<(), SinkError> {
        if logging_status().is_none() {
            // No logger installed.
            let _ = write_reminder_line(&mut std::io::stderr().lock(), heading, body);
            return Ok(());
        }
        info!(
            "event=reminder module=reminder channel=log heading={:?} body={:?}",
            heading, body
        );
        Ok(())
    }
}

fn write_reminder_line(out: &mut impl Write, heading: &str, body: &str) -> std::io::Result<()> {
    writeln!(out, "[reminder] {heading} - {body}")
}

/// Runs `<program> <args..> <heading> <body>` for each reminder, e.g.
/// `notify-send`.
#[derive(Debug, Clone)]
pub struct CommandNotificationSink {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandNotificationSink {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_NOTIFIER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra leading arguments, placed before heading and body.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl NotificationSink for CommandNotificationSink {
    fn notify(&self, heading: &str, body: &str) -> Result<(), SinkError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(heading)
            .arg(body)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .map_err(SinkError::Spawn)?;

        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(SinkError::CommandFailed {
                        code: status.code(),
                    })
                }
                Ok(None) if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SinkError::TimedOut {
                        after: self.timeout,
                    });
                }
                Ok(None) => std::thread::sleep(NOTIFIER_POLL_STEP),
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SinkError::Wait(err));
                }
            }
        }
    }
}

/// Tries `primary` first and hands the reminder to `fallback` when it fails.
pub struct FallbackSink<P, F> {
    primary: P,
    fallback: F,
}

impl<P: NotificationSink, F: NotificationSink> FallbackSink<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: NotificationSink, F: NotificationSink> NotificationSink for FallbackSink<P, F> {
    fn notify(&self, heading: &str, body: &str) -> Result<(), SinkError> {
        match self.primary.notify(heading, body) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(
                    "event=notify module=reminder status=degraded channel=primary error={}",
                    err
                );
                self.fallback.notify(heading, body)
            }
        }
    }
}
