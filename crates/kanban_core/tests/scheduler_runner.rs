use chrono::{Duration, NaiveDate, NaiveDateTime};
use crossbeam_channel::{unbounded, Sender};
use kanban_core::{
    AppConfig, AppContext, FixedClock, NotificationSink, ReminderTier, SinkError, TaskDraft,
    TaskRepository,
};
use std::sync::Arc;
use std::time::Duration as StdDuration;

const WAIT: StdDuration = StdDuration::from_secs(5);

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, 3)
        .unwrap()
        .and_hms_opt(7, 30, 0)
        .unwrap()
}

struct ChannelSink(Sender<String>);

impl NotificationSink for ChannelSink {
    fn notify(&self, heading: &str, _body: &str) -> Result<(), SinkError> {
        self.0
            .send(heading.to_string())
            .map_err(|err| SinkError::Rejected(err.to_string()))
    }
}

fn context(dir: &tempfile::TempDir, clock: Arc<FixedClock>) -> AppContext {
    let config = AppConfig::from_lookup(|_| None)
        .unwrap()
        .with_db_path(dir.path().join("kanban.db"))
        .with_poll_interval(StdDuration::from_millis(50))
        .unwrap();
    AppContext::open_with_clock(config, clock).unwrap()
}

#[test]
fn worker_polls_at_start_and_on_every_tick() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(t0()));
    let ctx = context(&dir, clock.clone());
    let board = ctx.board();
    board
        .create_task(&TaskDraft::new("standup").with_due_at(t0() + Duration::hours(2)))
        .unwrap();

    let (tx, rx) = unbounded();
    let handle = ctx.start_scheduler(ChannelSink(tx)).unwrap();

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "Urgent: standup");

    clock.advance(Duration::hours(3));
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "Reminder: standup");

    assert!(handle.is_running());
    handle.stop();

    // Nothing else may fire once both applicable tiers are spent.
    assert!(rx.try_recv().is_err());
}

#[test]
fn stop_leaves_flags_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(t0()));
    let ctx = context(&dir, clock);
    let task = ctx
        .board()
        .create_task(&TaskDraft::new("taxes").with_due_at(t0() - Duration::minutes(1)))
        .unwrap();

    let (tx, rx) = unbounded();
    let handle = ctx.start_scheduler(ChannelSink(tx)).unwrap();
    rx.recv_timeout(WAIT).unwrap();
    handle.stop();

    let stored = ctx.store().get_task(task.id).unwrap();
    assert!(stored.flags.is_set(ReminderTier::Due));
    assert!(!stored.flags.is_set(ReminderTier::OneDay));
}

#[test]
fn dropping_handle_stops_worker() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, Arc::new(FixedClock::new(t0())));
    let (tx, rx) = unbounded();

    let handle = ctx.start_scheduler(ChannelSink(tx)).unwrap();
    drop(handle);

    // The sink (and its sender) lives on the worker; it is gone after join.
    assert!(rx.recv_timeout(WAIT).is_err());
}

#[test]
fn worker_survives_storage_outage() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(t0()));
    let ctx = context(&dir, clock);
    let db_path = ctx.store().db_path().to_path_buf();

    let (tx, rx) = unbounded();
    let handle = ctx.start_scheduler(ChannelSink(tx)).unwrap();

    // Put a directory where the database was so every open fails.
    let parked = dir.path().join("parked.db");
    std::fs::rename(&db_path, &parked).unwrap();
    std::fs::create_dir(&db_path).unwrap();
    std::thread::sleep(StdDuration::from_millis(200));
    assert!(handle.is_running());

    std::fs::remove_dir(&db_path).unwrap();
    std::fs::rename(&parked, &db_path).unwrap();
    ctx.board()
        .create_task(&TaskDraft::new("recovered").with_due_at(t0()))
        .unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "Reminder: recovered");

    handle.stop();
}

#[test]
fn default_sink_falls_back_to_log_when_notifier_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::from_lookup(|_| None)
        .unwrap()
        .with_db_path(dir.path().join("kanban.db"));
    config.notify_command = Some(dir.path().join("no-such-notifier"));
    let ctx = AppContext::open(config).unwrap();

    assert!(ctx.default_sink().notify("Urgent: x", "1 day left for your task!").is_ok());
}
