use chrono::{Duration, NaiveDate, NaiveDateTime};
use kanban_core::db::open_db_in_memory;
use kanban_core::{
    Column, NotificationFlags, ReminderTier, RepoError, SqliteTaskRepository, TaskDraft,
    TaskRepository, TaskStore, TaskValidationError,
};
use rusqlite::Connection;

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_defaults_to_todo_with_clear_flags() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let draft = TaskDraft::new("file taxes")
        .with_description("before the deadline")
        .with_due_at(t0() + Duration::days(9));
    let id = repo.create_task(&draft, t0()).unwrap();

    let task = repo.get_task(id).unwrap();
    assert_eq!(task.title, "file taxes");
    assert_eq!(task.description.as_deref(), Some("before the deadline"));
    assert_eq!(task.column, Column::Todo);
    assert_eq!(task.created_at, t0());
    assert_eq!(task.due_at, Some(t0() + Duration::days(9)));
    assert!(task.flags.is_clear());
}

#[test]
fn ids_are_monotonic() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let first = repo.create_task(&TaskDraft::new("a"), t0()).unwrap();
    let second = repo.create_task(&TaskDraft::new("b"), t0()).unwrap();
    repo.delete_task(second).unwrap();
    let third = repo.create_task(&TaskDraft::new("c"), t0()).unwrap();

    assert!(second > first);
    assert!(third > second);
}

#[test]
fn empty_title_is_rejected_without_mutation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let id = repo.create_task(&TaskDraft::new("keep me"), t0()).unwrap();
    let before = repo.get_task(id).unwrap();

    let err = repo.create_task(&TaskDraft::new(""), t0()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::EmptyTitle)
    ));

    let err = repo.update_fields(id, &TaskDraft::new("  ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert_eq!(row_count(&conn), 1);
    assert_eq!(repo.get_task(id).unwrap(), before);
}

#[test]
fn get_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let err = repo.get_task(42).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn list_is_newest_first_with_id_tiebreak() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let oldest = repo.create_task(&TaskDraft::new("oldest"), t0()).unwrap();
    let newest = repo
        .create_task(&TaskDraft::new("newest"), t0() + Duration::hours(2))
        .unwrap();
    let same_second_a = repo
        .create_task(&TaskDraft::new("tie a"), t0() + Duration::hours(1))
        .unwrap();
    let same_second_b = repo
        .create_task(&TaskDraft::new("tie b"), t0() + Duration::hours(1))
        .unwrap();

    let ids = repo
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, [newest, same_second_b, same_second_a, oldest]);
}

#[test]
fn update_fields_replaces_fields_and_resets_every_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let id = repo
        .create_task(
            &TaskDraft::new("draft").with_due_at(t0() + Duration::days(3)),
            t0(),
        )
        .unwrap();
    for tier in ReminderTier::ALL {
        repo.set_flag(id, tier).unwrap();
    }

    let edited = TaskDraft::new("final")
        .with_description("notes")
        .with_due_at(t0() + Duration::days(20));
    repo.update_fields(id, &edited).unwrap();

    let task = repo.get_task(id).unwrap();
    assert_eq!(task.title, "final");
    assert_eq!(task.description.as_deref(), Some("notes"));
    assert_eq!(task.due_at, Some(t0() + Duration::days(20)));
    assert_eq!(task.flags, NotificationFlags::default());
    assert_eq!(task.created_at, t0());
}

#[test]
fn update_fields_can_clear_due_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let id = repo
        .create_task(&TaskDraft::new("x").with_due_at(t0()), t0())
        .unwrap();

    repo.update_fields(id, &TaskDraft::new("x")).unwrap();
    assert_eq!(repo.get_task(id).unwrap().due_at, None);
}

#[test]
fn update_column_changes_only_the_column() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let id = repo
        .create_task(
            &TaskDraft::new("move me")
                .with_description("d")
                .with_due_at(t0() + Duration::days(2)),
            t0(),
        )
        .unwrap();
    repo.set_flag(id, ReminderTier::FiveDay).unwrap();
    let before = repo.get_task(id).unwrap();

    repo.update_column(id, Column::Doing).unwrap();

    let after = repo.get_task(id).unwrap();
    assert_eq!(after.column, Column::Doing);
    assert_eq!(
        kanban_core::Task {
            column: before.column,
            ..after
        },
        before
    );
}

#[test]
fn set_flag_sets_exactly_one_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    for tier in ReminderTier::ALL {
        let id = repo.create_task(&TaskDraft::new("flagged"), t0()).unwrap();
        repo.set_flag(id, tier).unwrap();

        let flags = repo.get_task(id).unwrap().flags;
        for other in ReminderTier::ALL {
            assert_eq!(flags.is_set(other), other == tier, "set {tier}, checked {other}");
        }
    }
}

#[test]
fn mutations_on_unknown_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    assert!(matches!(
        repo.update_fields(7, &TaskDraft::new("x")),
        Err(RepoError::NotFound(7))
    ));
    assert!(matches!(
        repo.update_column(7, Column::Done),
        Err(RepoError::NotFound(7))
    ));
    assert!(matches!(
        repo.set_flag(7, ReminderTier::Due),
        Err(RepoError::NotFound(7))
    ));
    assert!(matches!(repo.delete_task(7), Err(RepoError::NotFound(7))));
}

#[test]
fn delete_is_hard() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let id = repo.create_task(&TaskDraft::new("gone"), t0()).unwrap();

    repo.delete_task(id).unwrap();

    assert_eq!(row_count(&conn), 0);
    assert!(matches!(repo.delete_task(id), Err(RepoError::NotFound(_))));
}

#[test]
fn list_unnotified_skips_undated_and_flagged_tasks() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let later = repo
        .create_task(&TaskDraft::new("later").with_due_at(t0() + Duration::days(8)), t0())
        .unwrap();
    let sooner = repo
        .create_task(&TaskDraft::new("sooner").with_due_at(t0() + Duration::days(6)), t0())
        .unwrap();
    repo.create_task(&TaskDraft::new("no due date"), t0()).unwrap();
    let flagged = repo
        .create_task(&TaskDraft::new("flagged").with_due_at(t0() + Duration::days(7)), t0())
        .unwrap();
    repo.set_flag(flagged, ReminderTier::TenDay).unwrap();

    let ids = repo
        .list_unnotified(ReminderTier::TenDay)
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, [sooner, later]);

    let due_candidates = repo.list_unnotified(ReminderTier::Due).unwrap();
    assert_eq!(due_candidates.len(), 3);
}

#[test]
fn malformed_stored_due_date_reads_as_now() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let id = repo.create_task(&TaskDraft::new("garbled"), t0()).unwrap();
    conn.execute(
        "UPDATE tasks SET notificar_em = 'next tuesday' WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let before = kanban_core::clock::local_now();
    let due_at = repo.get_task(id).unwrap().due_at.unwrap();
    let after = kanban_core::clock::local_now();

    assert!(due_at >= before && due_at <= after);
}

#[test]
fn invalid_persisted_column_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let id = repo.create_task(&TaskDraft::new("odd"), t0()).unwrap();
    conn.execute("UPDATE tasks SET coluna = 'archived' WHERE id = ?1;", [id])
        .unwrap();

    assert!(matches!(repo.get_task(id), Err(RepoError::InvalidData(_))));
}

#[test]
fn file_store_persists_across_calls() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(dir.path().join("kanban.db"));

    let id = store
        .create_task(&TaskDraft::new("durable"), t0())
        .unwrap();
    store.update_column(id, Column::Done).unwrap();

    let reopened = TaskStore::new(dir.path().join("kanban.db"));
    let task = reopened.get_task(id).unwrap();
    assert_eq!(task.title, "durable");
    assert_eq!(task.column, Column::Done);
}

#[test]
fn unopenable_store_reports_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();
    let store = TaskStore::new(blocker.join("kanban.db"));

    let err = store.list_tasks().unwrap_err();
    assert!(matches!(err, RepoError::StorageUnavailable(_)));
    assert!(err.is_storage_failure());
    assert!(matches!(store.check(), Err(RepoError::StorageUnavailable(_))));
}

#[test]
fn file_store_validates_before_opening_storage() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();
    let store = TaskStore::new(blocker.join("kanban.db"));

    let err = store.create_task(&TaskDraft::new(""), t0()).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}
