use super::*;
use ls_db::{DuckDbBackend, Executor};

const LOCK_ID: i64 = 42;

fn coordinator(force: bool) -> LockCoordinator {
    LockCoordinator::new(TableName::new("schema_lock"), LOCK_ID, force)
}

fn lock_rows(db: &DuckDbBackend) -> i64 {
    db.query_row("SELECT COUNT(*) FROM \"schema_lock\"", &[])
        .unwrap()
        .unwrap()
        .get_i64(0)
        .unwrap()
}

#[test]
fn acquire_creates_table_and_row() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut lock = coordinator(false);
    assert!(!lock.is_locked());

    lock.acquire(&db).unwrap();

    assert!(lock.is_locked());
    assert!(db.relation_exists("schema_lock").unwrap());
    let row = db
        .query_row("SELECT lock_id FROM \"schema_lock\"", &[])
        .unwrap()
        .unwrap();
    assert_eq!(row.get_i64(0).unwrap(), LOCK_ID);
}

#[test]
fn second_holder_is_refused() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut first = coordinator(false);
    let mut second = coordinator(false);

    first.acquire(&db).unwrap();
    let err = second.acquire(&db).unwrap_err();

    match err {
        MigrateError::LockHeld { lock_id, ref table } => {
            assert_eq!(lock_id, LOCK_ID);
            assert_eq!(table, "schema_lock");
        }
        ref other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("inspect table \"schema_lock\""));
    assert!(!second.is_locked());
    assert_eq!(lock_rows(&db), 1);
}

#[test]
fn reacquire_by_same_holder_is_refused() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut lock = coordinator(false);
    lock.acquire(&db).unwrap();
    assert!(matches!(
        lock.acquire(&db),
        Err(MigrateError::LockHeld { .. })
    ));
}

#[test]
fn force_overrides_existing_row() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut crashed = coordinator(false);
    crashed.acquire(&db).unwrap();

    let mut rescuer = coordinator(true);
    rescuer.acquire(&db).unwrap();

    assert!(rescuer.is_locked());
    assert_eq!(lock_rows(&db), 1);
}

#[test]
fn release_then_acquire_again() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut first = coordinator(false);
    let mut second = coordinator(false);

    first.acquire(&db).unwrap();
    first.release(&db).unwrap();
    assert!(!first.is_locked());
    assert_eq!(lock_rows(&db), 0);

    second.acquire(&db).unwrap();
    assert!(second.is_locked());
}

#[test]
fn release_without_table_succeeds() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut lock = coordinator(false);
    lock.release(&db).unwrap();
    assert!(!lock.is_locked());
}

#[test]
fn release_after_table_dropped_succeeds() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut lock = coordinator(false);
    lock.acquire(&db).unwrap();
    db.execute_batch("DROP TABLE \"schema_lock\"").unwrap();

    lock.release(&db).unwrap();
    assert!(!lock.is_locked());
}

#[test]
fn different_ids_do_not_contend() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut a = LockCoordinator::new(TableName::new("schema_lock"), 1, false);
    let mut b = LockCoordinator::new(TableName::new("schema_lock"), 2, false);
    a.acquire(&db).unwrap();
    b.acquire(&db).unwrap();
    assert_eq!(lock_rows(&db), 2);
}

#[test]
fn release_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut lock = coordinator(false);
    lock.acquire(&db).unwrap();
    lock.release(&db).unwrap();
    lock.release(&db).unwrap();
    assert_eq!(lock_rows(&db), 0);
}
