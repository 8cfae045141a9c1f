use super::*;
use crate::traits::with_transaction;

#[test]
fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
    db.ping().unwrap();
}

#[test]
fn test_new_memory_path() {
    let db = DuckDbBackend::new(":memory:").unwrap();
    assert_eq!(db.current_database().unwrap(), "memory");
}

#[test]
fn test_current_database_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = DuckDbBackend::from_path(&dir.path().join("inventory.duckdb")).unwrap();
    assert_eq!(db.current_database().unwrap(), "inventory");
}

#[test]
fn test_execute_with_params_and_query() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE items (id BIGINT, flag BOOLEAN, label VARCHAR)")
        .unwrap();
    let affected = db
        .execute(
            "INSERT INTO items VALUES (?, ?, ?)",
            &[SqlValue::Int(7), SqlValue::Bool(true), SqlValue::from("seven")],
        )
        .unwrap();
    assert_eq!(affected, 1);

    let row = db
        .query_row("SELECT id, flag, label FROM items WHERE id = ?", &[SqlValue::Int(7)])
        .unwrap()
        .unwrap();
    assert_eq!(row.get_i64(0).unwrap(), 7);
    assert!(row.get_bool(1).unwrap());
    assert_eq!(row.get_str(2).unwrap(), "seven");
}

#[test]
fn test_query_row_none_when_empty() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE empty_t (id INT)").unwrap();
    assert!(db.query_row("SELECT id FROM empty_t", &[]).unwrap().is_none());
}

#[test]
fn test_query_rows_int_widening() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE nums AS SELECT CAST(range AS INTEGER) AS n FROM range(3)")
        .unwrap();
    let rows = db.query_rows("SELECT n FROM nums ORDER BY n", &[]).unwrap();
    let values: Vec<i64> = rows.iter().map(|r| r.get_i64(0).unwrap()).collect();
    assert_eq!(values, vec![0, 1, 2]);
}

#[test]
fn test_missing_table_is_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db
        .query_row("SELECT version FROM \"schema_migrations\"", &[])
        .unwrap_err();
    assert!(err.is_missing_relation(), "unexpected: {err}");

    let err = db
        .execute("DELETE FROM \"schema_lock\" WHERE lock_id = ?", &[SqlValue::Int(1)])
        .unwrap_err();
    assert!(err.is_missing_relation(), "unexpected: {err}");
}

#[test]
fn test_create_existing_table_is_not_missing_relation() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").unwrap();
    let err = db.execute_batch("CREATE TABLE t (id INT)").unwrap_err();
    assert!(!err.is_missing_relation());
}

#[test]
fn test_duplicate_key_is_conflict() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE locks (lock_id BIGINT PRIMARY KEY)")
        .unwrap();
    db.execute("INSERT INTO locks VALUES (?)", &[SqlValue::Int(1)])
        .unwrap();
    let err = db
        .execute("INSERT INTO locks VALUES (?)", &[SqlValue::Int(1)])
        .unwrap_err();
    assert!(err.is_conflict(), "unexpected: {err}");
}

#[test]
fn test_syntax_error_is_execution_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.execute_batch("CREAT TABLE nope").unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));
}

#[test]
fn test_relation_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(!db.relation_exists("users").unwrap());
    db.execute_batch("CREATE TABLE users (id INT)").unwrap();
    assert!(db.relation_exists("users").unwrap());
}

#[test]
fn test_relation_exists_ignores_other_schemas() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE SCHEMA staging; CREATE TABLE staging.users (id INT)")
        .unwrap();
    assert!(!db.relation_exists("users").unwrap());
}

fn objects(db: &DuckDbBackend) -> Vec<(String, ObjectKind)> {
    db.list_objects()
        .unwrap()
        .into_iter()
        .map(|o| (o.name, o.kind))
        .collect()
}

#[test]
fn test_list_objects_tables_and_views() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE a_table (id INT);
         CREATE VIEW b_view AS SELECT 1 AS id;",
    )
    .unwrap();
    assert_eq!(
        db.list_objects().unwrap(),
        vec![
            SchemaObject::new("b_view", ObjectKind::View),
            SchemaObject::new("a_table", ObjectKind::Table),
        ]
    );
}

#[test]
fn test_list_objects_referencing_table_first() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE a_parent (id INT PRIMARY KEY);
         CREATE TABLE b_child (id INT PRIMARY KEY, pid INT REFERENCES a_parent(id));
         CREATE TABLE c_grandchild (cid INT REFERENCES b_child(id));",
    )
    .unwrap();
    let names: Vec<String> = objects(&db).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["c_grandchild", "b_child", "a_parent"]);
}

#[test]
fn test_list_objects_sequences_types_macros() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE SEQUENCE seq_ids;
         CREATE TYPE mood AS ENUM ('happy', 'sad');
         CREATE MACRO add1(x) AS x + 1;
         CREATE MACRO ones() AS TABLE SELECT 1 AS one;
         CREATE TABLE t (id INT DEFAULT nextval('seq_ids'), m mood);",
    )
    .unwrap();
    assert_eq!(
        objects(&db),
        vec![
            ("t".to_string(), ObjectKind::Table),
            ("add1".to_string(), ObjectKind::Macro),
            ("ones".to_string(), ObjectKind::TableMacro),
            ("seq_ids".to_string(), ObjectKind::Sequence),
            ("mood".to_string(), ObjectKind::Type),
        ]
    );
}

#[test]
fn test_list_objects_ignores_other_schemas() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE SCHEMA staging;
         CREATE TABLE staging.t (id INT);
         CREATE SEQUENCE staging.s;",
    )
    .unwrap();
    assert!(db.list_objects().unwrap().is_empty());
}

#[test]
fn test_drop_order_keeps_independent_tables_in_place() {
    let tables = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let fks = vec![("c".to_string(), "a".to_string())];
    assert_eq!(drop_order(tables, &fks), vec!["b", "c", "a"]);
}

#[test]
fn test_drop_order_ignores_self_reference() {
    let tables = vec!["node".to_string()];
    let fks = vec![("node".to_string(), "node".to_string())];
    assert_eq!(drop_order(tables, &fks), vec!["node"]);
}

#[test]
fn test_object_kind_keywords() {
    assert_eq!(ObjectKind::TableMacro.keyword(), "MACRO TABLE");
    assert!(ObjectKind::Table.supports_cascade());
    assert!(!ObjectKind::Sequence.supports_cascade());
}

#[test]
fn test_transaction_commit() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").unwrap();
    with_transaction(&db, |tx| -> DbResult<()> {
        tx.execute("INSERT INTO t VALUES (?)", &[SqlValue::Int(1)])?;
        tx.execute("INSERT INTO t VALUES (?)", &[SqlValue::Int(2)])?;
        Ok(())
    })
    .unwrap();
    assert_eq!(db.query_rows("SELECT id FROM t", &[]).unwrap().len(), 2);
}

#[test]
fn test_transaction_rollback_on_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").unwrap();
    let result = with_transaction(&db, |tx| -> DbResult<()> {
        tx.execute("INSERT INTO t VALUES (?)", &[SqlValue::Int(1)])?;
        tx.execute("INSERT INTO missing VALUES (1)", &[])?;
        Ok(())
    });
    assert!(result.is_err());
    assert!(db.query_rows("SELECT id FROM t", &[]).unwrap().is_empty());
}

#[test]
fn test_transaction_dropped_without_commit_rolls_back() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").unwrap();
    {
        let tx = db.begin().unwrap();
        tx.execute("INSERT INTO t VALUES (1)", &[]).unwrap();
    }
    assert!(db.query_rows("SELECT id FROM t", &[]).unwrap().is_empty());
}

#[test]
fn test_try_clone_shares_database() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE shared (id INT); INSERT INTO shared VALUES (1);")
        .unwrap();
    let other = db.try_clone().unwrap();
    assert!(other.relation_exists("shared").unwrap());
    assert_eq!(other.query_rows("SELECT id FROM shared", &[]).unwrap().len(), 1);
}
