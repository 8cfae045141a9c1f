//! DuckDB engine adapter

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Executor, ObjectKind, SchemaObject, Transaction};
use crate::value::{Row, SqlValue};
use duckdb::types::Value;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open a second, independent connection to the same database.
    ///
    /// Each migration runner needs its own connection so that their
    /// transactions are isolated from each other.
    pub fn try_clone(&self) -> DbResult<Self> {
        let conn = self
            .lock_conn()?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    fn lock_conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

const LIST_VIEWS_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_catalog = current_database() \
       AND table_schema = current_schema() \
       AND table_type = 'VIEW' \
     ORDER BY table_name";

const LIST_TABLES_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_catalog = current_database() \
       AND table_schema = current_schema() \
       AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

const LIST_FOREIGN_KEYS_SQL: &str = "SELECT DISTINCT table_name, referenced_table \
     FROM duckdb_constraints() \
     WHERE constraint_type = 'FOREIGN KEY' \
       AND database_name = current_database() \
       AND schema_name = current_schema()";

const LIST_MACROS_SQL: &str = "SELECT DISTINCT function_name, function_type \
     FROM duckdb_functions() \
     WHERE NOT internal \
       AND function_type IN ('macro', 'table_macro') \
       AND database_name = current_database() \
       AND schema_name = current_schema() \
     ORDER BY function_name";

const LIST_SEQUENCES_SQL: &str = "SELECT sequence_name FROM duckdb_sequences() \
     WHERE database_name = current_database() \
       AND schema_name = current_schema() \
     ORDER BY sequence_name";

const LIST_TYPES_SQL: &str = "SELECT DISTINCT type_name FROM duckdb_types() \
     WHERE NOT internal \
       AND database_name = current_database() \
       AND schema_name = current_schema() \
     ORDER BY type_name";

impl DuckDbBackend {
    /// First column of every row, skipping NULL and empty names
    fn query_names(&self, sql: &str) -> DbResult<Vec<String>> {
        let mut names = Vec::new();
        for row in self.query_rows(sql, &[])? {
            if let Some(name) = row.get_opt_str(0)? {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// `(referencing, referenced)` table pairs in the current schema
    fn foreign_keys(&self) -> DbResult<Vec<(String, String)>> {
        let mut edges = Vec::new();
        for row in self.query_rows(LIST_FOREIGN_KEYS_SQL, &[])? {
            if let (Some(child), Some(parent)) = (row.get_opt_str(0)?, row.get_opt_str(1)?) {
                edges.push((child.to_string(), parent.to_string()));
            }
        }
        Ok(edges)
    }
}

/// Order `tables` so that no table comes before a table that references it.
///
/// Ties keep the input order. Self-references are ignored; anything left in a
/// cycle is appended as-is.
pub(crate) fn drop_order(tables: Vec<String>, foreign_keys: &[(String, String)]) -> Vec<String> {
    let mut remaining = tables;
    let mut ordered = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let next = remaining.iter().position(|table| {
            !foreign_keys.iter().any(|(child, parent)| {
                parent == table && child != table && remaining.contains(child)
            })
        });
        match next {
            Some(index) => ordered.push(remaining.remove(index)),
            None => {
                ordered.append(&mut remaining);
                break;
            }
        }
    }
    ordered
}

fn to_duckdb(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Int(n) => Value::BigInt(*n),
        SqlValue::Bool(b) => Value::Boolean(*b),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

fn from_duckdb(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Bool(b),
        Value::TinyInt(n) => SqlValue::Int(n.into()),
        Value::SmallInt(n) => SqlValue::Int(n.into()),
        Value::Int(n) => SqlValue::Int(n.into()),
        Value::BigInt(n) => SqlValue::Int(n),
        Value::UTinyInt(n) => SqlValue::Int(n.into()),
        Value::USmallInt(n) => SqlValue::Int(n.into()),
        Value::UInt(n) => SqlValue::Int(n.into()),
        Value::UBigInt(n) => i64::try_from(n)
            .map(SqlValue::Int)
            .unwrap_or_else(|_| SqlValue::Text(n.to_string())),
        Value::HugeInt(n) => i64::try_from(n)
            .map(SqlValue::Int)
            .unwrap_or_else(|_| SqlValue::Text(n.to_string())),
        Value::Text(s) => SqlValue::Text(s),
        other => SqlValue::Text(format!("{other:?}")),
    }
}

fn execute_on(conn: &Connection, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
    let values: Vec<Value> = params.iter().map(to_duckdb).collect();
    Ok(conn.execute(sql, duckdb::params_from_iter(values))?)
}

fn execute_batch_on(conn: &Connection, sql: &str) -> DbResult<()> {
    Ok(conn.execute_batch(sql)?)
}

/// Collect all rows of a query.
///
/// DuckDB 1.4 panics on `stmt.column_count()` before execution, so the column
/// count is read from each row instead.
fn query_rows_on(conn: &Connection, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>> {
    let values: Vec<Value> = params.iter().map(to_duckdb).collect();
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(duckdb::params_from_iter(values), |row| {
        let col_count = row.as_ref().column_count();
        (0..col_count)
            .map(|i| row.get::<_, Value>(i).map(from_duckdb))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(Row::new(row?));
    }
    Ok(out)
}

impl Executor for DuckDbBackend {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        let conn = self.lock_conn()?;
        execute_on(&conn, sql, params)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock_conn()?;
        execute_batch_on(&conn, sql)
    }

    fn query_row(&self, sql: &str, params: &[SqlValue]) -> DbResult<Option<Row>> {
        let conn = self.lock_conn()?;
        Ok(query_rows_on(&conn, sql, params)?.into_iter().next())
    }

    fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>> {
        let conn = self.lock_conn()?;
        query_rows_on(&conn, sql, params)
    }
}

impl Database for DuckDbBackend {
    fn ping(&self) -> DbResult<()> {
        self.lock_conn()?
            .execute_batch("SELECT 1")
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn current_database(&self) -> DbResult<String> {
        let row = self.query_row("SELECT current_database()", &[])?;
        match row {
            Some(row) => Ok(row.get_opt_str(0)?.unwrap_or_default().to_string()),
            None => Ok(String::new()),
        }
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let row = self.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_catalog = current_database() \
               AND table_schema = current_schema() \
               AND table_name = ?",
            &[SqlValue::from(name)],
        )?;
        let count = match row {
            Some(row) => row.get_i64(0)?,
            None => 0,
        };
        Ok(count > 0)
    }

    fn list_objects(&self) -> DbResult<Vec<SchemaObject>> {
        let mut objects = Vec::new();

        for name in self.query_names(LIST_VIEWS_SQL)? {
            objects.push(SchemaObject::new(name, ObjectKind::View));
        }

        let tables = self.query_names(LIST_TABLES_SQL)?;
        let foreign_keys = self.foreign_keys()?;
        for name in drop_order(tables, &foreign_keys) {
            objects.push(SchemaObject::new(name, ObjectKind::Table));
        }

        for row in self.query_rows(LIST_MACROS_SQL, &[])? {
            let kind = match row.get_opt_str(1)? {
                Some("table_macro") => ObjectKind::TableMacro,
                _ => ObjectKind::Macro,
            };
            objects.push(SchemaObject::new(row.get_str(0)?, kind));
        }

        for name in self.query_names(LIST_SEQUENCES_SQL)? {
            objects.push(SchemaObject::new(name, ObjectKind::Sequence));
        }
        for name in self.query_names(LIST_TYPES_SQL)? {
            objects.push(SchemaObject::new(name, ObjectKind::Type));
        }
        Ok(objects)
    }

    fn begin(&self) -> DbResult<Box<dyn Transaction + '_>> {
        let conn = self.lock_conn()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        Ok(Box::new(DuckDbTransaction {
            conn,
            finished: false,
        }))
    }
}

/// Open DuckDB transaction holding the connection for its whole lifetime
pub struct DuckDbTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl Executor for DuckDbTransaction<'_> {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        execute_on(&self.conn, sql, params)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        execute_batch_on(&self.conn, sql)
    }

    fn query_row(&self, sql: &str, params: &[SqlValue]) -> DbResult<Option<Row>> {
        Ok(query_rows_on(&self.conn, sql, params)?.into_iter().next())
    }

    fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>> {
        query_rows_on(&self.conn, sql, params)
    }
}

impl Transaction for DuckDbTransaction<'_> {
    fn commit(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            let err = DbError::from(commit_err);
            return Err(if err.is_conflict() {
                err
            } else {
                DbError::TransactionError(format!("COMMIT failed: {err}"))
            });
        }
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }
}

impl Drop for DuckDbTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
