//! Engine adapter trait definitions

use crate::error::{DbError, DbResult};
use crate::value::{Row, SqlValue};

/// Kind of a schema object listed by [`Database::list_objects`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    View,
    Sequence,
    Type,
    Macro,
    TableMacro,
}

impl ObjectKind {
    /// SQL keyword(s) used in `DROP <kind>` statements
    pub fn keyword(self) -> &'static str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Type => "TYPE",
            ObjectKind::Macro => "MACRO",
            ObjectKind::TableMacro => "MACRO TABLE",
        }
    }

    /// Whether `DROP ... CASCADE` applies to this kind
    pub fn supports_cascade(self) -> bool {
        matches!(self, ObjectKind::Table | ObjectKind::View)
    }
}

/// A user-created object in the connection's current schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObject {
    pub name: String,
    pub kind: ObjectKind,
}

impl SchemaObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Statement execution, shared by connections and open transactions.
pub trait Executor {
    /// Execute one statement, returns affected rows
    fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Execute a payload that may contain several statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return its first row, if any
    fn query_row(&self, sql: &str, params: &[SqlValue]) -> DbResult<Option<Row>>;

    /// Run a query and return all rows
    fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>>;
}

/// An open transaction. Dropping it without [`commit`](Transaction::commit)
/// rolls it back.
pub trait Transaction: Executor {
    /// Commit the transaction
    fn commit(self: Box<Self>) -> DbResult<()>;

    /// Roll the transaction back
    fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// Engine adapter consumed by the migration engine.
///
/// Implementations must be Send + Sync. Every call is a blocking round-trip.
pub trait Database: Executor + Send + Sync {
    /// Check that the engine is reachable
    fn ping(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Name of the database the connection is attached to
    fn current_database(&self) -> DbResult<String>;

    /// Check if a table or view exists in the current schema
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// List every user-created object in the current schema.
    ///
    /// Objects come back in an order in which each can be dropped with one
    /// statement: dependents (referencing tables, views) before the objects
    /// they depend on.
    fn list_objects(&self) -> DbResult<Vec<SchemaObject>>;

    /// Start a transaction
    fn begin(&self) -> DbResult<Box<dyn Transaction + '_>>;
}

/// Execute `body` within a transaction, committing on `Ok` and rolling back on
/// `Err`.
pub fn with_transaction<T, E, F>(db: &dyn Database, body: F) -> Result<T, E>
where
    F: FnOnce(&dyn Transaction) -> Result<T, E>,
    E: From<DbError>,
{
    let tx = db.begin()?;
    match body(tx.as_ref()) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                log::warn!("Rollback failed after transaction error: {rollback_err}");
            }
            Err(err)
        }
    }
}
