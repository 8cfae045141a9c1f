//! Error types for ls-db

use thiserror::Error;

/// Engine adapter errors.
///
/// Adapters classify engine failures into these variants so callers can tell
/// "object does not exist" and "conflicting write" apart from everything else
/// without knowing engine error codes.
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Unique or serialization conflict with a concurrent writer (D004)
    #[error("[D004] Write conflict: {0}")]
    Conflict(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Transaction management error (D006)
    #[error("[D006] Transaction failed: {0}")]
    TransactionError(String),

    /// A value could not be read as the requested type (D007)
    #[error("[D007] Column {index} type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: String,
    },
}

impl DbError {
    /// Whether the failure means the referenced table or view does not exist
    pub fn is_missing_relation(&self) -> bool {
        matches!(self, DbError::TableNotFound(_))
    }

    /// Whether the failure was caused by a concurrent conflicting write
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so string
        // matching is the only reliable approach. Narrow patterns keep
        // function/type/schema errors from being misclassified.
        let msg = err.to_string();
        let names_relation = msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name");
        if (names_relation && msg.contains("does not exist"))
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else if is_conflict_message(&msg.to_lowercase()) {
            DbError::Conflict(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

fn is_conflict_message(lower: &str) -> bool {
    lower.contains("duplicate key")
        || lower.contains("write-write conflict")
        || lower.contains("conflict on")
}
