//! Error types for the migration engine.

use ls_core::CoreError;
use ls_db::DbError;
use thiserror::Error;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Missing or invalid configuration (L001).
    #[error("[L001] Migration config error: {0}")]
    Config(String),

    /// Engine unreachable during initialization (L002).
    #[error("[L002] Database unreachable")]
    Connectivity(#[source] DbError),

    /// Another holder's lock row is present (L003).
    #[error(
        "[L003] Migration lock {lock_id} could not be acquired; already locked. \
         If no migration is running, inspect table \"{table}\" and delete the stale row \
         (or set force_lock) before retrying"
    )]
    LockHeld { lock_id: i64, table: String },

    /// A statement against a tracking table failed (L004).
    #[error("[L004] {context} (statement: {statement})")]
    Storage {
        context: String,
        statement: String,
        #[source]
        source: DbError,
    },

    /// A migration unit's statements failed; the dirty flag stays set (L005).
    #[error("[L005] Migration {version} ({name}) failed (statement: {statement})")]
    MigrationExecution {
        version: u64,
        name: String,
        statement: String,
        #[source]
        source: DbError,
    },

    /// The store was dirty before anything ran (L006).
    #[error(
        "[L006] Database is dirty at version {version}: a previous migration did not finish. \
         Fix the schema manually, then force the version before migrating again"
    )]
    DirtyState { version: u64 },

    /// A version that cannot be stored or was stored corrupted (L007).
    #[error("[L007] Invalid migration version: {0}")]
    InvalidVersion(String),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    /// Wrap an engine error raised by `statement` as a storage failure.
    pub(crate) fn storage(
        context: impl Into<String>,
        statement: impl Into<String>,
        source: DbError,
    ) -> Self {
        MigrateError::Storage {
            context: context.into(),
            statement: statement.into(),
            source,
        }
    }
}

impl From<CoreError> for MigrateError {
    fn from(err: CoreError) -> Self {
        MigrateError::Config(err.to_string())
    }
}

/// Errors raised while opening or committing a transaction carry no statement
/// of their own.
impl From<DbError> for MigrateError {
    fn from(err: DbError) -> Self {
        MigrateError::storage("transaction failed", "BEGIN/COMMIT", err)
    }
}
