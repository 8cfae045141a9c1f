//! Version store: the single `(version, dirty)` row.
//!
//! A missing table and an empty table both mean "nothing applied". Every
//! transition replaces the row (delete, then insert) inside one transaction,
//! so the table never holds more than one row.

use crate::error::{MigrateError, MigrateResult};
use ls_core::TableName;
use ls_db::{with_transaction, Database, SqlValue};
use std::fmt;

/// Current schema version and dirty flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionState {
    /// Last version recorded, `None` when nothing has been applied
    pub version: Option<u64>,
    /// A migration started at this version but did not confirm completion
    pub dirty: bool,
}

impl VersionState {
    /// Nothing applied, not dirty
    pub const NONE: VersionState = VersionState {
        version: None,
        dirty: false,
    };

    /// Create a state value
    pub fn new(version: Option<u64>, dirty: bool) -> Self {
        Self { version, dirty }
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) if self.dirty => write!(f, "{v} (dirty)"),
            Some(v) => write!(f, "{v}"),
            None => f.write_str("none"),
        }
    }
}

/// Reads and writes the version tracking table
#[derive(Debug, Clone)]
pub struct VersionStore {
    table: TableName,
}

impl VersionStore {
    /// Store backed by `table`
    pub fn new(table: TableName) -> Self {
        Self { table }
    }

    /// Name of the tracking table
    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Create the tracking table if it does not exist.
    pub fn ensure_table(&self, db: &dyn Database) -> MigrateResult<()> {
        let exists = db.relation_exists(&self.table).map_err(|e| {
            MigrateError::storage(
                "failed to check for version table",
                format!("relation_exists({})", self.table),
                e,
            )
        })?;
        if exists {
            return Ok(());
        }

        let sql = format!(
            "CREATE TABLE {} (version BIGINT NOT NULL PRIMARY KEY, dirty BOOLEAN NOT NULL)",
            self.table.quoted()
        );
        db.execute_batch(&sql)
            .map_err(|e| MigrateError::storage("failed to create version table", &sql, e))?;
        log::debug!("Created version table \"{}\"", self.table);
        Ok(())
    }

    /// Read the current state. Never creates the table.
    pub fn read(&self, db: &dyn Database) -> MigrateResult<VersionState> {
        let sql = format!("SELECT version, dirty FROM {} LIMIT 1", self.table.quoted());
        let row = match db.query_row(&sql, &[]) {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(VersionState::NONE),
            Err(e) if e.is_missing_relation() => return Ok(VersionState::NONE),
            Err(e) => return Err(MigrateError::storage("failed to read version", &sql, e)),
        };

        let raw = row
            .get_i64(0)
            .map_err(|e| MigrateError::storage("failed to read version column", &sql, e))?;
        let dirty = row
            .get_bool(1)
            .map_err(|e| MigrateError::storage("failed to read dirty column", &sql, e))?;
        let version = u64::try_from(raw).map_err(|_| {
            MigrateError::InvalidVersion(format!(
                "table \"{}\" holds negative version {raw}",
                self.table
            ))
        })?;
        Ok(VersionState::new(Some(version), dirty))
    }

    /// Replace the stored state. `None` clears the table.
    pub fn write(&self, db: &dyn Database, version: Option<u64>, dirty: bool) -> MigrateResult<()> {
        let stored = version.map(to_stored).transpose()?;
        self.ensure_table(db)?;

        let delete = format!("DELETE FROM {}", self.table.quoted());
        let insert = format!(
            "INSERT INTO {} (version, dirty) VALUES (?, ?)",
            self.table.quoted()
        );
        with_transaction(db, |tx| -> MigrateResult<()> {
            tx.execute(&delete, &[])
                .map_err(|e| MigrateError::storage("failed to clear version", &delete, e))?;
            if let Some(v) = stored {
                tx.execute(&insert, &[SqlValue::Int(v), SqlValue::Bool(dirty)])
                    .map_err(|e| MigrateError::storage("failed to record version", &insert, e))?;
            }
            Ok(())
        })?;

        log::debug!(
            "Version set to {}",
            VersionState::new(version, dirty && version.is_some())
        );
        Ok(())
    }
}

fn to_stored(version: u64) -> MigrateResult<i64> {
    i64::try_from(version).map_err(|_| {
        MigrateError::InvalidVersion(format!("{version} does not fit a signed 64-bit integer"))
    })
}

#[cfg(test)]
#[path = "version_store_test.rs"]
mod tests;
