//! Row-based migration lock.
//!
//! DuckDB (like CockroachDB) has no advisory lock primitive, so a lock is a
//! row in a dedicated table keyed by an id derived from the database name.
//! The row is the source of truth; the in-memory flag only reports what this
//! coordinator last did.

use crate::error::{MigrateError, MigrateResult};
use ls_core::TableName;
use ls_db::{with_transaction, Database, SqlValue};

/// Acquires and releases the lock row for one database
#[derive(Debug, Clone)]
pub struct LockCoordinator {
    table: TableName,
    lock_id: i64,
    force: bool,
    locked: bool,
}

impl LockCoordinator {
    /// Coordinator for `lock_id` stored in `table`.
    ///
    /// With `force` set, an existing row does not prevent acquisition.
    pub fn new(table: TableName, lock_id: i64, force: bool) -> Self {
        Self {
            table,
            lock_id,
            force,
            locked: false,
        }
    }

    /// Id of the lock row
    pub fn lock_id(&self) -> i64 {
        self.lock_id
    }

    /// Name of the lock table
    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Whether this coordinator believes it holds the lock. Diagnostic only.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Create the lock table if it does not exist.
    pub fn ensure_table(&self, db: &dyn Database) -> MigrateResult<()> {
        let exists = db.relation_exists(&self.table).map_err(|e| {
            MigrateError::storage(
                "failed to check for lock table",
                format!("relation_exists({})", self.table),
                e,
            )
        })?;
        if exists {
            return Ok(());
        }

        let sql = format!(
            "CREATE TABLE {} (lock_id BIGINT NOT NULL PRIMARY KEY)",
            self.table.quoted()
        );
        db.execute_batch(&sql)
            .map_err(|e| MigrateError::storage("failed to create lock table", &sql, e))?;
        log::debug!("Created lock table \"{}\"", self.table);
        Ok(())
    }

    /// Take the lock.
    ///
    /// Fails with [`MigrateError::LockHeld`] if a row for this id exists, or
    /// if a concurrent acquirer committed its row first.
    pub fn acquire(&mut self, db: &dyn Database) -> MigrateResult<()> {
        self.ensure_table(db)?;

        let select = format!("SELECT lock_id FROM {} WHERE lock_id = ?", self.table.quoted());
        let insert = format!("INSERT INTO {} (lock_id) VALUES (?)", self.table.quoted());
        let params = [SqlValue::Int(self.lock_id)];

        let outcome = with_transaction(db, |tx| -> MigrateResult<()> {
            let existing = tx
                .query_row(&select, &params)
                .map_err(|e| MigrateError::storage("failed to fetch migration lock", &select, e))?;

            if existing.is_some() {
                if !self.force {
                    return Err(self.held());
                }
                log::warn!(
                    "Forcing migration lock {}: taking over an existing row in \"{}\"",
                    self.lock_id,
                    self.table
                );
                return Ok(());
            }

            tx.execute(&insert, &params)
                .map_err(|e| MigrateError::storage("failed to set migration lock", &insert, e))?;
            Ok(())
        });

        match outcome {
            Ok(()) => {}
            Err(err) if is_conflict(&err) && self.force => {
                log::warn!(
                    "Forcing migration lock {} after a concurrent acquirer won the row",
                    self.lock_id
                );
            }
            Err(err) if is_conflict(&err) => return Err(self.held()),
            Err(err) => return Err(err),
        }

        self.locked = true;
        log::info!(
            "Acquired migration lock {} in \"{}\"",
            self.lock_id,
            self.table
        );
        Ok(())
    }

    /// Release the lock.
    ///
    /// A missing lock table counts as released: dropping the schema removes
    /// it along with everything else.
    pub fn release(&mut self, db: &dyn Database) -> MigrateResult<()> {
        let delete = format!("DELETE FROM {} WHERE lock_id = ?", self.table.quoted());
        match db.execute(&delete, &[SqlValue::Int(self.lock_id)]) {
            Ok(_) => {}
            Err(e) if e.is_missing_relation() => {
                log::debug!(
                    "Lock table \"{}\" does not exist; lock already released",
                    self.table
                );
            }
            Err(e) => {
                return Err(MigrateError::storage(
                    "failed to release migration lock",
                    &delete,
                    e,
                ))
            }
        }

        self.locked = false;
        log::info!("Released migration lock {}", self.lock_id);
        Ok(())
    }

    fn held(&self) -> MigrateError {
        MigrateError::LockHeld {
            lock_id: self.lock_id,
            table: self.table.to_string(),
        }
    }
}

fn is_conflict(err: &MigrateError) -> bool {
    matches!(err, MigrateError::Storage { source, .. } if source.is_conflict())
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod tests;
