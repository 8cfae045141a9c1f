//! Migration runner.
//!
//! [`apply`] executes a unit and nothing else. [`apply_tracked`] wraps it in
//! the dirty-flag protocol: mark dirty, run, record the new version clean.
//! Neither checks that the caller holds the lock.

use crate::error::{MigrateError, MigrateResult};
use crate::version_store::VersionStore;
use ls_core::Migration;
use ls_db::Database;

/// Execute the unit's payload as a single batch.
///
/// Statements already executed before a failure are not rolled back; engines
/// that auto-commit DDL leave them in place.
pub fn apply(db: &dyn Database, migration: &Migration) -> MigrateResult<()> {
    if migration.is_empty() {
        log::debug!(
            "Skipping migration {} ({}): empty body",
            migration.version(),
            migration.name()
        );
        return Ok(());
    }

    db.execute_batch(migration.body())
        .map_err(|e| MigrateError::MigrationExecution {
            version: migration.version(),
            name: migration.name().to_string(),
            statement: migration.body().to_string(),
            source: e,
        })
}

/// Apply `migration` on top of `previous` with dirty-flag bracketing.
///
/// The dirty mark keeps `previous` so a failure leaves `(previous, dirty)`.
/// When nothing was applied yet the mark goes on the unit's own version,
/// because an empty store cannot carry a dirty flag.
pub fn apply_tracked(
    db: &dyn Database,
    store: &VersionStore,
    previous: Option<u64>,
    migration: &Migration,
) -> MigrateResult<()> {
    let marker = previous.or(Some(migration.version()));
    store.write(db, marker, true)?;

    apply(db, migration)?;

    store.write(db, Some(migration.version()), false)?;
    log::info!(
        "Applied migration {} ({})",
        migration.version(),
        migration.name()
    );
    Ok(())
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
