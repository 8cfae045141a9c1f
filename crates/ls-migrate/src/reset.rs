//! Schema reset: drop every object in the current schema.
//!
//! Objects are dropped one statement at a time, in the order the adapter
//! lists them (dependents first). A failure stops the loop and leaves earlier
//! drops in place; calling again finishes the job.

use crate::error::{MigrateError, MigrateResult};
use crate::version_store::VersionStore;
use ls_core::sql_utils::quote_ident;
use ls_db::{Database, SchemaObject};

/// Drop all schema objects, then recreate the empty version table.
///
/// Returns the names of the objects dropped, in drop order. The lock table is
/// dropped like anything else.
pub fn drop_all(db: &dyn Database, store: &VersionStore) -> MigrateResult<Vec<String>> {
    let objects = db.list_objects().map_err(|e| {
        MigrateError::storage("failed to list schema objects", "list_objects()", e)
    })?;

    let mut dropped = Vec::with_capacity(objects.len());
    for object in objects {
        let sql = drop_statement(&object);
        db.execute_batch(&sql).map_err(|e| {
            MigrateError::storage(format!("failed to drop \"{}\"", object.name), &sql, e)
        })?;
        log::debug!("Dropped {} \"{}\"", object.kind.keyword(), object.name);
        dropped.push(object.name);
    }

    if !dropped.is_empty() {
        store.ensure_table(db)?;
        log::info!("Dropped {} schema objects", dropped.len());
    }
    Ok(dropped)
}

fn drop_statement(object: &SchemaObject) -> String {
    let mut sql = format!(
        "DROP {} IF EXISTS {}",
        object.kind.keyword(),
        quote_ident(&object.name)
    );
    if object.kind.supports_cascade() {
        sql.push_str(" CASCADE");
    }
    sql
}

#[cfg(test)]
#[path = "reset_test.rs"]
mod tests;
