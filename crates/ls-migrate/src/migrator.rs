//! The migration driver.
//!
//! [`Migrator`] binds a live engine adapter to the version store and lock
//! coordinator, and runs the lock, check, apply, release sequence.

use crate::error::{MigrateError, MigrateResult};
use crate::lock::LockCoordinator;
use crate::reset;
use crate::runner;
use crate::version_store::{VersionState, VersionStore};
use ls_core::{LockIdGenerator, Migration, MigrateConfig, MigrationSet};
use ls_db::Database;

/// Applies migrations to one database
pub struct Migrator<D: Database> {
    db: D,
    config: MigrateConfig,
    database_name: String,
    versions: VersionStore,
    lock: LockCoordinator,
}

impl<D: Database> Migrator<D> {
    /// Initialize against `db` using the lock id algorithm from `config`.
    pub fn new(db: D, config: MigrateConfig) -> MigrateResult<Self> {
        let generator = config.lock_id.generator();
        Self::with_lock_id_generator(db, config, &generator)
    }

    /// Initialize with a caller-supplied lock id function.
    ///
    /// Checks connectivity, resolves the database name from the connection,
    /// and creates both tracking tables if needed.
    pub fn with_lock_id_generator(
        db: D,
        config: MigrateConfig,
        generator: &dyn LockIdGenerator,
    ) -> MigrateResult<Self> {
        config.validate()?;
        db.ping().map_err(MigrateError::Connectivity)?;

        let database_name = db.current_database().map_err(|e| {
            MigrateError::storage("failed to resolve database name", "current_database()", e)
        })?;
        if database_name.is_empty() {
            return Err(MigrateError::Config("no database name".to_string()));
        }

        let lock_id = generator.generate(&database_name);
        let versions = VersionStore::new(config.migrations_table.clone());
        let lock = LockCoordinator::new(config.lock_table.clone(), lock_id, config.force_lock);

        versions.ensure_table(&db)?;
        lock.ensure_table(&db)?;

        let migrator = Self {
            db,
            config,
            database_name,
            versions,
            lock,
        };

        let state = migrator.version()?;
        if state.dirty {
            log::warn!(
                "Database \"{}\" is dirty at version {}; migrations will not run until the version is forced",
                migrator.database_name,
                state
            );
        }
        log::debug!(
            "Migrator ready on {} database \"{}\" (lock id {})",
            migrator.db.db_type(),
            migrator.database_name,
            lock_id
        );
        Ok(migrator)
    }

    /// The engine adapter
    pub fn database(&self) -> &D {
        &self.db
    }

    /// Consume the migrator and return the engine adapter
    pub fn into_database(self) -> D {
        self.db
    }

    /// Configuration in effect
    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    /// Database name resolved from the connection
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Id of the lock row for this database
    pub fn lock_id(&self) -> i64 {
        self.lock.lock_id()
    }

    /// Take the migration lock
    pub fn lock(&mut self) -> MigrateResult<()> {
        self.lock.acquire(&self.db)
    }

    /// Release the migration lock
    pub fn unlock(&mut self) -> MigrateResult<()> {
        self.lock.release(&self.db)
    }

    /// Whether this migrator last acquired the lock without releasing it
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Current version and dirty flag
    pub fn version(&self) -> MigrateResult<VersionState> {
        self.versions.read(&self.db)
    }

    /// Replace the stored version. Does not take the lock.
    pub fn set_version(&self, version: Option<u64>, dirty: bool) -> MigrateResult<()> {
        self.versions.write(&self.db, version, dirty)
    }

    /// Execute one unit without touching version state. Does not take the lock.
    pub fn run(&self, migration: &Migration) -> MigrateResult<()> {
        runner::apply(&self.db, migration)
    }

    /// Drop every table and view, then recreate the empty version table.
    ///
    /// Does not take the lock; the lock table is dropped with everything else.
    pub fn drop_schema(&self) -> MigrateResult<Vec<String>> {
        reset::drop_all(&self.db, &self.versions)
    }

    /// Apply every pending unit in `migrations` under the lock.
    ///
    /// Returns the number of units applied.
    pub fn up(&mut self, migrations: &MigrationSet) -> MigrateResult<usize> {
        self.with_lock(|m| m.apply_pending(migrations, None))
    }

    /// Apply pending units up to and including `target` under the lock.
    pub fn up_to(&mut self, migrations: &MigrationSet, target: u64) -> MigrateResult<usize> {
        self.with_lock(|m| m.apply_pending(migrations, Some(target)))
    }

    /// Record `version` as clean under the lock, without running anything.
    ///
    /// This is the manual recovery step after fixing a dirty schema. `None`
    /// resets the store to "nothing applied".
    pub fn force(&mut self, version: Option<u64>) -> MigrateResult<()> {
        self.with_lock(|m| {
            m.set_version(version, false)?;
            log::info!(
                "Forced version of \"{}\" to {}",
                m.database_name,
                VersionState::new(version, false)
            );
            Ok(())
        })
    }

    fn apply_pending(&self, migrations: &MigrationSet, target: Option<u64>) -> MigrateResult<usize> {
        let state = self.version()?;
        if state.dirty {
            return Err(MigrateError::DirtyState {
                version: state.version.unwrap_or_default(),
            });
        }

        let mut current = state.version;
        let mut applied = 0;
        for migration in migrations.pending_until(current, target) {
            runner::apply_tracked(&self.db, &self.versions, current, migration)?;
            current = Some(migration.version());
            applied += 1;
        }

        if applied == 0 {
            log::info!("No pending migrations (version {state})");
        }
        Ok(applied)
    }

    fn with_lock<T>(&mut self, body: impl FnOnce(&Self) -> MigrateResult<T>) -> MigrateResult<T> {
        self.lock()?;
        let result = body(self);
        let released = self.unlock();

        match (result, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(unlock_err)) => Err(unlock_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(unlock_err)) => {
                log::warn!("Failed to release migration lock after error: {unlock_err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
