//! Migration engine for Lockstep.
//!
//! Applies ordered, versioned migration units to a database and tracks the
//! applied version inside that same database. Concurrent runners are
//! serialized by a lock row; a dirty flag brackets every unit so a crash
//! mid-migration is visible to the next run, which then refuses to proceed.
//!
//! ```no_run
//! use ls_core::{MigrateConfig, Migration, MigrationSet};
//! use ls_db::DuckDbBackend;
//! use ls_migrate::Migrator;
//!
//! let db = DuckDbBackend::new("app.duckdb")?;
//! let mut migrator = Migrator::new(db, MigrateConfig::default())?;
//! let migrations = MigrationSet::new(vec![
//!     Migration::new(1, "create_users", "CREATE TABLE users (id INT);"),
//! ])?;
//! migrator.up(&migrations)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod lock;
pub mod migrator;
pub mod reset;
pub mod runner;
pub mod version_store;

pub use error::{MigrateError, MigrateResult};
pub use lock::LockCoordinator;
pub use migrator::Migrator;
pub use version_store::{VersionState, VersionStore};
