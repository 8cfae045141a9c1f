//! ls-core - Core library for Lockstep
//!
//! Shared types used by the engine adapter and the migration engine:
//! configuration, tracking table names, lock id hashing, and migration units.

pub mod config;
pub mod error;
pub mod lock_id;
pub mod migration;
pub mod sql_utils;
pub mod table_name;

pub use config::MigrateConfig;
pub use error::{CoreError, CoreResult};
pub use lock_id::{LockIdAlgorithm, LockIdGenerator};
pub use migration::{Migration, MigrationSet};
pub use table_name::TableName;
