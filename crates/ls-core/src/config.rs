//! Migration engine configuration.
//!
//! The database name is deliberately absent: it is resolved from the live
//! connection when a migrator is created.

use crate::error::{CoreError, CoreResult};
use crate::lock_id::LockIdAlgorithm;
use crate::table_name::TableName;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default name of the version tracking table
pub const DEFAULT_MIGRATIONS_TABLE: &str = "schema_migrations";

/// Default name of the lock tracking table
pub const DEFAULT_LOCK_TABLE: &str = "schema_lock";

/// Settings for the version store and lock coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateConfig {
    /// Table holding the single `(version, dirty)` row
    #[serde(default = "default_migrations_table")]
    pub migrations_table: TableName,

    /// Table holding lock rows
    #[serde(default = "default_lock_table")]
    pub lock_table: TableName,

    /// Acquire the lock even when another holder's row is present.
    ///
    /// Only for manual recovery after a crashed holder; two runners with this
    /// set can both proceed.
    #[serde(default)]
    pub force_lock: bool,

    /// How the lock id is derived from the database name
    #[serde(default)]
    pub lock_id: LockIdAlgorithm,
}

fn default_migrations_table() -> TableName {
    TableName::new(DEFAULT_MIGRATIONS_TABLE)
}

fn default_lock_table() -> TableName {
    TableName::new(DEFAULT_LOCK_TABLE)
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            migrations_table: default_migrations_table(),
            lock_table: default_lock_table(),
            force_lock: false,
            lock_id: LockIdAlgorithm::default(),
        }
    }
}

impl MigrateConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text. An empty document yields defaults.
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        let config: MigrateConfig = if content.trim().is_empty() {
            MigrateConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the version table name
    pub fn with_migrations_table(mut self, table: TableName) -> Self {
        self.migrations_table = table;
        self
    }

    /// Set the lock table name
    pub fn with_lock_table(mut self, table: TableName) -> Self {
        self.lock_table = table;
        self
    }

    /// Enable or disable force-override of existing locks
    pub fn with_force_lock(mut self, force_lock: bool) -> Self {
        self.force_lock = force_lock;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        for (key, table) in [
            ("migrations_table", &self.migrations_table),
            ("lock_table", &self.lock_table),
        ] {
            if !TableName::is_valid(table) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("{key} must be non-empty and NUL-free"),
                });
            }
        }
        if self.migrations_table == self.lock_table {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migrations_table and lock_table must differ (both are '{}')",
                    self.lock_table
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
