//! Migration units and ordered migration sets.
//!
//! Units are produced by an external loader and are immutable afterwards.

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::io::Read;

/// One versioned batch of schema-changing statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    version: u64,
    name: String,
    body: String,
}

impl Migration {
    /// Create a migration unit
    pub fn new(version: u64, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            body: body.into(),
        }
    }

    /// Build a unit by reading its statements from `reader`
    pub fn from_reader(
        version: u64,
        name: impl Into<String>,
        mut reader: impl Read,
    ) -> CoreResult<Self> {
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        Ok(Self::new(version, name, body))
    }

    /// Ordinal version of this unit
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Human-readable name, used in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw statement payload
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the payload contains anything besides whitespace
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Migration units ordered by version, with unique versions
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: BTreeMap<u64, Migration>,
}

impl MigrationSet {
    /// Build a set, rejecting duplicate versions
    pub fn new(migrations: impl IntoIterator<Item = Migration>) -> CoreResult<Self> {
        let mut set = Self::default();
        for migration in migrations {
            set.insert(migration)?;
        }
        Ok(set)
    }

    /// Add a unit, rejecting a version that is already present
    pub fn insert(&mut self, migration: Migration) -> CoreResult<()> {
        if let Some(existing) = self.migrations.get(&migration.version) {
            return Err(CoreError::DuplicateVersion {
                version: migration.version,
                first: existing.name.clone(),
                second: migration.name,
            });
        }
        self.migrations.insert(migration.version, migration);
        Ok(())
    }

    /// Look up a unit by version
    pub fn get(&self, version: u64) -> Option<&Migration> {
        self.migrations.get(&version)
    }

    /// Lowest version in the set
    pub fn first(&self) -> Option<&Migration> {
        self.migrations.values().next()
    }

    /// Highest version in the set
    pub fn last(&self) -> Option<&Migration> {
        self.migrations.values().next_back()
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the set has no units
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// All units in ascending version order
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.values()
    }

    /// Units with a version above `current`, in ascending order.
    ///
    /// `None` means nothing has been applied, so every unit is pending.
    pub fn pending(&self, current: Option<u64>) -> impl Iterator<Item = &Migration> {
        self.pending_until(current, None)
    }

    /// Like [`pending`](Self::pending), but stops after `target` when given
    pub fn pending_until(
        &self,
        current: Option<u64>,
        target: Option<u64>,
    ) -> impl Iterator<Item = &Migration> {
        self.migrations
            .values()
            .filter(move |m| current.map_or(true, |c| m.version > c))
            .take_while(move |m| target.map_or(true, |t| m.version <= t))
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
