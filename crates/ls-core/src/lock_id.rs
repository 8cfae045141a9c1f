//! Deterministic lock identifiers derived from a database name.
//!
//! Every runner pointed at the same database must compute the same id, so the
//! functions here are pure. Collisions between different databases are
//! possible but only matter if they share a lock table.

use serde::{Deserialize, Serialize};

/// Salt multiplied into the checksum by [`LockIdAlgorithm::SaltedCrc32`].
pub const LOCK_ID_SALT: u32 = 1_486_364_155;

/// Computes the lock row id for a database.
pub trait LockIdGenerator: Send + Sync {
    /// Return the lock id for `database_name`.
    fn generate(&self, database_name: &str) -> i64;
}

impl<F> LockIdGenerator for F
where
    F: Fn(&str) -> i64 + Send + Sync,
{
    fn generate(&self, database_name: &str) -> i64 {
        self(database_name)
    }
}

/// Built-in lock id algorithms selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockIdAlgorithm {
    /// CRC-32 (IEEE) of the name, multiplied by [`LOCK_ID_SALT`] modulo 2^32.
    #[default]
    SaltedCrc32,
    /// Plain CRC-32 (IEEE) of the name.
    Crc32,
}

impl LockIdAlgorithm {
    /// Return the generator function for this algorithm.
    pub fn generator(self) -> fn(&str) -> i64 {
        match self {
            LockIdAlgorithm::SaltedCrc32 => salted_crc32_lock_id,
            LockIdAlgorithm::Crc32 => crc32_lock_id,
        }
    }
}

/// CRC-32 of `database_name` scaled by the salt. Always in `0..2^32`.
pub fn salted_crc32_lock_id(database_name: &str) -> i64 {
    let sum = crc32fast::hash(database_name.as_bytes());
    i64::from(sum.wrapping_mul(LOCK_ID_SALT))
}

/// Plain CRC-32 of `database_name`. Always in `0..2^32`.
pub fn crc32_lock_id(database_name: &str) -> i64 {
    i64::from(crc32fast::hash(database_name.as_bytes()))
}

#[cfg(test)]
#[path = "lock_id_test.rs"]
mod tests;
