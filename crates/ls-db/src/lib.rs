//! ls-db - Engine adapter layer for Lockstep
//!
//! This crate provides the `Database` trait the migration engine depends on,
//! an engine-neutral value model, and a DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use self::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{
    with_transaction, Database, Executor, ObjectKind, SchemaObject, Transaction,
};
pub use value::{Row, SqlValue};
