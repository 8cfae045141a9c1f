//! Engine-neutral parameter and result values.

use crate::error::{DbError, DbResult};
use std::fmt;

/// A statement parameter or a column value read back from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Bool(bool),
    Text(String),
}

impl SqlValue {
    fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Int(_) => "integer",
            SqlValue::Bool(_) => "boolean",
            SqlValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("null"),
            SqlValue::Int(n) => write!(f, "{n}"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

/// One result row, columns in select-list order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row(Vec<SqlValue>);

impl Row {
    /// Wrap a list of column values
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self(values)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw value at `index`
    pub fn get(&self, index: usize) -> DbResult<&SqlValue> {
        self.0.get(index).ok_or(DbError::TypeMismatch {
            index,
            expected: "a column",
            found: format!("{} columns", self.0.len()),
        })
    }

    /// Integer value at `index`
    pub fn get_i64(&self, index: usize) -> DbResult<i64> {
        match self.get(index)? {
            SqlValue::Int(n) => Ok(*n),
            other => Err(mismatch(index, "integer", other)),
        }
    }

    /// Boolean value at `index`
    pub fn get_bool(&self, index: usize) -> DbResult<bool> {
        match self.get(index)? {
            SqlValue::Bool(b) => Ok(*b),
            other => Err(mismatch(index, "boolean", other)),
        }
    }

    /// Text value at `index`; `None` for SQL NULL
    pub fn get_opt_str(&self, index: usize) -> DbResult<Option<&str>> {
        match self.get(index)? {
            SqlValue::Text(s) => Ok(Some(s.as_str())),
            SqlValue::Null => Ok(None),
            other => Err(mismatch(index, "text", other)),
        }
    }

    /// Text value at `index`
    pub fn get_str(&self, index: usize) -> DbResult<&str> {
        self.get_opt_str(index)?.ok_or(DbError::TypeMismatch {
            index,
            expected: "text",
            found: "null".to_string(),
        })
    }

    /// Consume the row and return its values
    pub fn into_values(self) -> Vec<SqlValue> {
        self.0
    }
}

fn mismatch(index: usize, expected: &'static str, found: &SqlValue) -> DbError {
    DbError::TypeMismatch {
        index,
        expected,
        found: found.type_name().to_string(),
    }
}
