//! SQL identifier quoting utilities
//!
//! Tracking table names come from configuration and are interpolated into
//! DDL and DML, so every use goes through [`quote_ident`].

/// Quote a SQL identifier to prevent injection.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use ls_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("schema_lock"), r#""schema_lock""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
