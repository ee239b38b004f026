//! SQL identifier quoting.
//!
//! Table and column names reach the store from schema metadata, never from
//! a query parameter slot, so they are quoted before being spliced into SQL.

/// Quote a SQL identifier using ANSI double-quoting.
///
/// Embedded double-quotes are escaped by doubling them.
///
/// ```
/// use ondelete_core::quote_ident;
///
/// assert_eq!(quote_ident("heroes"), "\"heroes\"");
/// assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
/// ```
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
