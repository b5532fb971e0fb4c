//! SQL identifier quoting utilities
//!
//! Provides safe quoting for SQL identifiers and string literals so that
//! generated DDL never splices raw names into statements.

/// Quote a SQL identifier using ANSI double quotes.
///
/// Embedded double quotes are escaped by doubling them, following the SQL
/// standard.
///
/// # Examples
/// ```
/// use tw_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a SQL identifier using MySQL backticks.
///
/// # Examples
/// ```
/// use tw_core::sql_utils::quote_backtick;
/// assert_eq!(quote_backtick("order"), "`order`");
/// assert_eq!(quote_backtick("we`ird"), "`we``ird`");
/// ```
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote a potentially schema-qualified name (e.g. `schema.table`) with the
/// given per-component quoting function.
///
/// # Examples
/// ```
/// use tw_core::sql_utils::{quote_ident, quote_qualified_with};
/// assert_eq!(quote_qualified_with("staging.orders", quote_ident), r#""staging"."orders""#);
/// ```
pub fn quote_qualified_with(name: &str, quote: fn(&str) -> String) -> String {
    name.split('.').map(quote).collect::<Vec<_>>().join(".")
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Escape a MySQL string literal value.
///
/// MySQL treats backslash as an escape character inside string literals by
/// default, so it is doubled along with single quotes.
pub fn escape_mysql_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
