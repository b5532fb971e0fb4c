//! SQL dialect selector and the per-dialect pieces of DDL syntax.

use crate::sql_utils::{escape_mysql_string, escape_sql_string, quote_backtick, quote_ident};
use serde::{Deserialize, Serialize};

/// Table options applied to MySQL tables that do not set their own.
pub const MYSQL_DEFAULT_TABLE_OPTIONS: &str =
    "CHARACTER SET utf8 COLLATE utf8_unicode_ci ENGINE=InnoDB AUTO_INCREMENT=1";

/// SQL dialect used when rendering statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// DuckDB (default)
    #[default]
    DuckDb,
    /// MySQL / MariaDB
    MySql,
    /// PostgreSQL
    Postgres,
}

impl Dialect {
    /// Quote a single identifier.
    pub fn quote(self, ident: &str) -> String {
        (self.quote_fn())(ident)
    }

    /// The identifier quoting function for this dialect.
    pub fn quote_fn(self) -> fn(&str) -> String {
        match self {
            Dialect::MySql => quote_backtick,
            Dialect::DuckDb | Dialect::Postgres => quote_ident,
        }
    }

    /// Table options used when a table definition does not provide any.
    pub fn default_table_options(self) -> Option<&'static str> {
        match self {
            Dialect::MySql => Some(MYSQL_DEFAULT_TABLE_OPTIONS),
            Dialect::DuckDb | Dialect::Postgres => None,
        }
    }

    /// Escape text for use inside a single-quoted string literal.
    pub fn escape_string(self, value: &str) -> String {
        match self {
            Dialect::MySql => escape_mysql_string(value),
            Dialect::DuckDb | Dialect::Postgres => escape_sql_string(value),
        }
    }

    /// The `ALTER TABLE` clause that removes a foreign key constraint.
    pub fn drop_foreign_key_clause(self) -> &'static str {
        match self {
            Dialect::MySql => "DROP FOREIGN KEY",
            Dialect::DuckDb | Dialect::Postgres => "DROP CONSTRAINT",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::DuckDb => write!(f, "duckdb"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Postgres => write!(f, "postgres"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_per_dialect() {
        assert_eq!(Dialect::MySql.quote("posts"), "`posts`");
        assert_eq!(Dialect::DuckDb.quote("posts"), "\"posts\"");
        assert_eq!(Dialect::Postgres.quote("posts"), "\"posts\"");
    }

    #[test]
    fn test_only_mysql_has_default_options() {
        assert_eq!(
            Dialect::MySql.default_table_options(),
            Some(MYSQL_DEFAULT_TABLE_OPTIONS)
        );
        assert_eq!(Dialect::DuckDb.default_table_options(), None);
        assert_eq!(Dialect::Postgres.default_table_options(), None);
    }

    #[test]
    fn test_deserialize_lowercase() {
        let d: Dialect = serde_yaml::from_str("mysql").unwrap();
        assert_eq!(d, Dialect::MySql);
        let d: Dialect = serde_yaml::from_str("duckdb").unwrap();
        assert_eq!(d, Dialect::DuckDb);
    }

    #[test]
    fn test_display_matches_serde_name() {
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
    }
}
