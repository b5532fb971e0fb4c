//! DDL statement building
//!
//! Every builder returns a [`Statement`]: the rendered SQL plus a structured
//! [`StatementKind`] describing what it does. Idempotence guards
//! (`IF NOT EXISTS` / `IF EXISTS`) are emitted as part of the statement
//! structure, never patched into finished SQL.

use crate::definition::{Column, ReferentialAction};
use crate::dialect::Dialect;
use crate::identifier::{resolve_name, IdentifierKind};
use crate::seed::SeedValue;
use crate::sql_utils::quote_qualified_with;
use crate::table_name::TableName;
use serde::Serialize;
use std::fmt;

/// What a statement does, independent of its SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StatementKind {
    CreateTable {
        table: String,
        columns: Vec<String>,
        if_not_exists: bool,
    },
    DropTable {
        table: String,
        if_exists: bool,
    },
    CreateIndex {
        name: String,
        table: String,
        columns: Vec<String>,
        unique: bool,
    },
    AddForeignKey {
        name: String,
        table: String,
        ref_table: String,
    },
    DropForeignKey {
        name: String,
        table: String,
    },
    Insert {
        table: String,
        rows: usize,
    },
}

impl StatementKind {
    /// Physical table the statement targets.
    pub fn table(&self) -> &str {
        match self {
            StatementKind::CreateTable { table, .. }
            | StatementKind::DropTable { table, .. }
            | StatementKind::CreateIndex { table, .. }
            | StatementKind::AddForeignKey { table, .. }
            | StatementKind::DropForeignKey { table, .. }
            | StatementKind::Insert { table, .. } => table,
        }
    }
}

/// A rendered SQL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Structured description
    pub kind: StatementKind,
    /// SQL text, without trailing semicolon
    pub sql: String,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Builds dialect-specific DDL for one database.
#[derive(Debug, Clone, Default)]
pub struct DdlBuilder {
    dialect: Dialect,
    table_prefix: String,
}

impl DdlBuilder {
    /// Builder for `dialect` with no table prefix.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table_prefix: String::new(),
        }
    }

    /// Set the prefix substituted for `%` in `{{%name}}` table names.
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Target dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Physical name of `table` with the prefix applied.
    pub fn physical_table(&self, table: &TableName) -> String {
        table.physical(&self.table_prefix)
    }

    /// Explicit options, or the dialect default when none are given.
    pub fn table_options(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.dialect.default_table_options().map(str::to_string))
    }

    fn quote(&self, ident: &str) -> String {
        self.dialect.quote(ident)
    }

    fn quote_table(&self, physical: &str) -> String {
        quote_qualified_with(physical, self.dialect.quote_fn())
    }

    fn quote_list<S: AsRef<str>>(&self, columns: &[S]) -> String {
        columns
            .iter()
            .map(|c| self.quote(c.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `CREATE TABLE [IF NOT EXISTS] t (...) [options]`
    pub fn create_table(
        &self,
        table: &TableName,
        columns: &[Column],
        options: Option<&str>,
        if_not_exists: bool,
    ) -> Statement {
        let physical = self.physical_table(table);
        let body = columns
            .iter()
            .map(|c| format!("\t{} {}", self.quote(&c.name), c.definition))
            .collect::<Vec<_>>()
            .join(",\n");
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        let mut sql = format!(
            "CREATE TABLE {guard}{} (\n{body}\n)",
            self.quote_table(&physical)
        );
        if let Some(options) = options.filter(|o| !o.trim().is_empty()) {
            sql.push(' ');
            sql.push_str(options.trim());
        }
        Statement {
            kind: StatementKind::CreateTable {
                table: physical,
                columns: columns.iter().map(|c| c.name.clone()).collect(),
                if_not_exists,
            },
            sql,
        }
    }

    /// `DROP TABLE [IF EXISTS] t`
    pub fn drop_table(&self, table: &TableName, if_exists: bool) -> Statement {
        let physical = self.physical_table(table);
        let guard = if if_exists { "IF EXISTS " } else { "" };
        Statement {
            sql: format!("DROP TABLE {guard}{}", self.quote_table(&physical)),
            kind: StatementKind::DropTable {
                table: physical,
                if_exists,
            },
        }
    }

    /// `CREATE [UNIQUE] INDEX name ON t (cols)`; `name` is derived when `None`.
    pub fn create_index<S: AsRef<str>>(
        &self,
        name: Option<&str>,
        table: &TableName,
        columns: &[S],
        unique: bool,
    ) -> Statement {
        let name = resolve_name(name, IdentifierKind::Index, table, columns);
        let physical = self.physical_table(table);
        let unique_kw = if unique { "UNIQUE " } else { "" };
        Statement {
            sql: format!(
                "CREATE {unique_kw}INDEX {} ON {} ({})",
                self.quote(&name),
                self.quote_table(&physical),
                self.quote_list(columns)
            ),
            kind: StatementKind::CreateIndex {
                name,
                table: physical,
                columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
                unique,
            },
        }
    }

    /// `ALTER TABLE t ADD CONSTRAINT name FOREIGN KEY (cols) REFERENCES r (ref_cols) ...`
    #[allow(clippy::too_many_arguments)]
    pub fn add_foreign_key<S: AsRef<str>, R: AsRef<str>>(
        &self,
        name: Option<&str>,
        table: &TableName,
        columns: &[S],
        ref_table: &TableName,
        ref_columns: &[R],
        on_delete: ReferentialAction,
        on_update: ReferentialAction,
    ) -> Statement {
        let name = resolve_name(name, IdentifierKind::ForeignKey, table, columns);
        let physical = self.physical_table(table);
        let ref_physical = self.physical_table(ref_table);
        Statement {
            sql: format!(
                "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
                self.quote_table(&physical),
                self.quote(&name),
                self.quote_list(columns),
                self.quote_table(&ref_physical),
                self.quote_list(ref_columns),
                on_delete.as_sql(),
                on_update.as_sql()
            ),
            kind: StatementKind::AddForeignKey {
                name,
                table: physical,
                ref_table: ref_physical,
            },
        }
    }

    /// `ALTER TABLE t DROP FOREIGN KEY name` (MySQL) or `DROP CONSTRAINT name`.
    pub fn drop_foreign_key<S: AsRef<str>>(
        &self,
        name: Option<&str>,
        table: &TableName,
        columns: &[S],
    ) -> Statement {
        let name = resolve_name(name, IdentifierKind::ForeignKey, table, columns);
        let physical = self.physical_table(table);
        Statement {
            sql: format!(
                "ALTER TABLE {} {} {}",
                self.quote_table(&physical),
                self.dialect.drop_foreign_key_clause(),
                self.quote(&name)
            ),
            kind: StatementKind::DropForeignKey {
                name,
                table: physical,
            },
        }
    }

    /// Multi-row `INSERT INTO t (cols) VALUES (...), (...)`.
    pub fn batch_insert(
        &self,
        table: &TableName,
        columns: &[String],
        rows: &[Vec<SeedValue>],
    ) -> Statement {
        let physical = self.physical_table(table);
        let values = rows
            .iter()
            .map(|row| {
                let literals = row
                    .iter()
                    .map(|value| value.to_sql_literal(self.dialect))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({literals})")
            })
            .collect::<Vec<_>>()
            .join(", ");
        Statement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES {values}",
                self.quote_table(&physical),
                self.quote_list(columns)
            ),
            kind: StatementKind::Insert {
                table: physical,
                rows: rows.len(),
            },
        }
    }
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod tests;
