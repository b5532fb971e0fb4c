//! Declarative table definitions: columns, indexes and foreign keys.
//!
//! These are the immutable inputs of a migration. Anything derived from them
//! at run time (timestamp columns, implicit indexes) lives in
//! [`crate::timestamps::ResolvedSchema`] instead.

use crate::serde_helpers::ordered_map;
use crate::table_name::TableName;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single column: name plus an opaque DDL type string such as
/// `DATETIME NOT NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column definition as written into `CREATE TABLE`
    pub definition: String,
}

impl Column {
    /// Create a column from name and definition.
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }
}

/// Index declaration.
///
/// In YAML a bare column name is a non-unique index, `{column: true}` a
/// unique index on that column, and a nested list a composite index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawIndexKey")]
pub struct IndexKey {
    /// Indexed columns, in index order
    pub columns: Vec<String>,
    /// Whether the index is unique
    pub unique: bool,
}

impl IndexKey {
    /// Non-unique index on a single column.
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            columns: vec![name.into()],
            unique: false,
        }
    }

    /// Unique index on a single column.
    pub fn unique(name: impl Into<String>) -> Self {
        Self {
            columns: vec![name.into()],
            unique: true,
        }
    }

    /// Non-unique index over several columns.
    pub fn composite<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Whether this index can serve lookups on `column` (it is the leading
    /// column).
    pub fn covers(&self, column: &str) -> bool {
        self.columns.first().is_some_and(|c| c == column)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndexKey {
    Column(String),
    Composite(Vec<String>),
    Flagged(BTreeMap<String, bool>),
}

impl TryFrom<RawIndexKey> for IndexKey {
    type Error = String;

    fn try_from(raw: RawIndexKey) -> Result<Self, Self::Error> {
        match raw {
            RawIndexKey::Column(name) => Ok(IndexKey::column(name)),
            RawIndexKey::Composite(columns) => {
                if columns.is_empty() {
                    return Err("composite index must list at least one column".to_string());
                }
                Ok(IndexKey::composite(columns))
            }
            RawIndexKey::Flagged(map) => {
                if map.len() != 1 {
                    return Err(format!(
                        "flagged index entry must have exactly one column, found {}",
                        map.len()
                    ));
                }
                let (column, unique) = map.into_iter().next().ok_or("empty index entry")?;
                Ok(IndexKey {
                    columns: vec![column],
                    unique,
                })
            }
        }
    }
}

/// Referential action for `ON DELETE` / `ON UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReferentialAction {
    #[default]
    #[serde(rename = "CASCADE", alias = "cascade")]
    Cascade,
    #[serde(rename = "SET NULL", alias = "set null")]
    SetNull,
    #[serde(rename = "RESTRICT", alias = "restrict")]
    Restrict,
    #[serde(rename = "NO ACTION", alias = "no action")]
    NoAction,
}

impl ReferentialAction {
    /// SQL keyword(s) for this action.
    pub fn as_sql(self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Default referenced column when a foreign key does not name one.
pub const DEFAULT_REF_COLUMN: &str = "id";

/// Single-column foreign key declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referencing column in the migrated table
    pub column: String,
    /// Referenced table
    pub ref_table: TableName,
    /// Referenced column (default `id`)
    pub ref_column: String,
    /// `ON DELETE` action (default CASCADE)
    pub on_delete: ReferentialAction,
    /// `ON UPDATE` action (default CASCADE)
    pub on_update: ReferentialAction,
}

impl ForeignKey {
    /// Foreign key to `ref_table.id` with CASCADE on delete and update.
    pub fn new(column: impl Into<String>, ref_table: impl Into<TableName>) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: DEFAULT_REF_COLUMN.to_string(),
            on_delete: ReferentialAction::default(),
            on_update: ReferentialAction::default(),
        }
    }
}

/// Foreign key target as written in YAML: a table name or a detail mapping.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawForeignKeyTarget {
    Table(String),
    Detail(ForeignKeyDetail),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ForeignKeyDetail {
    ref_table: String,
    #[serde(default = "default_ref_column")]
    ref_column: String,
    #[serde(default, alias = "delete")]
    on_delete: ReferentialAction,
    #[serde(default, alias = "update")]
    on_update: ReferentialAction,
}

fn default_ref_column() -> String {
    DEFAULT_REF_COLUMN.to_string()
}

fn column_map<'de, D>(deserializer: D) -> Result<Vec<Column>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<(String, String)> = ordered_map(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|(name, definition)| Column { name, definition })
        .collect())
}

fn foreign_key_map<'de, D>(deserializer: D) -> Result<Vec<ForeignKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<(String, RawForeignKeyTarget)> = ordered_map(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|(column, target)| match target {
            RawForeignKeyTarget::Table(table) => ForeignKey::new(column, table),
            RawForeignKeyTarget::Detail(detail) => ForeignKey {
                column,
                ref_table: TableName::from(detail.ref_table),
                ref_column: detail.ref_column,
                on_delete: detail.on_delete,
                on_update: detail.on_update,
            },
        })
        .collect())
}

/// Declarative description of one table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableDefinition {
    /// Table name (may use the `{{%name}}` prefix placeholder)
    #[serde(rename = "table")]
    pub name: TableName,

    /// Engine / charset directives appended to `CREATE TABLE`.
    ///
    /// When absent the dialect default applies.
    #[serde(default)]
    pub options: Option<String>,

    /// Columns in physical order
    #[serde(default, deserialize_with = "column_map")]
    pub columns: Vec<Column>,

    /// Secondary indexes, created in declaration order
    #[serde(default)]
    pub indexes: Vec<IndexKey>,

    /// Foreign keys, created in declaration order
    #[serde(default, deserialize_with = "foreign_key_map")]
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDefinition {
    /// Start a definition for `name` with no columns.
    pub fn new(name: impl Into<TableName>) -> Self {
        Self {
            name: name.into(),
            options: None,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Append a column.
    pub fn column(mut self, name: impl Into<String>, definition: impl Into<String>) -> Self {
        self.columns.push(Column::new(name, definition));
        self
    }

    /// Append an index.
    pub fn index(mut self, key: IndexKey) -> Self {
        self.indexes.push(key);
        self
    }

    /// Append a foreign key.
    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Set explicit table options.
    pub fn options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Whether a column with this name is declared.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Whether some declared index leads with `column`.
    pub fn is_indexed(&self, column: &str) -> bool {
        self.indexes.iter().any(|k| k.covers(column))
    }
}

#[cfg(test)]
#[path = "definition_test.rs"]
mod tests;
