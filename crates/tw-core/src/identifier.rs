//! Canonical names for indexes and foreign keys.
//!
//! When a migration does not name an index or foreign key explicitly, the name
//! is derived from the table and the column list: `idx-<table>-<cols>` or
//! `fk-<table>-<cols>`. The table part has placeholder delimiters stripped, so
//! `{{%users}}` contributes `users`.

use crate::table_name::TableName;
use std::fmt;

/// Kind of schema object a derived name is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Secondary index (`idx-` prefix)
    Index,
    /// Foreign key constraint (`fk-` prefix)
    ForeignKey,
}

impl IdentifierKind {
    /// Name prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            IdentifierKind::Index => "idx",
            IdentifierKind::ForeignKey => "fk",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Derive the canonical name for an index or foreign key.
///
/// Multiple columns are joined with `-` in the order given.
///
/// # Examples
/// ```
/// use tw_core::identifier::{derive_name, IdentifierKind};
/// use tw_core::TableName;
/// let table = TableName::new("{{%users}}");
/// assert_eq!(derive_name(IdentifierKind::ForeignKey, &table, &["a", "b"]), "fk-users-a-b");
/// ```
pub fn derive_name<S: AsRef<str>>(kind: IdentifierKind, table: &TableName, columns: &[S]) -> String {
    let joined = columns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}-{}", kind.prefix(), table.bare(), joined)
}

/// Return `explicit` when given, otherwise the derived name.
pub fn resolve_name<S: AsRef<str>>(
    explicit: Option<&str>,
    kind: IdentifierKind,
    table: &TableName,
    columns: &[S],
) -> String {
    match explicit {
        Some(name) => name.to_string(),
        None => derive_name(kind, table, columns),
    }
}
