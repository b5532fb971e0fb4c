//! Timestamp column policy.
//!
//! Three well-known column roles are tracked: created, updated and
//! status-updated. When auto-append is on, missing created/updated columns are
//! added to the table (and indexed); during seeding any column playing one of
//! the three roles is filled with the insertion time.

use crate::definition::{Column, IndexKey, TableDefinition};
use crate::seed::SeedColumn;
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};

/// Default name of the created column.
pub const COLUMN_CREATED: &str = "created";
/// Default name of the updated column.
pub const COLUMN_UPDATED: &str = "updated";
/// Default name of the status-updated column.
pub const COLUMN_STATUS_DATE: &str = "status_date";

/// Definition used for an injected created column.
pub const CREATED_DEFINITION: &str = "DATETIME NOT NULL";
/// Definition used for an injected updated column.
pub const UPDATED_DEFINITION: &str = "DATETIME DEFAULT NULL";

/// Names of the timestamp role columns. A `None` role is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimestampColumns {
    /// Created column name
    #[serde(default = "default_created")]
    pub created: Option<String>,

    /// Updated column name
    #[serde(default = "default_updated")]
    pub updated: Option<String>,

    /// Status-updated column name (seeding only, never auto-appended)
    #[serde(default = "default_status_updated")]
    pub status_updated: Option<String>,

    /// Append missing created/updated columns on `up()`
    #[serde(default = "default_true")]
    pub auto_append: bool,
}

fn default_created() -> Option<String> {
    Some(COLUMN_CREATED.to_string())
}

fn default_updated() -> Option<String> {
    Some(COLUMN_UPDATED.to_string())
}

fn default_status_updated() -> Option<String> {
    Some(COLUMN_STATUS_DATE.to_string())
}

impl Default for TimestampColumns {
    fn default() -> Self {
        Self {
            created: default_created(),
            updated: default_updated(),
            status_updated: default_status_updated(),
            auto_append: true,
        }
    }
}

impl TimestampColumns {
    /// No roles and no auto-append.
    pub fn disabled() -> Self {
        Self {
            created: None,
            updated: None,
            status_updated: None,
            auto_append: false,
        }
    }

    /// Whether `column` plays one of the three timestamp roles.
    pub fn is_timestamp_column(&self, column: &str) -> bool {
        [&self.created, &self.updated, &self.status_updated]
            .into_iter()
            .flatten()
            .any(|name| name == column)
    }

    /// Produce the resolved schema for `table`.
    ///
    /// Never mutates the input. With auto-append on, each enabled
    /// created/updated role whose column is missing is appended as a column,
    /// gets a plain index, and is appended to a non-empty seed column list.
    pub fn apply(&self, table: &TableDefinition, seed_columns: &[SeedColumn]) -> ResolvedSchema {
        let mut resolved = ResolvedSchema {
            table: table.clone(),
            seed_columns: seed_columns.to_vec(),
            appended: Vec::new(),
        };
        if !self.auto_append {
            return resolved;
        }

        let roles = [
            (&self.created, CREATED_DEFINITION),
            (&self.updated, UPDATED_DEFINITION),
        ];
        for (role, definition) in roles {
            let Some(name) = role.as_deref().filter(|n| !n.is_empty()) else {
                continue;
            };
            if resolved.table.has_column(name) {
                continue;
            }
            resolved.table.columns.push(Column::new(name, definition));
            resolved.table.indexes.push(IndexKey::column(name));
            if !resolved.seed_columns.is_empty() {
                resolved.seed_columns.push(SeedColumn::named(name));
            }
            resolved.appended.push(name.to_string());
        }
        resolved
    }
}

/// Table and seed columns after timestamp injection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    /// Table definition including injected columns and indexes
    pub table: TableDefinition,
    /// Seed columns including injected timestamp columns
    pub seed_columns: Vec<SeedColumn>,
    /// Names of the injected columns, in injection order
    pub appended: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts() -> TableDefinition {
        TableDefinition::new("posts").column("id", "INT PK")
    }

    #[test]
    fn test_appends_created_and_updated() {
        let resolved = TimestampColumns::default().apply(&posts(), &[]);

        let names: Vec<&str> = resolved
            .table
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "created", "updated"]);
        assert_eq!(resolved.table.columns[1].definition, "DATETIME NOT NULL");
        assert_eq!(resolved.table.columns[2].definition, "DATETIME DEFAULT NULL");
        assert_eq!(
            resolved.table.indexes,
            vec![IndexKey::column("created"), IndexKey::column("updated")]
        );
        assert_eq!(resolved.appended, vec!["created", "updated"]);
    }

    #[test]
    fn test_input_definition_is_untouched() {
        let table = posts();
        let _ = TimestampColumns::default().apply(&table, &[]);
        assert_eq!(table.columns.len(), 1);
        assert!(table.indexes.is_empty());
    }

    #[test]
    fn test_existing_column_not_duplicated() {
        let table = posts().column("created", "TIMESTAMP");
        let resolved = TimestampColumns::default().apply(&table, &[]);
        let created: Vec<_> = resolved
            .table
            .columns
            .iter()
            .filter(|c| c.name == "created")
            .collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].definition, "TIMESTAMP");
        assert_eq!(resolved.appended, vec!["updated"]);
    }

    #[test]
    fn test_auto_append_off() {
        let policy = TimestampColumns {
            auto_append: false,
            ..Default::default()
        };
        let resolved = policy.apply(&posts(), &[]);
        assert_eq!(resolved.table, posts());
        assert!(resolved.appended.is_empty());
    }

    #[test]
    fn test_disabled_role_is_skipped() {
        let policy = TimestampColumns {
            updated: None,
            ..Default::default()
        };
        let resolved = policy.apply(&posts(), &[]);
        assert_eq!(resolved.appended, vec!["created"]);
    }

    #[test]
    fn test_seed_columns_extended_only_when_present() {
        let policy = TimestampColumns::default();

        let resolved = policy.apply(&posts(), &[]);
        assert!(resolved.seed_columns.is_empty());

        let resolved = policy.apply(&posts(), &[SeedColumn::named("id")]);
        assert_eq!(
            resolved.seed_columns,
            vec![
                SeedColumn::named("id"),
                SeedColumn::named("created"),
                SeedColumn::named("updated"),
            ]
        );
    }

    #[test]
    fn test_is_timestamp_column() {
        let policy = TimestampColumns::default();
        assert!(policy.is_timestamp_column("created"));
        assert!(policy.is_timestamp_column("status_date"));
        assert!(!policy.is_timestamp_column("name"));
        assert!(!TimestampColumns::disabled().is_timestamp_column("created"));
    }

    #[test]
    fn test_parse_with_disabled_role() {
        let policy: TimestampColumns = serde_yaml::from_str("updated: ~\ncreated: created_at").unwrap();
        assert_eq!(policy.created.as_deref(), Some("created_at"));
        assert_eq!(policy.updated, None);
        assert_eq!(policy.status_updated.as_deref(), Some("status_date"));
        assert!(policy.auto_append);
    }
}
