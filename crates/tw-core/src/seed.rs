//! Seed data declarations and row resolution
//!
//! Seed data is a column list plus a list of rows. Each row is reconciled
//! against the column list with a fixed precedence:
//!
//! 1. a value keyed by the column name in the row,
//! 2. the column's shared default,
//! 3. the current timestamp when the column plays a timestamp role,
//! 4. the next unused positional value of the row (`NULL` once exhausted).

use crate::serde_helpers::{default_true, ordered_map};
use crate::dialect::Dialect;
use crate::timestamps::TimestampColumns;
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Format used for auto-filled timestamp values.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a UTC instant the way auto-filled timestamp columns store it.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// A scalar seed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SeedValue {
    /// Render as a SQL literal for `dialect`.
    pub fn to_sql_literal(&self, dialect: Dialect) -> String {
        match self {
            SeedValue::Null => "NULL".to_string(),
            SeedValue::Bool(true) => "TRUE".to_string(),
            SeedValue::Bool(false) => "FALSE".to_string(),
            SeedValue::Int(n) => n.to_string(),
            SeedValue::Float(f) if f.is_finite() => f.to_string(),
            SeedValue::Float(_) => "NULL".to_string(),
            SeedValue::Text(s) => format!("'{}'", dialect.escape_string(s)),
        }
    }
}

impl From<&str> for SeedValue {
    fn from(s: &str) -> Self {
        SeedValue::Text(s.to_string())
    }
}

impl From<String> for SeedValue {
    fn from(s: String) -> Self {
        SeedValue::Text(s)
    }
}

impl From<i64> for SeedValue {
    fn from(n: i64) -> Self {
        SeedValue::Int(n)
    }
}

impl From<bool> for SeedValue {
    fn from(b: bool) -> Self {
        SeedValue::Bool(b)
    }
}

impl<'de> Deserialize<'de> for SeedValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SeedValueVisitor;

        impl<'de> Visitor<'de> for SeedValueVisitor {
            type Value = SeedValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<SeedValue, E> {
                Ok(SeedValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<SeedValue, E> {
                Ok(SeedValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<SeedValue, E> {
                Ok(SeedValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<SeedValue, E> {
                Ok(SeedValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<SeedValue, E> {
                i64::try_from(v)
                    .map(SeedValue::Int)
                    .map_err(|_| E::custom(format!("integer {v} out of range")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<SeedValue, E> {
                Ok(SeedValue::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SeedValue, E> {
                Ok(SeedValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<SeedValue, E> {
                Ok(SeedValue::Text(v))
            }
        }

        deserializer.deserialize_any(SeedValueVisitor)
    }
}

/// Seed column: a name with an optional default shared by every row.
///
/// YAML: `name` or `{status: active}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSeedColumn")]
pub struct SeedColumn {
    /// Column name
    pub name: String,
    /// Value used for rows that do not set the column explicitly
    pub default: Option<SeedValue>,
}

impl SeedColumn {
    /// Column without a shared default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// Column with a shared default.
    pub fn with_default(name: impl Into<String>, default: impl Into<SeedValue>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeedColumn {
    Name(String),
    WithDefault(#[serde(deserialize_with = "ordered_map")] Vec<(String, SeedValue)>),
}

impl TryFrom<RawSeedColumn> for SeedColumn {
    type Error = String;

    fn try_from(raw: RawSeedColumn) -> Result<Self, Self::Error> {
        match raw {
            RawSeedColumn::Name(name) => Ok(SeedColumn::named(name)),
            RawSeedColumn::WithDefault(mut entries) => {
                if entries.len() != 1 {
                    return Err(format!(
                        "seed column with default must have exactly one key, found {}",
                        entries.len()
                    ));
                }
                let (name, default) = entries.remove(0);
                Ok(SeedColumn {
                    name,
                    default: Some(default),
                })
            }
        }
    }
}

/// One seed row: positional values plus keyed overrides.
///
/// YAML forms:
/// - `[a, b]`: positional
/// - `{name: x, status: y}`: keyed
/// - `[a, {status: y}]`: mixed, mappings inside a list are keyed overrides
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeedRow {
    /// Values consumed in order by columns without another source
    pub positional: Vec<SeedValue>,
    /// Values addressed by column name
    pub keyed: Vec<(String, SeedValue)>,
}

impl SeedRow {
    /// Row of positional values.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SeedValue>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyed: Vec::new(),
        }
    }

    /// Add a keyed value.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SeedValue>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.keyed.iter_mut().find(|(k, _)| *k == column) {
            Some(entry) => entry.1 = value,
            None => self.keyed.push((column, value)),
        }
        self
    }

    /// Value explicitly keyed by `column`, if any.
    pub fn get(&self, column: &str) -> Option<&SeedValue> {
        self.keyed.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    /// Whether the row carries no values at all.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyed.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RowItem {
    Value(SeedValue),
    Keyed(#[serde(deserialize_with = "ordered_map")] Vec<(String, SeedValue)>),
}

impl<'de> Deserialize<'de> for SeedRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SeedRowVisitor;

        impl<'de> Visitor<'de> for SeedRowVisitor {
            type Value = SeedRow;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of values or a mapping of column to value")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<SeedRow, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut row = SeedRow::default();
                while let Some(item) = seq.next_element::<RowItem>()? {
                    match item {
                        RowItem::Value(v) => row.positional.push(v),
                        RowItem::Keyed(entries) => {
                            for (k, v) in entries {
                                row = row.set(k, v);
                            }
                        }
                    }
                }
                Ok(row)
            }

            fn visit_map<A>(self, mut map: A) -> Result<SeedRow, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut row = SeedRow::default();
                while let Some((k, v)) = map.next_entry::<String, SeedValue>()? {
                    row = row.set(k, v);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_any(SeedRowVisitor)
    }
}

/// Seed data section of a migration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedData {
    /// Target columns, in insertion order
    #[serde(default)]
    pub columns: Vec<SeedColumn>,

    /// Rows to insert
    #[serde(default)]
    pub rows: Vec<SeedRow>,

    /// Drop the freshly created table when insertion fails
    #[serde(default = "default_true")]
    pub drop_table_on_error: bool,
}

impl Default for SeedData {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            drop_table_on_error: true,
        }
    }
}

impl SeedData {
    /// Whether there is anything to insert.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// Normalized seed data ready for a batch insert.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedRows {
    /// Column names
    pub columns: Vec<String>,
    /// One value per column for every row
    pub rows: Vec<Vec<SeedValue>>,
}

impl ResolvedRows {
    /// Whether the insert would be a no-op.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// Reconcile seed columns and rows into a column list and value matrix.
///
/// Returns an empty result when either `columns` or `rows` is empty.
/// `now` is formatted once and shared by every row.
pub fn resolve(
    columns: &[SeedColumn],
    rows: &[SeedRow],
    timestamps: &TimestampColumns,
    now: DateTime<Utc>,
) -> ResolvedRows {
    if columns.is_empty() || rows.is_empty() {
        return ResolvedRows::default();
    }

    let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let now = SeedValue::Text(format_timestamp(now));

    let mut resolved = Vec::with_capacity(rows.len());
    for row in rows {
        let mut positional: VecDeque<&SeedValue> = row.positional.iter().collect();
        let mut values = Vec::with_capacity(columns.len());

        for column in columns {
            let value = if let Some(v) = row.get(&column.name) {
                v.clone()
            } else if let Some(default) = &column.default {
                default.clone()
            } else if timestamps.is_timestamp_column(&column.name) {
                now.clone()
            } else {
                positional.pop_front().cloned().unwrap_or(SeedValue::Null)
            };
            values.push(value);
        }

        if !values.is_empty() {
            resolved.push(values);
        }
    }

    ResolvedRows {
        columns: names,
        rows: resolved,
    }
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
