//! Connection traits
//!
//! Migrations only need two capabilities from a database: running rendered
//! statements inside explicit transactions, and listing the tables that
//! currently exist. Both take `&self`; backends use interior mutability.

use crate::error::DbResult;
use std::collections::BTreeSet;
use tw_core::Statement;

/// Executes rendered statements and controls transactions.
pub trait SqlExecutor {
    /// Execute one statement, returning the number of affected rows.
    fn execute(&self, statement: &Statement) -> DbResult<usize>;

    /// Start a transaction.
    fn begin(&self) -> DbResult<()>;

    /// Commit the current transaction.
    fn commit(&self) -> DbResult<()>;

    /// Roll back the current transaction.
    fn rollback(&self) -> DbResult<()>;

    /// Backend name used in log output
    fn db_type(&self) -> &'static str;
}

/// Reads catalog information.
pub trait SchemaInspector {
    /// Names of all base tables in the default schema.
    fn list_table_names(&self) -> DbResult<BTreeSet<String>>;

    /// Whether a table with this physical name exists.
    fn table_exists(&self, name: &str) -> DbResult<bool> {
        Ok(self.list_table_names()?.contains(name))
    }
}

/// A connection usable by migrations.
pub trait Connection: SqlExecutor + SchemaInspector {}

impl<T: SqlExecutor + SchemaInspector + ?Sized> Connection for T {}
