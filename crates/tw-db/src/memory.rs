//! In-memory backend
//!
//! Interprets the structured [`StatementKind`] of each statement against a
//! simulated catalog instead of parsing SQL. Used for dry runs, where the
//! statement log is the product, and for tests that need failure injection.

use crate::error::{DbError, DbResult};
use crate::traits::{SchemaInspector, SqlExecutor};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use tw_core::{Statement, StatementKind};

/// Simulated state of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTable {
    /// Column names in declaration order
    pub columns: Vec<String>,
    /// Index name to uniqueness
    pub indexes: BTreeMap<String, bool>,
    /// Foreign key constraint names
    pub foreign_keys: BTreeSet<String>,
    /// Number of inserted rows
    pub rows: usize,
}

type Catalog = BTreeMap<String, MemoryTable>;

#[cfg(any(test, feature = "test-support"))]
type FailurePredicate = Box<dyn Fn(&Statement) -> bool>;

/// In-memory catalog backend.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RefCell<Catalog>,
    snapshot: RefCell<Option<Catalog>>,
    statements: RefCell<Vec<Statement>>,
    transcript: RefCell<Vec<String>>,
    non_transactional_ddl: Cell<bool>,
    #[cfg(any(test, feature = "test-support"))]
    failures: RefCell<Vec<FailurePredicate>>,
    #[cfg(any(test, feature = "test-support"))]
    commit_fails: Cell<bool>,
}

impl MemoryBackend {
    /// Empty catalog with transactional DDL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat DDL as implicitly committing, as MySQL does.
    ///
    /// After each DDL statement the current state becomes the rollback
    /// point, so a later rollback only discards inserts.
    pub fn with_non_transactional_ddl(self) -> Self {
        self.non_transactional_ddl.set(true);
        self
    }

    /// Register an existing table before any statement runs.
    pub fn with_table<I, S>(self, name: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.borrow_mut().insert(
            name.to_string(),
            MemoryTable {
                columns: columns.into_iter().map(Into::into).collect(),
                ..Default::default()
            },
        );
        self
    }

    /// Fail every statement whose SQL contains `needle`.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_on(&self, needle: &str) {
        let needle = needle.to_string();
        self.fail_when(move |stmt| stmt.sql.contains(&needle));
    }

    /// Fail every statement matching `predicate`.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_when(&self, predicate: impl Fn(&Statement) -> bool + 'static) {
        self.failures.borrow_mut().push(Box::new(predicate));
    }

    /// Make every `COMMIT` fail, leaving the transaction open.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_commit(&self) {
        self.commit_fails.set(true);
    }

    /// Successfully executed statements, in order.
    pub fn statements(&self) -> Vec<Statement> {
        self.statements.borrow().clone()
    }

    /// Executed SQL interleaved with `BEGIN`/`COMMIT`/`ROLLBACK` markers.
    pub fn transcript(&self) -> Vec<String> {
        self.transcript.borrow().clone()
    }

    /// Forget logged statements and transcript; the catalog is kept.
    pub fn clear_log(&self) {
        self.statements.borrow_mut().clear();
        self.transcript.borrow_mut().clear();
    }

    /// Snapshot of one table.
    pub fn table(&self, name: &str) -> Option<MemoryTable> {
        self.tables.borrow().get(name).cloned()
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.snapshot.borrow().is_some()
    }

    #[cfg(any(test, feature = "test-support"))]
    fn check_injected_failure(&self, statement: &Statement) -> DbResult<()> {
        if self.failures.borrow().iter().any(|p| p(statement)) {
            return Err(DbError::ExecutionError(format!(
                "injected failure: {}",
                statement.sql
            )));
        }
        Ok(())
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn check_injected_failure(&self, _statement: &Statement) -> DbResult<()> {
        Ok(())
    }

    #[cfg(any(test, feature = "test-support"))]
    fn check_commit_failure(&self) -> DbResult<()> {
        if self.commit_fails.get() {
            return Err(DbError::TransactionError(
                "injected commit failure".to_string(),
            ));
        }
        Ok(())
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn check_commit_failure(&self) -> DbResult<()> {
        Ok(())
    }

    fn apply(&self, catalog: &mut Catalog, kind: &StatementKind) -> DbResult<usize> {
        match kind {
            StatementKind::CreateTable {
                table,
                columns,
                if_not_exists,
            } => {
                if catalog.contains_key(table) {
                    if *if_not_exists {
                        return Ok(0);
                    }
                    return Err(DbError::ExecutionError(format!(
                        "table '{table}' already exists"
                    )));
                }
                catalog.insert(
                    table.clone(),
                    MemoryTable {
                        columns: columns.clone(),
                        ..Default::default()
                    },
                );
                Ok(0)
            }
            StatementKind::DropTable { table, if_exists } => {
                if catalog.remove(table).is_none() && !*if_exists {
                    return Err(DbError::TableNotFound(table.clone()));
                }
                Ok(0)
            }
            StatementKind::CreateIndex {
                name,
                table,
                columns,
                unique,
            } => {
                let entry = existing_table(catalog, table)?;
                if let Some(missing) = columns.iter().find(|c| !entry.columns.contains(c)) {
                    return Err(DbError::ExecutionError(format!(
                        "column '{missing}' not found in table '{table}'"
                    )));
                }
                if entry.indexes.contains_key(name) {
                    return Err(DbError::ExecutionError(format!(
                        "index '{name}' already exists"
                    )));
                }
                entry.indexes.insert(name.clone(), *unique);
                Ok(0)
            }
            StatementKind::AddForeignKey {
                name,
                table,
                ref_table,
            } => {
                if !catalog.contains_key(ref_table) {
                    return Err(DbError::TableNotFound(ref_table.clone()));
                }
                let entry = existing_table(catalog, table)?;
                if !entry.foreign_keys.insert(name.clone()) {
                    return Err(DbError::ExecutionError(format!(
                        "constraint '{name}' already exists"
                    )));
                }
                Ok(0)
            }
            StatementKind::DropForeignKey { name, table } => {
                let entry = existing_table(catalog, table)?;
                if !entry.foreign_keys.remove(name) {
                    return Err(DbError::ExecutionError(format!(
                        "constraint '{name}' does not exist"
                    )));
                }
                Ok(0)
            }
            StatementKind::Insert { table, rows } => {
                let entry = existing_table(catalog, table)?;
                entry.rows += rows;
                Ok(*rows)
            }
        }
    }
}

fn existing_table<'c>(catalog: &'c mut Catalog, table: &str) -> DbResult<&'c mut MemoryTable> {
    catalog
        .get_mut(table)
        .ok_or_else(|| DbError::TableNotFound(table.to_string()))
}

impl SqlExecutor for MemoryBackend {
    fn execute(&self, statement: &Statement) -> DbResult<usize> {
        self.check_injected_failure(statement)?;

        let affected = {
            let mut tables = self.tables.borrow_mut();
            self.apply(&mut tables, &statement.kind)?
        };

        let is_ddl = !matches!(statement.kind, StatementKind::Insert { .. });
        if is_ddl && self.non_transactional_ddl.get() {
            let mut snapshot = self.snapshot.borrow_mut();
            if snapshot.is_some() {
                *snapshot = Some(self.tables.borrow().clone());
            }
        }

        log::debug!("{}", statement.sql);
        self.statements.borrow_mut().push(statement.clone());
        self.transcript.borrow_mut().push(statement.sql.clone());
        Ok(affected)
    }

    fn begin(&self) -> DbResult<()> {
        let mut snapshot = self.snapshot.borrow_mut();
        if snapshot.is_some() {
            return Err(DbError::TransactionError(
                "a transaction is already active".to_string(),
            ));
        }
        *snapshot = Some(self.tables.borrow().clone());
        self.transcript.borrow_mut().push("BEGIN".to_string());
        Ok(())
    }

    fn commit(&self) -> DbResult<()> {
        if self.snapshot.borrow().is_some() {
            self.check_commit_failure()?;
        }
        if self.snapshot.borrow_mut().take().is_none() {
            return Err(DbError::TransactionError(
                "no active transaction to commit".to_string(),
            ));
        }
        self.transcript.borrow_mut().push("COMMIT".to_string());
        Ok(())
    }

    fn rollback(&self) -> DbResult<()> {
        let Some(previous) = self.snapshot.borrow_mut().take() else {
            return Err(DbError::TransactionError(
                "no active transaction to roll back".to_string(),
            ));
        };
        *self.tables.borrow_mut() = previous;
        self.transcript.borrow_mut().push("ROLLBACK".to_string());
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "memory"
    }
}

impl SchemaInspector for MemoryBackend {
    fn list_table_names(&self) -> DbResult<BTreeSet<String>> {
        Ok(self.tables.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
