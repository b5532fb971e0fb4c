//! Migration lifecycle
//!
//! A [`Migration`] pairs a [`TableDefinition`] with a borrowed connection.
//! `up()` creates the table with its indexes and foreign keys in one
//! transaction, then inserts seed rows. `down()` drops the foreign keys and
//! the table. The builder methods are public so custom schema steps can
//! reuse them.

use crate::error::{MigrateError, MigrateResult};
use crate::orchestrator::run_in_transaction;
use chrono::{DateTime, Utc};
use std::cell::OnceCell;
use std::time::Instant;
use tw_core::{
    seed, Column, DdlBuilder, MigrationDefinition, ReferentialAction, ResolvedRows,
    ResolvedSchema, SeedColumn, SeedData, SeedRow, Statement, TableDefinition, TableName,
    TimestampColumns,
};
use tw_db::Connection;

/// Schema-build step run inside the `up()` transaction.
pub type SchemaBuildFn = fn(&Migration<'_>, &TableDefinition) -> MigrateResult<()>;

/// Reconciles seed rows against seed columns.
pub type SeedResolveFn =
    fn(&[SeedColumn], &[SeedRow], &TimestampColumns, DateTime<Utc>) -> ResolvedRows;

/// One table migration bound to a connection.
pub struct Migration<'c> {
    definition: TableDefinition,
    seed: SeedData,
    timestamps: TimestampColumns,
    builder: DdlBuilder,
    conn: &'c dyn Connection,
    schema_step: SchemaBuildFn,
    seed_resolver: SeedResolveFn,
    clock: Box<dyn Fn() -> DateTime<Utc>>,
    resolved: OnceCell<ResolvedSchema>,
}

impl<'c> Migration<'c> {
    /// Migration for `definition` with no seed data, default timestamp
    /// policy and the default dialect.
    pub fn new(definition: TableDefinition, conn: &'c dyn Connection) -> Self {
        Self {
            definition,
            seed: SeedData::default(),
            timestamps: TimestampColumns::default(),
            builder: DdlBuilder::default(),
            conn,
            schema_step: build_schema,
            seed_resolver: seed::resolve,
            clock: Box::new(Utc::now),
            resolved: OnceCell::new(),
        }
    }

    /// Migration for a loaded migration file.
    ///
    /// The file's timestamp override wins over `project_timestamps`.
    pub fn from_file(
        file: &MigrationDefinition,
        project_timestamps: &TimestampColumns,
        builder: DdlBuilder,
        conn: &'c dyn Connection,
    ) -> Self {
        Self::new(file.table.clone(), conn)
            .with_seed(file.seed.clone())
            .with_timestamps(file.timestamps_or(project_timestamps).clone())
            .with_builder(builder)
    }

    /// Set the seed data inserted after `up()`.
    pub fn with_seed(mut self, seed: SeedData) -> Self {
        self.seed = seed;
        self.resolved = OnceCell::new();
        self
    }

    /// Set the timestamp column policy.
    pub fn with_timestamps(mut self, timestamps: TimestampColumns) -> Self {
        self.timestamps = timestamps;
        self.resolved = OnceCell::new();
        self
    }

    /// Set the statement builder (dialect and table prefix).
    pub fn with_builder(mut self, builder: DdlBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Replace the schema-build step.
    pub fn with_schema_step(mut self, step: SchemaBuildFn) -> Self {
        self.schema_step = step;
        self
    }

    /// Replace the seed resolver.
    pub fn with_seed_resolver(mut self, resolver: SeedResolveFn) -> Self {
        self.seed_resolver = resolver;
        self
    }

    /// Replace the clock used for auto-filled timestamps.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// The declared table.
    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    /// The statement builder.
    pub fn builder(&self) -> &DdlBuilder {
        &self.builder
    }

    /// Table and seed columns after timestamp injection.
    pub fn resolved_schema(&self) -> &ResolvedSchema {
        self.resolved
            .get_or_init(|| self.timestamps.apply(&self.definition, &self.seed.columns))
    }

    /// Create the table with its indexes and foreign keys, then insert seed
    /// rows.
    ///
    /// Returns `Ok(false)` when the schema step failed and was rolled back.
    /// A seed insertion failure is returned as an error after the table has
    /// optionally been dropped.
    pub fn up(&self) -> MigrateResult<bool> {
        self.check_required(&[Property::Table, Property::Columns])?;
        let schema = self.resolved_schema();
        if !schema.appended.is_empty() {
            log::debug!(
                "Appended timestamp columns to {}: {}",
                self.definition.name,
                schema.appended.join(", ")
            );
        }

        let step = self.schema_step;
        let committed = run_in_transaction(self.conn, &self.builder, &self.definition.name, |_| {
            step(self, &schema.table)
        });
        if committed {
            self.insert_default_data(self.seed.drop_table_on_error)?;
        }
        Ok(committed)
    }

    /// Drop every declared foreign key, then the table.
    pub fn down(&self) -> MigrateResult<bool> {
        self.check_required(&[Property::Table])?;
        let table = &self.definition;
        Ok(run_in_transaction(
            self.conn,
            &self.builder,
            &table.name,
            |_| {
                for fk in &table.foreign_keys {
                    self.drop_foreign_key_ex(None, &table.name, &[&fk.column])?;
                }
                self.drop_table_exists(&table.name, true)
            },
        ))
    }

    /// `CREATE TABLE`, guarded with `IF NOT EXISTS` when `if_not_exists`.
    pub fn create_table_exists(
        &self,
        table: &TableName,
        columns: &[Column],
        options: Option<&str>,
        if_not_exists: bool,
    ) -> MigrateResult<()> {
        let stmt = self
            .builder
            .create_table(table, columns, options, if_not_exists);
        self.timed(&format!("create table {table}"), &stmt)
    }

    /// `DROP TABLE`, guarded with `IF EXISTS` when `if_exists`.
    pub fn drop_table_exists(&self, table: &TableName, if_exists: bool) -> MigrateResult<()> {
        let stmt = self.builder.drop_table(table, if_exists);
        self.timed(&format!("drop table {table}"), &stmt)
    }

    /// Create an index; the name is derived as `idx-<table>-<cols>` when
    /// `name` is `None`.
    pub fn create_index<S: AsRef<str>>(
        &self,
        name: Option<&str>,
        table: &TableName,
        columns: &[S],
        unique: bool,
    ) -> MigrateResult<()> {
        let stmt = self.builder.create_index(name, table, columns, unique);
        self.timed(&format!("create index on {table}"), &stmt)
    }

    /// Add a foreign key; the name is derived as `fk-<table>-<cols>` when
    /// `name` is `None`.
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
    ) -> MigrateResult<()> {
        let stmt = self.builder.add_foreign_key(
            name,
            table,
            columns,
            ref_table,
            ref_columns,
            on_delete,
            on_update,
        );
        self.timed(&format!("add foreign key on {table}"), &stmt)
    }

    /// Drop a foreign key, deriving its name the same way
    /// [`add_foreign_key`](Self::add_foreign_key) does.
    pub fn drop_foreign_key_ex<S: AsRef<str>>(
        &self,
        name: Option<&str>,
        table: &TableName,
        columns: &[S],
    ) -> MigrateResult<()> {
        let stmt = self.builder.drop_foreign_key(name, table, columns);
        self.timed(&format!("drop foreign key on {table}"), &stmt)
    }

    /// Insert the seed rows in one batch.
    ///
    /// Does nothing when there are no seed columns or rows. On failure the
    /// table is dropped when `drop_table_on_error` is set, and the insertion
    /// error is returned.
    pub fn insert_default_data(&self, drop_table_on_error: bool) -> MigrateResult<()> {
        let schema = self.resolved_schema();
        let rows = (self.seed_resolver)(
            &schema.seed_columns,
            &self.seed.rows,
            &self.timestamps,
            (self.clock)(),
        );
        if rows.is_empty() {
            return Ok(());
        }

        log::info!("> insert data ...");
        let start = Instant::now();
        let stmt = self
            .builder
            .batch_insert(&self.definition.name, &rows.columns, &rows.rows);
        match self.conn.execute(&stmt) {
            Ok(_) => {
                log::info!(
                    "> insertion done (time: {:.3}s)",
                    start.elapsed().as_secs_f64()
                );
                Ok(())
            }
            Err(e) => {
                log::error!("> insertion error: {e}");
                if drop_table_on_error {
                    if let Err(drop_err) = self.drop_table_exists(&self.definition.name, true) {
                        log::warn!(
                            "Could not drop {} after failed insert: {drop_err}",
                            self.definition.name
                        );
                    }
                }
                Err(MigrateError::SeedInsertion(e))
            }
        }
    }

    fn timed(&self, label: &str, stmt: &Statement) -> MigrateResult<()> {
        let start = Instant::now();
        self.conn.execute(stmt).map_err(MigrateError::SchemaBuild)?;
        log::info!(
            "> {label} ... done (time: {:.3}s)",
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn check_required(&self, properties: &[Property]) -> MigrateResult<()> {
        for property in properties {
            let missing = match property {
                Property::Table => self.definition.name.bare().is_empty(),
                Property::Columns => self.definition.columns.is_empty(),
            };
            if missing {
                log::error!("> Error: Invalid property {}", property.as_str());
                return Err(MigrateError::Configuration {
                    property: property.as_str().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Property {
    Table,
    Columns,
}

impl Property {
    fn as_str(self) -> &'static str {
        match self {
            Property::Table => "table",
            Property::Columns => "columns",
        }
    }
}

/// Default schema-build step.
///
/// Creates the table (with the dialect's default options unless the
/// definition sets its own), then each declared index, then each foreign key.
/// A foreign key column that no declared index leads with gets a plain index
/// first.
pub fn build_schema(migration: &Migration<'_>, table: &TableDefinition) -> MigrateResult<()> {
    let options = migration
        .builder()
        .table_options(table.options.as_deref());
    migration.create_table_exists(&table.name, &table.columns, options.as_deref(), true)?;

    for key in &table.indexes {
        migration.create_index(None, &table.name, key.columns.as_slice(), key.unique)?;
    }

    for fk in &table.foreign_keys {
        if !table.is_indexed(&fk.column) {
            migration.create_index(None, &table.name, &[&fk.column], false)?;
        }
        migration.add_foreign_key(
            None,
            &table.name,
            &[&fk.column],
            &fk.ref_table,
            &[&fk.ref_column],
            fk.on_delete,
            fk.on_update,
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
