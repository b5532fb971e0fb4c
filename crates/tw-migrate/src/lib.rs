//! Migration engine for Tablewright.
//!
//! Runs table migrations against a [`tw_db::Connection`]: the schema-build
//! step executes inside a transaction with compensating cleanup, and seed
//! rows are inserted once the schema is committed.

pub mod error;
pub mod migration;
pub mod orchestrator;

pub use error::{MigrateError, MigrateResult};
pub use migration::{build_schema, Migration, SchemaBuildFn, SeedResolveFn};
pub use orchestrator::run_in_transaction;
