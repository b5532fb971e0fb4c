//! tw-db - Database abstraction layer for Tablewright
//!
//! This crate provides the `SqlExecutor` and `SchemaInspector` traits, the
//! `Transaction` guard, and implementations for DuckDB and an in-memory
//! catalog used for dry runs and tests.

pub mod duckdb;
pub mod error;
pub mod memory;
pub mod traits;
pub mod transaction;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use memory::{MemoryBackend, MemoryTable};
pub use traits::{Connection, SchemaInspector, SqlExecutor};
pub use transaction::Transaction;
