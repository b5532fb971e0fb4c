//! tw-core - Core library for Tablewright
//!
//! This crate provides table definitions, identifier derivation, DDL
//! statement building, seed data resolution, and project/migration file
//! loading shared by the database and migration crates.

pub mod config;
pub mod ddl;
pub mod definition;
pub mod dialect;
pub mod error;
pub mod identifier;
pub mod migration;
pub mod seed;
pub(crate) mod serde_helpers;
pub mod sql_utils;
pub mod table_name;
pub mod timestamps;

pub use config::{Config, DatabaseConfig};
pub use ddl::{DdlBuilder, Statement, StatementKind};
pub use definition::{Column, ForeignKey, IndexKey, ReferentialAction, TableDefinition};
pub use dialect::Dialect;
pub use error::{CoreError, CoreResult};
pub use identifier::{derive_name, resolve_name, IdentifierKind};
pub use migration::{discover_migrations, MigrationDefinition};
pub use seed::{ResolvedRows, SeedColumn, SeedData, SeedRow, SeedValue};
pub use table_name::TableName;
pub use timestamps::{ResolvedSchema, TimestampColumns};
