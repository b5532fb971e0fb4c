//! Error types for the migration engine.

use thiserror::Error;
use tw_db::DbError;

/// Migration errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// A required migration property is missing or empty (M001).
    #[error("[M001] Invalid property: {property}")]
    Configuration { property: String },

    /// A DDL statement failed while building the schema (M002).
    #[error("[M002] Schema build failed: {0}")]
    SchemaBuild(#[source] DbError),

    /// Seed rows could not be inserted (M003).
    #[error("[M003] Seed insertion failed: {0}")]
    SeedInsertion(#[source] DbError),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
