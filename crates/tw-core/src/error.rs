//! Error types for tw-core

use thiserror::Error;

/// Core error type for Tablewright
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Migration file could not be parsed
    #[error("[C003] Failed to parse migration {path}: {details}")]
    MigrationParseError { path: String, details: String },

    /// C004: Two migration files share a name
    #[error("[C004] Duplicate migration name '{name}' in {path1} and {path2}")]
    DuplicateMigration {
        name: String,
        path1: String,
        path2: String,
    },

    /// C005: Migration directory not found
    #[error("[C005] Migration directory not found: {path}")]
    MigrationDirNotFound { path: String },

    /// C006: IO error with file path context
    #[error("[C006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C007: YAML parse error
    #[error("[C007] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
