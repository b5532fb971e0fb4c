//! Configuration types and parsing for tablewright.yml

use crate::dialect::Dialect;
use crate::error::{CoreError, CoreResult};
use crate::timestamps::TimestampColumns;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["tablewright.yml", "tablewright.yaml"];

/// Main project configuration from tablewright.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Prefix substituted for `%` in `{{%name}}` table names
    #[serde(default)]
    pub table_prefix: String,

    /// Directories containing migration YAML files
    #[serde(default = "default_migration_paths")]
    pub migration_paths: Vec<String>,

    /// Timestamp column roles used by migrations that do not override them
    #[serde(default)]
    pub timestamps: TimestampColumns,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (for DuckDB file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQL dialect used to render statements
    #[serde(default)]
    pub dialect: Dialect,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            dialect: Dialect::default(),
        }
    }
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

fn default_migration_paths() -> Vec<String> {
    vec!["migrations".to_string()]
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    ///
    /// Looks for tablewright.yml or tablewright.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }
        if self.migration_paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration_paths must list at least one directory".to_string(),
            });
        }
        Ok(())
    }

    /// Migration directories resolved against the project root
    pub fn migration_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.migration_paths.iter().map(|p| root.join(p)).collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
