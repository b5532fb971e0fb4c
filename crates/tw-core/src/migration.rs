//! Migration files and their discovery
//!
//! A migration file is a YAML document describing one table: its columns,
//! indexes and foreign keys, optional seed rows, and an optional override of
//! the project's timestamp policy. The migration name is the file stem, and
//! migrations run in name order.

use crate::definition::TableDefinition;
use crate::error::{CoreError, CoreResult};
use crate::seed::SeedData;
use crate::timestamps::TimestampColumns;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One migration loaded from disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MigrationDefinition {
    /// File stem of the source file
    #[serde(skip)]
    pub name: String,

    /// Path of the source file
    #[serde(skip)]
    pub path: PathBuf,

    /// Table described by this migration
    #[serde(flatten)]
    pub table: TableDefinition,

    /// Default rows inserted after the table is created
    #[serde(default)]
    pub seed: SeedData,

    /// Per-migration timestamp policy; the project policy applies when absent
    #[serde(default)]
    pub timestamps: Option<TimestampColumns>,
}

impl MigrationDefinition {
    /// Load a migration from a YAML file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut migration: MigrationDefinition =
            serde_yaml::from_str(&content).map_err(|e| CoreError::MigrationParseError {
                path: path.display().to_string(),
                details: e.to_string(),
            })?;

        migration.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        migration.path = path.to_path_buf();

        if migration.table.columns.is_empty() {
            return Err(CoreError::MigrationParseError {
                path: path.display().to_string(),
                details: format!("table '{}' declares no columns", migration.table.name),
            });
        }
        Ok(migration)
    }

    /// Timestamp policy for this migration, falling back to `project`.
    pub fn timestamps_or<'a>(&'a self, project: &'a TimestampColumns) -> &'a TimestampColumns {
        self.timestamps.as_ref().unwrap_or(project)
    }
}

/// Discover every migration under `dirs`, sorted by name.
///
/// Subdirectories are searched recursively. Two files with the same stem are
/// rejected since names identify migrations on the command line.
pub fn discover_migrations(dirs: &[PathBuf]) -> CoreResult<Vec<MigrationDefinition>> {
    let mut migrations = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            return Err(CoreError::MigrationDirNotFound {
                path: dir.display().to_string(),
            });
        }
        discover_migrations_recursive(dir, &mut migrations)?;
    }

    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for migration in &migrations {
        if let Some(previous) = seen.insert(&migration.name, &migration.path) {
            return Err(CoreError::DuplicateMigration {
                name: migration.name.clone(),
                path1: previous.display().to_string(),
                path2: migration.path.display().to_string(),
            });
        }
    }

    migrations.sort_by(|a, b| a.name.cmp(&b.name));
    log::debug!("Discovered {} migrations", migrations.len());
    Ok(migrations)
}

fn discover_migrations_recursive(
    dir: &Path,
    migrations: &mut Vec<MigrationDefinition>,
) -> CoreResult<()> {
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })? {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            discover_migrations_recursive(&path, migrations)?;
            continue;
        }
        if !path.extension().is_some_and(|e| e == "yml" || e == "yaml") {
            continue;
        }
        migrations.push(MigrationDefinition::load(&path)?);
    }
    Ok(())
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
