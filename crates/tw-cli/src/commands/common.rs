//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tw_core::{discover_migrations, Config, DdlBuilder, Dialect, MigrationDefinition};
use tw_db::{Connection, DuckDbBackend};
use tw_migrate::Migration;

use crate::cli::{Direction, GlobalArgs};

/// Exit code for configuration and project loading failures.
pub(crate) const EXIT_CONFIG: i32 = 1;
/// Exit code for database and migration failures.
pub(crate) const EXIT_MIGRATION: i32 = 4;

/// Structured exit code error.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ExitCode is control flow, not a user-facing message.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Install the log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` selects `debug` and the default
/// is `info`. Output goes to stderr so command output on stdout stays
/// machine-readable.
pub(crate) fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = result {
        eprintln!("Failed to install logger: {e}");
    }
}

/// A loaded project: configuration plus discovered migrations.
pub(crate) struct ProjectContext {
    /// Parsed tablewright.yml
    pub config: Config,
    /// All migrations, sorted by name
    pub migrations: Vec<MigrationDefinition>,
}

impl ProjectContext {
    /// Load config and migrations from `global.project_dir`.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = Path::new(&global.project_dir).to_path_buf();
        let config = Config::load_from_dir(&root).context("Failed to load project config")?;
        let migrations = discover_migrations(&config.migration_paths_absolute(&root))
            .context("Failed to load migrations")?;
        log::debug!(
            "Loaded project '{}' with {} migrations from {}",
            config.name,
            migrations.len(),
            root.display()
        );
        Ok(Self { config, migrations })
    }

    /// Statement builder for the configured dialect and table prefix.
    pub fn ddl_builder(&self) -> DdlBuilder {
        DdlBuilder::new(self.config.database.dialect).with_table_prefix(&self.config.table_prefix)
    }

    /// Migrations named in a comma-separated `filter`, or all of them.
    ///
    /// Unknown names are an error. The result keeps name order.
    pub fn select(&self, filter: Option<&str>) -> Result<Vec<&MigrationDefinition>> {
        let Some(filter) = filter else {
            return Ok(self.migrations.iter().collect());
        };
        let wanted: HashSet<&str> = filter
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let known: HashSet<&str> = self.migrations.iter().map(|m| m.name.as_str()).collect();
        let mut unknown: Vec<&str> = wanted.difference(&known).copied().collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            bail!("Unknown migrations: {}", unknown.join(", "));
        }
        Ok(self
            .migrations
            .iter()
            .filter(|m| wanted.contains(m.name.as_str()))
            .collect())
    }

    /// Open the configured database, honoring `--database`.
    pub fn open_database(&self, global: &GlobalArgs) -> Result<DuckDbBackend> {
        let dialect = self.config.database.dialect;
        if dialect != Dialect::DuckDb {
            bail!(
                "No backend for dialect '{dialect}'; use `tw plan` to render its statements"
            );
        }
        let path = global
            .database
            .as_deref()
            .unwrap_or(&self.config.database.path);
        DuckDbBackend::new(path).context("Failed to connect to database")
    }
}

/// Outcome of one migration in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MigrationOutcome {
    /// Schema committed (and seed data inserted, for up)
    Applied,
    /// Rolled back or rejected, with the reason
    Failed(String),
}

/// Per-migration outcomes of a batch, in execution order.
#[derive(Debug, Default)]
pub(crate) struct BatchReport {
    pub outcomes: Vec<(String, MigrationOutcome)>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, MigrationOutcome::Failed(_)))
            .count()
    }

    pub fn applied(&self) -> usize {
        self.outcomes.len() - self.failed()
    }
}

/// Run one direction of the lifecycle for each migration.
///
/// Down runs in reverse order. Unless `keep_going` is set, the batch stops at
/// the first failure.
pub(crate) fn run_batch(
    project: &ProjectContext,
    migrations: &[&MigrationDefinition],
    direction: Direction,
    conn: &dyn Connection,
    keep_going: bool,
) -> BatchReport {
    let ordered: Vec<&MigrationDefinition> = match direction {
        Direction::Up => migrations.to_vec(),
        Direction::Down => migrations.iter().rev().copied().collect(),
    };

    let mut report = BatchReport::default();
    for file in ordered {
        let outcome = run_one(project, file, direction, conn);
        let stop = matches!(outcome, MigrationOutcome::Failed(_)) && !keep_going;
        report.outcomes.push((file.name.clone(), outcome));
        if stop {
            break;
        }
    }
    report
}

/// Run one direction of the lifecycle for a single migration.
pub(crate) fn run_one(
    project: &ProjectContext,
    file: &MigrationDefinition,
    direction: Direction,
    conn: &dyn Connection,
) -> MigrationOutcome {
    log::info!("*** {} {}", direction_label(direction), file.name);
    let migration = Migration::from_file(
        file,
        &project.config.timestamps,
        project.ddl_builder(),
        conn,
    );
    let result = match direction {
        Direction::Up => migration.up(),
        Direction::Down => migration.down(),
    };
    match result {
        Ok(true) => MigrationOutcome::Applied,
        Ok(false) => MigrationOutcome::Failed("rolled back".to_string()),
        Err(e) => MigrationOutcome::Failed(e.to_string()),
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "applying",
        Direction::Down => "reverting",
    }
}

/// Print per-migration results and a summary line.
pub(crate) fn print_report(report: &BatchReport, verb: &str) {
    for (name, outcome) in &report.outcomes {
        match outcome {
            MigrationOutcome::Applied => println!("  ✓ {name}"),
            MigrationOutcome::Failed(reason) => println!("  ✗ {name} - {reason}"),
        }
    }
    println!(
        "\n{verb}: {} succeeded, {} failed",
        report.applied(),
        report.failed()
    );
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
