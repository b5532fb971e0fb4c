//! Plan command implementation
//!
//! Runs the selected migrations against an in-memory catalog and prints the
//! statements they execute. The configured database is never opened, so any
//! dialect can be planned.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tw_core::{MigrationDefinition, Statement};
use tw_db::MemoryBackend;

use crate::cli::{Direction, GlobalArgs, OutputFormat, PlanArgs};
use crate::commands::common::{
    run_one, ExitCode, MigrationOutcome, ProjectContext, EXIT_MIGRATION,
};

/// Planned statements for one migration.
#[derive(Debug, Serialize)]
struct PlannedMigration {
    migration: String,
    direction: &'static str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    statements: Vec<Statement>,
}

/// Execute the plan command
pub fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let project = ProjectContext::load(global)?;
    let selected = project.select(args.migrations.as_deref())?;
    if selected.is_empty() {
        println!("No migrations found.");
        return Ok(());
    }

    let plan = build_plan(&project, &selected, args.direction);
    match args.output {
        OutputFormat::Text => print_text(&plan),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
            println!("{json}");
        }
    }

    if plan.iter().any(|p| !p.ok) {
        return Err(ExitCode(EXIT_MIGRATION).into());
    }
    Ok(())
}

fn build_plan(
    project: &ProjectContext,
    selected: &[&MigrationDefinition],
    direction: Direction,
) -> Vec<PlannedMigration> {
    let db = primed_backend(project, selected);
    let ordered: Vec<_> = match direction {
        Direction::Up => selected.to_vec(),
        Direction::Down => {
            // Down needs the tables that up would have created.
            log::debug!("Priming in-memory catalog with {} migrations", selected.len());
            for file in selected {
                run_one(project, file, Direction::Up, &db);
            }
            db.clear_log();
            selected.iter().rev().copied().collect()
        }
    };

    let label = match direction {
        Direction::Up => "up",
        Direction::Down => "down",
    };

    ordered
        .into_iter()
        .map(|file| {
            let before = db.statements().len();
            let outcome = run_one(project, file, direction, &db);
            let statements = db.statements().split_off(before);
            let (ok, error) = match outcome {
                MigrationOutcome::Applied => (true, None),
                MigrationOutcome::Failed(reason) => (false, Some(reason)),
            };
            PlannedMigration {
                migration: file.name.clone(),
                direction: label,
                ok,
                error,
                statements,
            }
        })
        .collect()
}

/// In-memory catalog holding the tables that selected migrations reference
/// through foreign keys but do not create themselves.
fn primed_backend(project: &ProjectContext, selected: &[&MigrationDefinition]) -> MemoryBackend {
    let builder = project.ddl_builder();
    let created: HashSet<String> = selected
        .iter()
        .map(|file| builder.physical_table(&file.table.name))
        .collect();

    let mut external: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for file in selected {
        for fk in &file.table.foreign_keys {
            let physical = builder.physical_table(&fk.ref_table);
            if !created.contains(&physical) {
                external
                    .entry(physical)
                    .or_default()
                    .insert(fk.ref_column.clone());
            }
        }
    }

    external
        .into_iter()
        .fold(MemoryBackend::new(), |db, (table, columns)| {
            log::debug!("Assuming referenced table {table} already exists");
            db.with_table(&table, columns)
        })
}

fn print_text(plan: &[PlannedMigration]) {
    for entry in plan {
        match &entry.error {
            None => println!("-- {} ({})", entry.migration, entry.direction),
            Some(reason) => println!(
                "-- {} ({}) FAILED: {}",
                entry.migration, entry.direction, reason
            ),
        }
        for stmt in &entry.statements {
            println!("{stmt};");
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(dialect: &str) -> (TempDir, GlobalArgs) {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tablewright.yml"),
            format!("name: shop\ndatabase:\n  dialect: {dialect}\n"),
        )
        .unwrap();
        let migrations = dir.path().join("migrations");
        std::fs::create_dir_all(&migrations).unwrap();
        std::fs::write(
            migrations.join("001_customers.yml"),
            "table: customers\ncolumns:\n  id: INT NOT NULL PRIMARY KEY\n",
        )
        .unwrap();
        std::fs::write(
            migrations.join("002_orders.yml"),
            "table: orders\ncolumns:\n  id: INT NOT NULL PRIMARY KEY\n  customer_id: INT NOT NULL\nforeign_keys:\n  customer_id: customers\n",
        )
        .unwrap();
        let global = GlobalArgs {
            verbose: false,
            project_dir: dir.path().display().to_string(),
            database: None,
        };
        (dir, global)
    }

    #[test]
    fn test_plan_up_mysql() {
        let (_dir, global) = project("mysql");
        let ctx = ProjectContext::load(&global).unwrap();
        let selected = ctx.select(None).unwrap();
        let plan = build_plan(&ctx, &selected, Direction::Up);

        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|p| p.ok));
        assert!(plan[0].statements[0]
            .sql
            .starts_with("CREATE TABLE IF NOT EXISTS `customers`"));
        let last = plan[1].statements.last().unwrap();
        assert_eq!(
            last.sql,
            "ALTER TABLE `orders` ADD CONSTRAINT `fk-orders-customer_id` FOREIGN KEY (`customer_id`) REFERENCES `customers` (`id`) ON DELETE CASCADE ON UPDATE CASCADE"
        );
    }

    #[test]
    fn test_plan_down_reverses_and_drops_fks_first() {
        let (_dir, global) = project("postgres");
        let ctx = ProjectContext::load(&global).unwrap();
        let selected = ctx.select(None).unwrap();
        let plan = build_plan(&ctx, &selected, Direction::Down);

        let names: Vec<&str> = plan.iter().map(|p| p.migration.as_str()).collect();
        assert_eq!(names, vec!["002_orders", "001_customers"]);
        let orders: Vec<&str> = plan[0].statements.iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(
            orders,
            vec![
                "ALTER TABLE \"orders\" DROP CONSTRAINT \"fk-orders-customer_id\"",
                "DROP TABLE IF EXISTS \"orders\"",
            ]
        );
    }

    #[test]
    fn test_plan_assumes_tables_outside_selection_exist() {
        let (_dir, global) = project("duckdb");
        let ctx = ProjectContext::load(&global).unwrap();
        let selected = ctx.select(Some("002_orders")).unwrap();
        let plan = build_plan(&ctx, &selected, Direction::Up);

        assert_eq!(plan.len(), 1);
        assert!(plan[0].ok, "{:?}", plan[0].error);
        let last = plan[0].statements.last().unwrap();
        assert!(last.sql.contains("REFERENCES \"customers\" (\"id\")"));
    }

    #[test]
    fn test_plan_reports_failure() {
        let (dir, global) = project("duckdb");
        std::fs::write(
            dir.path().join("migrations").join("003_bad.yml"),
            "table: bad\ncolumns:\n  id: INT\nindexes:\n  - missing\n",
        )
        .unwrap();
        let ctx = ProjectContext::load(&global).unwrap();
        let selected = ctx.select(Some("003_bad")).unwrap();
        let plan = build_plan(&ctx, &selected, Direction::Up);

        assert!(!plan[0].ok);
        assert_eq!(plan[0].error.as_deref(), Some("rolled back"));

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json[0]["ok"], false);
        assert_eq!(json[0]["statements"][0]["kind"]["op"], "create_table");
    }
}
