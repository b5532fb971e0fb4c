//! Down command implementation

use anyhow::Result;

use crate::cli::{Direction, DownArgs, GlobalArgs};
use crate::commands::common::{
    print_report, run_batch, ExitCode, ProjectContext, EXIT_MIGRATION,
};

/// Execute the down command
pub fn execute(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    let project = ProjectContext::load(global)?;
    let selected = project.select(args.migrations.as_deref())?;
    if selected.is_empty() {
        println!("No migrations found.");
        return Ok(());
    }

    let db = project.open_database(global)?;
    println!("Reverting {} migrations...\n", selected.len());
    let report = run_batch(&project, &selected, Direction::Down, &db, args.keep_going);
    print_report(&report, "Reverted");

    if report.failed() > 0 {
        return Err(ExitCode(EXIT_MIGRATION).into());
    }
    Ok(())
}
