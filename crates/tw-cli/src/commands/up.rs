//! Up command implementation

use anyhow::Result;

use crate::cli::{Direction, GlobalArgs, UpArgs};
use crate::commands::common::{
    print_report, run_batch, ExitCode, ProjectContext, EXIT_MIGRATION,
};

/// Execute the up command
pub fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let project = ProjectContext::load(global)?;
    let selected = project.select(args.migrations.as_deref())?;
    if selected.is_empty() {
        println!("No migrations found.");
        return Ok(());
    }

    let db = project.open_database(global)?;
    println!("Applying {} migrations...\n", selected.len());
    let report = run_batch(&project, &selected, Direction::Up, &db, args.keep_going);
    print_report(&report, "Applied");

    if report.failed() > 0 {
        return Err(ExitCode(EXIT_MIGRATION).into());
    }
    Ok(())
}
