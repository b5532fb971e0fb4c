//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Tablewright - declarative table migrations with transactional rollback
#[derive(Parser, Debug)]
#[command(name = "tw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override database path from tablewright.yml
    #[arg(short, long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create tables, indexes, foreign keys and seed rows
    Up(UpArgs),

    /// Drop foreign keys and tables, newest migration first
    Down(DownArgs),

    /// Print the statements a migration run would execute, without touching the database
    Plan(PlanArgs),
}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Migration names to apply (comma-separated, default: all)
    #[arg(short, long)]
    pub migrations: Option<String>,

    /// Continue with the remaining migrations after a failure
    #[arg(long)]
    pub keep_going: bool,
}

/// Arguments for the down command
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Migration names to revert (comma-separated, default: all)
    #[arg(short, long)]
    pub migrations: Option<String>,

    /// Continue with the remaining migrations after a failure
    #[arg(long)]
    pub keep_going: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Migration names to plan (comma-separated, default: all)
    #[arg(short, long)]
    pub migrations: Option<String>,

    /// Which half of the lifecycle to plan
    #[arg(long, value_enum, default_value = "up")]
    pub direction: Direction,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Migration direction
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply migrations
    Up,
    /// Revert migrations
    Down,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Annotated SQL
    Text,
    /// JSON document
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
