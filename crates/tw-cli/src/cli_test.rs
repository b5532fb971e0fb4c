use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_parse_up_with_filter() {
    let cli = Cli::try_parse_from([
        "tw",
        "-v",
        "-p",
        "proj",
        "up",
        "--migrations",
        "001_users,002_posts",
        "--keep-going",
    ])
    .unwrap();
    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, "proj");
    let Commands::Up(args) = cli.command else {
        panic!("expected up");
    };
    assert_eq!(args.migrations.as_deref(), Some("001_users,002_posts"));
    assert!(args.keep_going);
}

#[test]
fn test_parse_plan_defaults() {
    let cli = Cli::try_parse_from(["tw", "plan"]).unwrap();
    assert_eq!(cli.global.project_dir, ".");
    assert_eq!(cli.global.database, None);
    let Commands::Plan(args) = cli.command else {
        panic!("expected plan");
    };
    assert_eq!(args.direction, Direction::Up);
    assert_eq!(args.output, OutputFormat::Text);
}

#[test]
fn test_global_database_after_subcommand() {
    let cli = Cli::try_parse_from(["tw", "down", "-d", "other.duckdb"]).unwrap();
    assert_eq!(cli.global.database.as_deref(), Some("other.duckdb"));
    assert!(matches!(cli.command, Commands::Down(_)));
}
