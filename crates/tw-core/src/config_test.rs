use super::*;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_config() {
    let yaml = r#"
name: test_project
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.name, "test_project");
    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.database.dialect, Dialect::DuckDb);
    assert_eq!(config.table_prefix, "");
    assert_eq!(config.timestamps, TimestampColumns::default());

    let root = std::path::PathBuf::from("/tmp/test");
    assert_eq!(
        config.migration_paths_absolute(&root),
        vec![root.join("migrations")]
    );
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: shop
database:
  path: "./shop.duckdb"
  dialect: mysql
table_prefix: shop_
migration_paths:
  - db/migrations
  - db/seeds
timestamps:
  created: created_at
  updated: updated_at
  status_updated: ~
  auto_append: false
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.database.path, "./shop.duckdb");
    assert_eq!(config.database.dialect, Dialect::MySql);
    assert_eq!(config.table_prefix, "shop_");
    assert_eq!(config.migration_paths, vec!["db/migrations", "db/seeds"]);
    assert_eq!(config.timestamps.created.as_deref(), Some("created_at"));
    assert_eq!(config.timestamps.status_updated, None);
    assert!(!config.timestamps.auto_append);
}

#[test]
fn test_unknown_field_rejected() {
    let yaml = r#"
name: shop
tabel_prefix: oops_
"#;
    let result: Result<Config, _> = serde_yaml::from_str(yaml);
    assert!(result.is_err());
}

#[test]
fn test_load_from_dir_yml() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tablewright.yml"), "name: from_yml\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yml");
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tablewright.yaml"), "name: from_yaml\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yaml");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_empty_name_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tablewright.yml");
    std::fs::write(&path, "name: \"\"\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}
