use super::*;
use crate::error::MigrateError;
use tw_core::{Column, StatementKind};
use tw_db::{DbError, MemoryBackend, SchemaInspector, SqlExecutor};

fn posts() -> TableName {
    TableName::new("posts")
}

fn create_posts(conn: &MemoryBackend, builder: &DdlBuilder) -> MigrateResult<()> {
    let stmt = builder.create_table(&posts(), &[Column::new("id", "INT")], None, true);
    conn.execute(&stmt).map_err(MigrateError::SchemaBuild)?;
    Ok(())
}

#[test]
fn test_success_commits() {
    let db = MemoryBackend::new();
    let builder = DdlBuilder::default();
    let ok = run_in_transaction(&db, &builder, &posts(), |conn| create_posts(conn, &builder));
    assert!(ok);
    assert!(db.table_exists("posts").unwrap());
    assert_eq!(db.transcript().first().map(String::as_str), Some("BEGIN"));
    assert_eq!(db.transcript().last().map(String::as_str), Some("COMMIT"));
}

#[test]
fn test_failure_rolls_back_and_returns_false() {
    let db = MemoryBackend::new();
    let builder = DdlBuilder::default();
    let ok = run_in_transaction(&db, &builder, &posts(), |conn| {
        create_posts(conn, &builder)?;
        Err(MigrateError::SchemaBuild(DbError::ExecutionError(
            "boom".to_string(),
        )))
    });
    assert!(!ok);
    assert!(!db.table_exists("posts").unwrap());
    assert!(!db.in_transaction());
    assert_eq!(db.transcript().last().map(String::as_str), Some("ROLLBACK"));
}

#[test]
fn test_failure_drops_table_when_ddl_is_not_transactional() {
    let db = MemoryBackend::new().with_non_transactional_ddl();
    let builder = DdlBuilder::default();
    db.fail_on("CREATE INDEX");
    let ok = run_in_transaction(&db, &builder, &posts(), |conn| {
        create_posts(conn, &builder)?;
        conn.execute(&builder.create_index(None, &posts(), &["id"], false))
            .map_err(MigrateError::SchemaBuild)?;
        Ok(())
    });
    assert!(!ok);
    assert!(!db.table_exists("posts").unwrap());

    let drops: Vec<_> = db
        .statements()
        .into_iter()
        .filter(|s| matches!(s.kind, StatementKind::DropTable { .. }))
        .collect();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].sql, "DROP TABLE IF EXISTS \"posts\"");
}

#[test]
fn test_failure_before_create_does_not_drop() {
    let db = MemoryBackend::new();
    let builder = DdlBuilder::default();
    let ok = run_in_transaction(&db, &builder, &posts(), |_| {
        Err(MigrateError::Configuration {
            property: "columns".to_string(),
        })
    });
    assert!(!ok);
    assert!(db.statements().is_empty());
}

#[test]
fn test_failed_cleanup_does_not_mask_result() {
    let db = MemoryBackend::new().with_non_transactional_ddl();
    let builder = DdlBuilder::default();
    db.fail_on("DROP TABLE");
    let ok = run_in_transaction(&db, &builder, &posts(), |conn| {
        create_posts(conn, &builder)?;
        Err(MigrateError::SchemaBuild(DbError::ExecutionError(
            "later step".to_string(),
        )))
    });
    assert!(!ok);
    assert!(!db.in_transaction());
    // implicit commit kept the table and the drop was refused
    assert!(db.table_exists("posts").unwrap());
}

#[test]
fn test_begin_failure_returns_false() {
    let db = MemoryBackend::new();
    db.begin().unwrap();
    let builder = DdlBuilder::default();
    let mut ran = false;
    let ok = run_in_transaction(&db, &builder, &posts(), |_| {
        ran = true;
        Ok(())
    });
    assert!(!ok);
    assert!(!ran);
}

#[test]
fn test_prefixed_table_is_cleaned_up_by_physical_name() {
    let db = MemoryBackend::new().with_non_transactional_ddl();
    let builder = DdlBuilder::default().with_table_prefix("app_");
    let table = TableName::new("{{%posts}}");
    let ok = run_in_transaction(&db, &builder, &table, |conn| {
        conn.execute(&builder.create_table(&table, &[Column::new("id", "INT")], None, true))
            .map_err(MigrateError::SchemaBuild)?;
        Err(MigrateError::SchemaBuild(DbError::ExecutionError(
            "fk".to_string(),
        )))
    });
    assert!(!ok);
    assert!(!db.table_exists("app_posts").unwrap());
}

#[test]
fn test_commit_failure_rolls_back_and_cleans_up() {
    let db = MemoryBackend::new();
    db.fail_commit();
    let builder = DdlBuilder::default();
    let ok = run_in_transaction(&db, &builder, &posts(), |conn| create_posts(conn, &builder));
    assert!(!ok);
    assert!(!db.in_transaction());
    assert!(!db.table_exists("posts").unwrap());
    assert_eq!(db.transcript().last().map(String::as_str), Some("ROLLBACK"));
}

#[test]
fn test_commit_failure_drops_table_when_ddl_is_not_transactional() {
    let db = MemoryBackend::new().with_non_transactional_ddl();
    db.fail_commit();
    let builder = DdlBuilder::default();
    let ok = run_in_transaction(&db, &builder, &posts(), |conn| create_posts(conn, &builder));
    assert!(!ok);
    assert!(!db.table_exists("posts").unwrap());
    assert_eq!(
        db.transcript().last().map(String::as_str),
        Some("DROP TABLE IF EXISTS \"posts\"")
    );
}
