use super::*;
use tw_core::{Column, DdlBuilder, ReferentialAction, SeedValue, TableName};

fn builder() -> DdlBuilder {
    DdlBuilder::default()
}

fn users() -> TableName {
    TableName::new("users")
}

fn create_users(db: &MemoryBackend) {
    let stmt = builder().create_table(
        &users(),
        &[Column::new("id", "INT"), Column::new("email", "TEXT")],
        None,
        true,
    );
    db.execute(&stmt).unwrap();
}

#[test]
fn test_create_and_list_tables() {
    let db = MemoryBackend::new().with_table("existing", ["id"]);
    create_users(&db);
    let names: Vec<String> = db.list_table_names().unwrap().into_iter().collect();
    assert_eq!(names, vec!["existing", "users"]);
    assert_eq!(db.table("users").unwrap().columns, vec!["id", "email"]);
    assert_eq!(db.db_type(), "memory");
}

#[test]
fn test_create_if_not_exists_is_idempotent() {
    let db = MemoryBackend::new();
    create_users(&db);
    create_users(&db);
    assert_eq!(db.statements().len(), 2);

    let strict = builder().create_table(&users(), &[Column::new("id", "INT")], None, false);
    assert!(db.execute(&strict).is_err());
}

#[test]
fn test_drop_table_if_exists() {
    let db = MemoryBackend::new();
    db.execute(&builder().drop_table(&users(), true)).unwrap();
    let err = db.execute(&builder().drop_table(&users(), false)).unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[test]
fn test_index_tracks_uniqueness_and_rejects_duplicates() {
    let db = MemoryBackend::new();
    create_users(&db);
    db.execute(&builder().create_index(None, &users(), &["email"], true))
        .unwrap();
    db.execute(&builder().create_index(None, &users(), &["id"], false))
        .unwrap();

    let table = db.table("users").unwrap();
    assert_eq!(table.indexes.get("idx-users-email"), Some(&true));
    assert_eq!(table.indexes.get("idx-users-id"), Some(&false));

    assert!(db
        .execute(&builder().create_index(None, &users(), &["email"], true))
        .is_err());
}

#[test]
fn test_index_on_unknown_column_fails() {
    let db = MemoryBackend::new();
    create_users(&db);
    assert!(db
        .execute(&builder().create_index(None, &users(), &["nope"], false))
        .is_err());
}

#[test]
fn test_foreign_key_requires_referenced_table() {
    let db = MemoryBackend::new();
    create_users(&db);
    let add = builder().add_foreign_key(
        None,
        &users(),
        &["id"],
        &TableName::new("accounts"),
        &["id"],
        ReferentialAction::Cascade,
        ReferentialAction::Cascade,
    );
    let err = db.execute(&add).unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(ref t) if t == "accounts"));
}

#[test]
fn test_foreign_key_add_and_drop() {
    let db = MemoryBackend::new().with_table("accounts", ["id"]);
    create_users(&db);
    let add = builder().add_foreign_key(
        None,
        &users(),
        &["id"],
        &TableName::new("accounts"),
        &["id"],
        ReferentialAction::Cascade,
        ReferentialAction::Cascade,
    );
    db.execute(&add).unwrap();
    assert!(db.table("users").unwrap().foreign_keys.contains("fk-users-id"));

    let drop = builder().drop_foreign_key(None, &users(), &["id"]);
    db.execute(&drop).unwrap();
    assert!(db.table("users").unwrap().foreign_keys.is_empty());
    assert!(db.execute(&drop).is_err());
}

#[test]
fn test_insert_counts_rows() {
    let db = MemoryBackend::new();
    create_users(&db);
    let insert = builder().batch_insert(
        &users(),
        &["id".to_string()],
        &[vec![SeedValue::Int(1)], vec![SeedValue::Int(2)]],
    );
    assert_eq!(db.execute(&insert).unwrap(), 2);
    assert_eq!(db.table("users").unwrap().rows, 2);
}

#[test]
fn test_rollback_restores_catalog() {
    let db = MemoryBackend::new();
    db.begin().unwrap();
    create_users(&db);
    db.rollback().unwrap();
    assert!(db.list_table_names().unwrap().is_empty());
    assert_eq!(
        db.transcript(),
        vec![
            "BEGIN".to_string(),
            db.statements()[0].sql.clone(),
            "ROLLBACK".to_string()
        ]
    );
}

#[test]
fn test_non_transactional_ddl_survives_rollback() {
    let db = MemoryBackend::new().with_non_transactional_ddl();
    db.begin().unwrap();
    create_users(&db);
    let insert = builder().batch_insert(&users(), &["id".to_string()], &[vec![SeedValue::Int(1)]]);
    db.execute(&insert).unwrap();
    db.rollback().unwrap();

    let table = db.table("users").unwrap();
    assert_eq!(table.rows, 0);
}

#[test]
fn test_commit_without_begin_fails() {
    let db = MemoryBackend::new();
    assert!(matches!(
        db.commit().unwrap_err(),
        DbError::TransactionError(_)
    ));
    assert!(db.rollback().is_err());
}

#[test]
fn test_injected_failure_leaves_catalog_untouched() {
    let db = MemoryBackend::new();
    db.fail_on("CREATE TABLE");
    let stmt = builder().create_table(&users(), &[Column::new("id", "INT")], None, true);
    let err = db.execute(&stmt).unwrap_err();
    assert!(err.to_string().contains("injected failure"));
    assert!(db.statements().is_empty());
    assert!(!db.table_exists("users").unwrap());
}

#[test]
fn test_fail_when_predicate() {
    let db = MemoryBackend::new();
    db.fail_when(|stmt| matches!(stmt.kind, StatementKind::Insert { .. }));
    create_users(&db);
    let insert = builder().batch_insert(&users(), &["id".to_string()], &[vec![SeedValue::Int(1)]]);
    assert!(db.execute(&insert).is_err());
}

#[test]
fn test_clear_log_keeps_catalog() {
    let db = MemoryBackend::new();
    create_users(&db);
    db.clear_log();
    assert!(db.statements().is_empty());
    assert!(db.transcript().is_empty());
    assert!(db.table_exists("users").unwrap());
}
