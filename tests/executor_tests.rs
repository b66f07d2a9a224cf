mod common;

use common::{seed, seeded_store};
use nl_sql_gateway::{
    error::ExecutionFailure,
    executor::{QueryExecutor, SqliteExecutor}
};
use serde_json::json;

#[tokio::test]
async fn test_rows_keep_column_order() {
    let (_dir, path) = seeded_store();
    let executor = SqliteExecutor::new(&path, 100);

    let rows = executor
        .execute("SELECT id, name, email, favorite_genre, created_at FROM customers WHERE name = 'Alice' LIMIT 100")
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(columns, ["id", "name", "email", "favorite_genre", "created_at"]);
    assert_eq!(rows[0]["id"], json!(1));
    assert_eq!(rows[0]["name"], json!("Alice"));
    assert_eq!(rows[0]["created_at"], json!("2025-03-20"));
}

#[tokio::test]
async fn test_filtered_select() {
    let (_dir, path) = seeded_store();
    let executor = SqliteExecutor::new(&path, 100);

    let rows = executor
        .execute("SELECT name FROM customers WHERE favorite_genre = 'Sci-Fi' LIMIT 100")
        .await
        .unwrap();

    let names: Vec<&serde_json::Value> = rows.iter().map(|r| &r["name"]).collect();
    assert_eq!(names, [&json!("Bob"), &json!("Hannah")]);
}

#[tokio::test]
async fn test_null_and_aggregate_values() {
    let (_dir, path) = seeded_store();
    let executor = SqliteExecutor::new(&path, 100);

    let rows = executor
        .execute("SELECT NULL AS nothing, AVG(id) AS mean, COUNT(*) AS total FROM customers")
        .await
        .unwrap();

    assert_eq!(rows[0]["nothing"], json!(null));
    assert_eq!(rows[0]["mean"], json!(5.5));
    assert_eq!(rows[0]["total"], json!(10));
}

#[tokio::test]
async fn test_row_count_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.db");
    seed(&path, 250);
    let executor = SqliteExecutor::new(&path, 100);

    let rows = executor.execute("SELECT id FROM customers").await.unwrap();

    assert_eq!(rows.len(), 100);
}

#[tokio::test]
async fn test_write_statements_are_refused() {
    let (_dir, path) = seeded_store();
    let executor = SqliteExecutor::new(&path, 100);

    let result = executor.execute("DELETE FROM customers").await;
    assert!(matches!(result, Err(ExecutionFailure::StoreError(_))));

    let rows = executor
        .execute("SELECT COUNT(*) AS total FROM customers")
        .await
        .unwrap();
    assert_eq!(rows[0]["total"], json!(10));
}

#[tokio::test]
async fn test_store_errors_are_reported() {
    let (_dir, path) = seeded_store();
    let executor = SqliteExecutor::new(&path, 100);

    let result = executor
        .execute("SELECT favourite_genre FROM customers LIMIT 100")
        .await;

    match result {
        Err(ExecutionFailure::StoreError(message)) => assert!(message.contains("favourite_genre")),
        other => panic!("expected store error, got {other:?}")
    }
}

#[tokio::test]
async fn test_missing_database_is_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");
    let executor = SqliteExecutor::new(&path, 100);

    let result = executor.execute("SELECT 1").await;

    assert!(matches!(result, Err(ExecutionFailure::StoreError(_))));
    assert!(!path.exists());
    assert_eq!(executor.path(), path.as_path());
}
