//! Read-only execution of accepted statements.
//!
//! [`SqliteExecutor`] opens a fresh read-only connection for every call,
//! runs the statement on tokio's blocking pool, and drops the connection on
//! every exit path. Statements SQLite does not report as read-only are
//! refused even if they got past the validator.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, types::ValueRef};
use serde_json::Value;

use crate::{
    error::ExecutionFailure,
    types::{QueryResult, Row}
};

/// Runs accepted statements against the relational store
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<QueryResult, ExecutionFailure>;
}

/// Executor backed by a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    path:     PathBuf,
    max_rows: usize
}

impl SqliteExecutor {
    /// Executor over the database at `path` returning at most `max_rows` rows
    pub fn new(path: impl Into<PathBuf>, max_rows: usize) -> Self {
        Self {
            path: path.into(),
            max_rows
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryResult, ExecutionFailure> {
        let path = self.path.clone();
        let sql = sql.to_owned();
        let max_rows = self.max_rows;
        tokio::task::spawn_blocking(move || run_read_only(&path, &sql, max_rows))
            .await
            .map_err(|e| ExecutionFailure::StoreError(format!("executor task failed: {}", e)))?
    }
}

fn run_read_only(path: &Path, sql: &str, max_rows: usize) -> Result<QueryResult, ExecutionFailure> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
    )
    .map_err(store_error)?;
    let mut stmt = conn.prepare(sql).map_err(store_error)?;
    if !stmt.readonly() {
        return Err(ExecutionFailure::StoreError(
            "statement is not read-only".to_string()
        ));
    }
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let mut rows = stmt.query([]).map_err(store_error)?;
    let mut result = QueryResult::new();
    while result.len() < max_rows {
        let Some(row) = rows.next().map_err(store_error)? else {
            break;
        };
        let mut record = Row::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            let value = row.get_ref(idx).map_err(store_error)?;
            record.insert(name.clone(), json_value(value));
        }
        result.push(record);
    }
    Ok(result)
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::from(v),
        ValueRef::Real(v) => serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(v) => Value::String(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::from(v.to_vec())
    }
}

fn store_error(err: rusqlite::Error) -> ExecutionFailure {
    ExecutionFailure::StoreError(err.to_string())
}
