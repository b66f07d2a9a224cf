#![allow(dead_code)]

use std::{
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering}
    }
};

use async_trait::async_trait;
use nl_sql_gateway::{
    error::{ExecutionFailure, TranslationFailure},
    executor::QueryExecutor,
    gateway::Gateway,
    translate::{TextGenerator, Translator},
    types::QueryResult,
    validator::{KeywordFirewall, Policy}
};
use rusqlite::{Connection, params};
use tempfile::TempDir;

pub const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    ("Alice", "alice@example.com", "Fantasy", "2025-03-20"),
    ("Bob", "bob@example.com", "Sci-Fi", "2025-04-05"),
    ("Charlie", "charlie@example.com", "Fantasy", "2025-04-01"),
    ("David", "david@example.com", "Non-fiction", "2025-03-18"),
    ("Eve", "eve@example.com", "Romance", "2025-03-22"),
    ("Frank", "frank@example.com", "Horror", "2025-04-07"),
    ("Grace", "grace@example.com", "Fantasy", "2025-04-10"),
    ("Hannah", "hannah@example.com", "Sci-Fi", "2025-04-12"),
    ("Ivy", "ivy@example.com", "Mystery", "2025-03-29"),
    ("Jack", "jack@example.com", "Fantasy", "2025-04-02")
];

/// Create `customers.db` with the sample rows inside a fresh temp dir
pub fn seeded_store() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.db");
    seed(&path, CUSTOMERS.len());
    (dir, path)
}

/// Seed `count` customers, cycling through the sample rows
pub fn seed(path: &Path, count: usize) {
    let conn = Connection::open(path).unwrap();
    conn.execute(
        "CREATE TABLE customers (
            id INTEGER PRIMARY KEY,
            name TEXT,
            email TEXT,
            favorite_genre TEXT,
            created_at DATE
        )",
        []
    )
    .unwrap();
    for i in 0..count {
        let (name, email, genre, created) = CUSTOMERS[i % CUSTOMERS.len()];
        conn.execute(
            "INSERT INTO customers (name, email, favorite_genre, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, email, genre, created]
        )
        .unwrap();
    }
}

/// Generator that replays a fixed reply and records its inputs
pub struct StubGenerator {
    reply: Result<String, TranslationFailure>,
    pub calls: Mutex<Vec<(String, String)>>
}

impl StubGenerator {
    pub fn replying(output: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(output.to_string()),
            calls: Mutex::new(Vec::new())
        })
    }

    pub fn failing(failure: TranslationFailure) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(failure),
            calls: Mutex::new(Vec::new())
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, instructions: &str, input: &str) -> Result<String, TranslationFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((instructions.to_string(), input.to_string()));
        self.reply.clone()
    }
}

/// Executor wrapper that counts calls and records the statements it ran
pub struct CountingExecutor<E> {
    inner:     E,
    calls:     AtomicUsize,
    pub seen:  Mutex<Vec<String>>
}

impl<E> CountingExecutor<E> {
    pub fn new(inner: E) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new())
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E: QueryExecutor> QueryExecutor for CountingExecutor<E> {
    async fn execute(&self, sql: &str) -> Result<QueryResult, ExecutionFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(sql.to_string());
        self.inner.execute(sql).await
    }
}

/// Executor that always fails like a broken store
pub struct BrokenStore;

#[async_trait]
impl QueryExecutor for BrokenStore {
    async fn execute(&self, _sql: &str) -> Result<QueryResult, ExecutionFailure> {
        Err(ExecutionFailure::StoreError(
            "no such column: favourite_genre".to_string()
        ))
    }
}

pub fn gateway(generator: Arc<StubGenerator>, executor: Arc<dyn QueryExecutor>) -> Gateway {
    let policy = Policy::default();
    Gateway::new(
        Translator::for_policy(generator, &policy),
        Arc::new(KeywordFirewall::new(policy)),
        executor
    )
}
