#![allow(dead_code)]

use oxide_orm::{DbOptions, Entity, DB};
use sqlx::sqlite::SqlitePoolOptions;

const SCHEMA: &[&str] = &[
    "CREATE TABLE test_model (
        id INTEGER PRIMARY KEY,
        first_name TEXT NOT NULL,
        age INTEGER NOT NULL,
        last_name TEXT
    )",
    "CREATE TABLE pet (
        id INTEGER PRIMARY KEY,
        owner_id INTEGER NOT NULL,
        name TEXT NOT NULL
    )",
    "CREATE TABLE gadget (
        id INTEGER PRIMARY KEY,
        active BOOLEAN NOT NULL,
        price REAL NOT NULL,
        payload BLOB NOT NULL
    )",
];

#[derive(Debug, Clone, Default, PartialEq, Entity)]
pub struct TestModel {
    pub id: i64,
    pub first_name: String,
    pub age: i8,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
pub struct Pet {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
pub struct Gadget {
    pub id: i64,
    pub active: bool,
    pub price: f64,
    pub payload: Vec<u8>,
}

pub fn person(id: i64, first_name: &str, age: i8) -> TestModel {
    TestModel {
        id,
        first_name: first_name.into(),
        age,
        last_name: None,
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Opens a single-connection in-memory database with the test schema.
pub async fn setup(options: DbOptions) -> DB {
    init_tracing();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap_or_else(|e| panic!("Failed to open database: {e}"));
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to create schema: {e}"));
    }
    DB::from_pool(pool, options)
}
