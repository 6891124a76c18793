#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use oxide_orm_core::{
    BoxFuture, BoxRow, Core, ExecResult, MemoryRow, OrmError, Query, QueryBuilder, Result, Row,
    Rows, Session, SqlValue,
};
use oxide_orm_derive::Entity;

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

pub fn tom() -> TestModel {
    TestModel {
        id: 1,
        first_name: "Tom".into(),
        age: 18,
        last_name: Some("Smith".into()),
    }
}

pub fn tom_row() -> MemoryRow {
    MemoryRow::new()
        .with("id", SqlValue::Int(1))
        .with("first_name", SqlValue::Text("Tom".into()))
        .with("age", SqlValue::Int(18))
        .with("last_name", SqlValue::Text("Smith".into()))
}

pub fn build(builder: &dyn QueryBuilder) -> Query {
    build_with(&Core::new(), builder)
}

pub fn build_with(core: &Core, builder: &dyn QueryBuilder) -> Query {
    builder
        .build(core)
        .unwrap_or_else(|e| panic!("Failed to build: {e}"))
}

/// A session that records every statement and answers queries with canned
/// rows.
pub struct MockSession {
    core: Core,
    rows: Mutex<Vec<MemoryRow>>,
    log: Arc<Mutex<Vec<Query>>>,
    fetched: AtomicUsize,
}

impl MockSession {
    pub fn new(core: Core) -> Self {
        Self {
            core,
            rows: Mutex::new(Vec::new()),
            log: Arc::new(Mutex::new(Vec::new())),
            fetched: AtomicUsize::new(0),
        }
    }

    pub fn with_rows(self, rows: Vec<MemoryRow>) -> Self {
        *self.rows.lock().unwrap() = rows;
        self
    }

    pub fn log(&self) -> Vec<Query> {
        self.log.lock().unwrap().clone()
    }

    /// Number of rows handed out so far.
    pub fn fetched(&self) -> usize {
        self.fetched.load(Ordering::SeqCst)
    }

    fn record(&self, sql: &str, args: &[SqlValue]) {
        self.log.lock().unwrap().push(Query {
            sql: sql.to_string(),
            args: args.to_vec(),
        });
    }
}

impl Session for MockSession {
    fn core(&self) -> &Core {
        &self.core
    }

    fn query<'a>(&'a self, sql: &'a str, args: &'a [SqlValue]) -> BoxFuture<'a, Result<Rows>> {
        Box::pin(async move {
            self.record(sql, args);
            let rows = self.rows.lock().unwrap().clone();
            self.fetched.fetch_add(rows.len(), Ordering::SeqCst);
            Ok(rows
                .into_iter()
                .map(|row| Box::new(row) as Box<dyn Row + Send>)
                .collect())
        })
    }

    fn query_one<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<BoxRow>> {
        Box::pin(async move {
            self.record(sql, args);
            let row = self.rows.lock().unwrap().first().cloned().ok_or(OrmError::NoRows)?;
            self.fetched.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(row) as BoxRow)
        })
    }

    fn exec<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<ExecResult>> {
        Box::pin(async move {
            self.record(sql, args);
            Ok(ExecResult {
                rows_affected: 1,
                last_insert_id: 0,
            })
        })
    }
}
