//! Tests for dispatching statements through a session and the middleware
//! chain.

mod common;

use std::sync::{Arc, Mutex};

use common::{tom, tom_row, MockSession, TestModel};
use oxide_orm_core::builder::{c, Deleter, Inserter, RawQuery, Selector, Updater};
use oxide_orm_core::{
    BoxFuture, Core, MemoryRow, Middleware, Next, OrmError, QueryContext, QueryOutput,
    QueryResult, QueryType, SqlValue,
};

/// Records `name:before` and `name:after` around the rest of the chain.
struct Trace {
    name: &'static str,
    events: Arc<Mutex<Vec<String>>>,
}

impl Middleware for Trace {
    fn handle<'a>(
        &'a self,
        ctx: &'a QueryContext<'a>,
        next: Next<'a>,
    ) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:before:{}", self.name, ctx.query_type));
            let result = next.run(ctx).await;
            self.events.lock().unwrap().push(format!("{}:after", self.name));
            result
        })
    }
}

/// Answers every SELECT with a fixed record without touching the session.
struct Canned;

impl Middleware for Canned {
    fn handle<'a>(
        &'a self,
        ctx: &'a QueryContext<'a>,
        next: Next<'a>,
    ) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            if ctx.query_type == QueryType::Select {
                let mut record = tom();
                record.first_name = "Cached".into();
                return Ok(QueryOutput::Record(Box::new(record)));
            }
            next.run(ctx).await
        })
    }
}

/// Captures the SQL each statement compiles to.
struct Capture(Arc<Mutex<Vec<String>>>);

impl Middleware for Capture {
    fn handle<'a>(
        &'a self,
        ctx: &'a QueryContext<'a>,
        next: Next<'a>,
    ) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            let query = ctx.build()?;
            self.0.lock().unwrap().push(query.sql);
            assert_eq!(ctx.model.table_name(), "test_model");
            next.run(ctx).await
        })
    }
}

// =============================================================================
// Test: Executors
// =============================================================================

#[tokio::test]
async fn test_get_decodes_first_row() {
    let session = MockSession::new(Core::new()).with_rows(vec![tom_row(), tom_row()]);
    let record = Selector::<TestModel>::new()
        .where_clause(c("age").eq(18))
        .get(&session)
        .await
        .unwrap();
    assert_eq!(record, tom());

    let log = session.log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].sql, "SELECT * FROM test_model WHERE age=?;");
    assert_eq!(log[0].args, vec![SqlValue::Int(18)]);
}

#[tokio::test]
async fn test_get_fetches_only_first_row() {
    let rows = (0..1000)
        .map(|id| {
            MemoryRow::new()
                .with("id", SqlValue::Int(id))
                .with("first_name", SqlValue::Text("Tom".into()))
        })
        .collect::<Vec<_>>();
    let session = MockSession::new(Core::new()).with_rows(rows);
    let first = Selector::<TestModel>::new().get(&session).await.unwrap();
    assert_eq!(first.id, 0);
    assert_eq!(session.fetched(), 1);

    RawQuery::<TestModel>::new("SELECT * FROM test_model")
        .get(&session)
        .await
        .unwrap();
    assert_eq!(session.fetched(), 2);

    Selector::<TestModel>::new().get_multi(&session).await.unwrap();
    assert_eq!(session.fetched(), 1002);
}

#[tokio::test]
async fn test_get_without_rows() {
    let session = MockSession::new(Core::new());
    let err = Selector::<TestModel>::new().get(&session).await.unwrap_err();
    assert!(matches!(err, OrmError::NoRows));
}

#[tokio::test]
async fn test_get_multi() {
    let jerry = MemoryRow::new()
        .with("id", SqlValue::Int(2))
        .with("first_name", SqlValue::Text("Jerry".into()));
    let session = MockSession::new(Core::new()).with_rows(vec![tom_row(), jerry]);
    let records = Selector::<TestModel>::new().get_multi(&session).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], tom());
    assert_eq!(records[1].first_name, "Jerry");
}

#[tokio::test]
async fn test_get_multi_without_rows() {
    let session = MockSession::new(Core::new());
    let err = Selector::<TestModel>::new()
        .get_multi(&session)
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::NoRows));
}

#[tokio::test]
async fn test_build_error_skips_session() {
    let session = MockSession::new(Core::new());
    let err = Selector::<TestModel>::new()
        .order_by(c("age"))
        .get(&session)
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::NoOrderByDirection));
    assert!(session.log().is_empty());
}

#[tokio::test]
async fn test_exec_statements() {
    let session = MockSession::new(Core::new());
    let res = Inserter::new().value(tom()).exec(&session).await.unwrap();
    assert_eq!(res.rows_affected, 1);
    Updater::new()
        .value(tom())
        .updates([c("age")])
        .where_clause(c("id").eq(1))
        .exec(&session)
        .await
        .unwrap();
    Deleter::<TestModel>::new()
        .where_clause(c("id").eq(1))
        .exec(&session)
        .await
        .unwrap();

    let sql: Vec<String> = session.log().into_iter().map(|q| q.sql).collect();
    assert_eq!(
        sql,
        [
            "INSERT INTO test_model (id,first_name,age,last_name) VALUES (?,?,?,?);",
            "UPDATE test_model SET age=? WHERE id=?;",
            "DELETE FROM test_model WHERE id=?;",
        ]
    );
}

#[tokio::test]
async fn test_raw_query() {
    let session = MockSession::new(Core::new()).with_rows(vec![tom_row()]);
    let record = RawQuery::<TestModel>::new("SELECT * FROM test_model WHERE id = ?")
        .arg(1)
        .get(&session)
        .await
        .unwrap();
    assert_eq!(record, tom());
    assert_eq!(session.log()[0].sql, "SELECT * FROM test_model WHERE id = ?");
}

#[derive(Debug, Default, PartialEq, oxide_orm_derive::Entity)]
struct AgeCount {
    age: i64,
    total: i64,
}

#[tokio::test]
async fn test_scan_into_other_entity() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let core = Core::new().with_middleware(Trace {
        name: "trace",
        events: Arc::clone(&events),
    });
    let row = MemoryRow::new()
        .with("age", SqlValue::Int(18))
        .with("total", SqlValue::Int(3));
    let session = MockSession::new(core).with_rows(vec![row]);

    let counts: Vec<AgeCount> = Selector::<TestModel>::new()
        .select([
            oxide_orm_core::builder::Expr::from(c("age")),
            oxide_orm_core::builder::count(c("id")).as_("total").into(),
        ])
        .group_by([c("age")])
        .scan(&session)
        .await
        .unwrap();
    assert_eq!(counts, [AgeCount { age: 18, total: 3 }]);
    assert!(events.lock().unwrap().is_empty());
}

// =============================================================================
// Test: Middleware chain
// =============================================================================

#[tokio::test]
async fn test_middlewares_run_in_registration_order() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let core = Core::new()
        .with_middleware(Trace {
            name: "outer",
            events: Arc::clone(&events),
        })
        .with_middleware(Trace {
            name: "inner",
            events: Arc::clone(&events),
        });
    let session = MockSession::new(core).with_rows(vec![tom_row()]);
    Selector::<TestModel>::new().get(&session).await.unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        [
            "outer:before:SELECT",
            "inner:before:SELECT",
            "inner:after",
            "outer:after",
        ]
    );
}

#[tokio::test]
async fn test_middleware_sees_query_type() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let core = Core::new().with_middleware(Trace {
        name: "t",
        events: Arc::clone(&events),
    });
    let session = MockSession::new(core);
    Inserter::new().value(tom()).exec(&session).await.unwrap();
    Deleter::<TestModel>::new().exec(&session).await.unwrap();
    RawQuery::<TestModel>::new("DELETE FROM test_model")
        .exec(&session)
        .await
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events[0], "t:before:INSERT");
    assert_eq!(events[2], "t:before:DELETE");
    assert_eq!(events[4], "t:before:RAW");
}

#[tokio::test]
async fn test_middleware_short_circuit() {
    let session = MockSession::new(Core::new().with_middleware(Canned)).with_rows(vec![tom_row()]);
    let record = Selector::<TestModel>::new().get(&session).await.unwrap();
    assert_eq!(record.first_name, "Cached");
    assert!(session.log().is_empty());

    Deleter::<TestModel>::new().exec(&session).await.unwrap();
    assert_eq!(session.log().len(), 1);
}

#[tokio::test]
async fn test_middleware_output_of_wrong_type() {
    let session = MockSession::new(Core::new().with_middleware(Canned));
    let err = Selector::<TestModel>::new()
        .get_multi(&session)
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::UnexpectedOutput(_)));
}

#[tokio::test]
async fn test_middleware_builds_statement() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let core = Core::new().with_middleware(Capture(Arc::clone(&captured)));
    let session = MockSession::new(core).with_rows(vec![tom_row()]);
    Selector::<TestModel>::new()
        .where_clause(c("id").eq(1))
        .get(&session)
        .await
        .unwrap();
    assert_eq!(
        *captured.lock().unwrap(),
        ["SELECT * FROM test_model WHERE id=?;"]
    );
}
