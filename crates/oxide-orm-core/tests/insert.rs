//! Tests for INSERT compilation and dialect-specific upserts.

mod common;

use common::{build, build_with, tom, TestModel};
use oxide_orm_core::builder::{assign, c, Assignable, Inserter};
use oxide_orm_core::{AccessStrategy, Core, MySqlDialect, OrmError, QueryBuilder, SqlValue, SqliteDialect};

fn tom_args() -> Vec<SqlValue> {
    vec![
        SqlValue::Int(1),
        SqlValue::Text("Tom".into()),
        SqlValue::Int(18),
        SqlValue::Text("Smith".into()),
    ]
}

// =============================================================================
// Test: Plain inserts
// =============================================================================

#[test]
fn test_insert_one() {
    let query = build(&Inserter::new().value(tom()));
    assert_eq!(
        query.sql,
        "INSERT INTO test_model (id,first_name,age,last_name) VALUES (?,?,?,?);"
    );
    assert_eq!(query.args, tom_args());
}

#[test]
fn test_insert_many() {
    let jerry = TestModel {
        id: 2,
        first_name: "Jerry".into(),
        age: 7,
        last_name: None,
    };
    let query = build(&Inserter::new().values([tom(), jerry]));
    assert_eq!(
        query.sql,
        "INSERT INTO test_model (id,first_name,age,last_name) VALUES (?,?,?,?),(?,?,?,?);"
    );
    assert_eq!(query.args.len(), 8);
    assert_eq!(query.args[7], SqlValue::Null);
}

#[test]
fn test_insert_selected_columns() {
    let query = build(&Inserter::new().columns(["first_name", "age"]).value(tom()));
    assert_eq!(
        query.sql,
        "INSERT INTO test_model (first_name,age) VALUES (?,?);"
    );
    assert_eq!(
        query.args,
        vec![SqlValue::Text("Tom".into()), SqlValue::Int(18)]
    );
}

#[test]
fn test_insert_strategies_agree() {
    let reflect = build_with(
        &Core::new().with_strategy(AccessStrategy::Reflect),
        &Inserter::new().value(tom()),
    );
    let offset = build_with(
        &Core::new().with_strategy(AccessStrategy::Unsafe),
        &Inserter::new().value(tom()),
    );
    assert_eq!(reflect, offset);
}

#[test]
fn test_insert_zero_rows() {
    let err = Inserter::<TestModel>::new()
        .build(&Core::new())
        .expect_err("Expected InsertZeroRows");
    assert!(matches!(err, OrmError::InsertZeroRows));
}

#[test]
fn test_insert_unknown_column() {
    let err = Inserter::new()
        .columns(["nickname"])
        .value(tom())
        .build(&Core::new())
        .expect_err("Expected UnknownField");
    assert!(matches!(err, OrmError::UnknownField(name) if name == "nickname"));
}

// =============================================================================
// Test: Upserts
// =============================================================================

#[test]
fn test_upsert_mysql() {
    let core = Core::new().with_dialect(MySqlDialect::new());
    let query = build_with(
        &core,
        &Inserter::new()
            .value(tom())
            .upsert()
            .conflict_columns(["id"])
            .update([c("age"), c("first_name")]),
    );
    assert_eq!(
        query.sql,
        "INSERT INTO test_model (id,first_name,age,last_name) VALUES (?,?,?,?) ON DUPLICATE KEY UPDATE age=VALUES(age),first_name=VALUES(first_name);"
    );
    assert_eq!(query.args, tom_args());
}

#[test]
fn test_upsert_generic() {
    let query = build(
        &Inserter::new()
            .value(tom())
            .upsert()
            .conflict_columns(["id"])
            .update([c("age"), c("first_name")]),
    );
    assert_eq!(
        query.sql,
        "INSERT INTO test_model (id,first_name,age,last_name) VALUES (?,?,?,?) ON CONFLICT(id) DO UPDATE SET age=excluded.age,first_name=excluded.first_name;"
    );
}

#[test]
fn test_upsert_sqlite_matches_generic() {
    let insert = || {
        Inserter::new()
            .value(tom())
            .upsert()
            .conflict_columns(["id"])
            .update([c("age")])
    };
    let sqlite = build_with(&Core::new().with_dialect(SqliteDialect::new()), &insert());
    assert_eq!(sqlite, build(&insert()));
}

#[test]
fn test_upsert_literal_assignment() {
    let query = build(
        &Inserter::new()
            .value(tom())
            .upsert()
            .conflict_columns(["id"])
            .update([Assignable::from(assign("age", 30)), c("first_name").into()]),
    );
    assert_eq!(
        query.sql,
        "INSERT INTO test_model (id,first_name,age,last_name) VALUES (?,?,?,?) ON CONFLICT(id) DO UPDATE SET age=?,first_name=excluded.first_name;"
    );
    let mut args = tom_args();
    args.push(SqlValue::Int(30));
    assert_eq!(query.args, args);
}

#[test]
fn test_upsert_mysql_literal_assignment() {
    let core = Core::new().with_dialect(MySqlDialect::new());
    let query = build_with(
        &core,
        &Inserter::new()
            .value(tom())
            .upsert()
            .update([assign("first_name", "Thomas")]),
    );
    assert_eq!(
        query.sql,
        "INSERT INTO test_model (id,first_name,age,last_name) VALUES (?,?,?,?) ON DUPLICATE KEY UPDATE first_name=?;"
    );
    assert_eq!(query.args[4], SqlValue::Text("Thomas".into()));
}

#[test]
fn test_upsert_ordered_column_is_unsupported() {
    let err = Inserter::new()
        .value(tom())
        .upsert()
        .conflict_columns(["id"])
        .update([c("age").desc()])
        .build(&Core::new())
        .expect_err("Expected UnsupportedAssignable");
    assert!(matches!(err, OrmError::UnsupportedAssignable(_)));
}

#[test]
fn test_upsert_unknown_conflict_column() {
    let err = Inserter::new()
        .value(tom())
        .upsert()
        .conflict_columns(["nickname"])
        .update([c("age")])
        .build(&Core::new())
        .expect_err("Expected UnknownField");
    assert!(matches!(err, OrmError::UnknownField(_)));
}
