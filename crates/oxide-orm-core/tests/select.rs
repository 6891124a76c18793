//! Tests for SELECT compilation: predicates, tables, joins, subqueries,
//! grouping and ordering.

mod common;

use common::{build, build_with, Pet, TestModel};
use oxide_orm_core::builder::{c, count, max, not, raw, Expr, Selector, Table};
use oxide_orm_core::{Core, OrmError, QueryBuilder, SqlValue};

fn build_err(selector: &Selector<TestModel>) -> OrmError {
    selector
        .build(&Core::new())
        .expect_err("Expected a build error")
}

// =============================================================================
// Test: Basic statements and predicates
// =============================================================================

#[test]
fn test_select_all() {
    let query = build(&Selector::<TestModel>::new());
    assert_eq!(query.sql, "SELECT * FROM test_model;");
    assert!(query.args.is_empty());
}

#[test]
fn test_select_columns() {
    let query = build(&Selector::<TestModel>::new().select([c("id"), c("first_name")]));
    assert_eq!(query.sql, "SELECT id,first_name FROM test_model;");
}

#[test]
fn test_select_column_alias() {
    let query = build(&Selector::<TestModel>::new().select([c("first_name").as_("name")]));
    assert_eq!(query.sql, "SELECT first_name AS name FROM test_model;");
}

#[test]
fn test_where_single_predicate() {
    let query = build(&Selector::<TestModel>::new().where_clause(c("age").eq(18)));
    assert_eq!(query.sql, "SELECT * FROM test_model WHERE age=?;");
    assert_eq!(query.args, vec![SqlValue::Int(18)]);
}

#[test]
fn test_where_and() {
    let query = build(
        &Selector::<TestModel>::new().where_clause(c("age").eq(18).and(c("first_name").eq("Tom"))),
    );
    assert_eq!(
        query.sql,
        "SELECT * FROM test_model WHERE (age=?) AND (first_name=?);"
    );
    assert_eq!(
        query.args,
        vec![SqlValue::Int(18), SqlValue::Text("Tom".into())]
    );
}

#[test]
fn test_repeated_where_is_and() {
    let query = build(
        &Selector::<TestModel>::new()
            .where_clause(c("age").eq(18))
            .where_clause(c("first_name").eq("Tom")),
    );
    assert_eq!(
        query.sql,
        "SELECT * FROM test_model WHERE (age=?) AND (first_name=?);"
    );
}

#[test]
fn test_where_or_and_comparisons() {
    let query = build(
        &Selector::<TestModel>::new().where_clause(c("age").gt(18).or(c("age").lt(10))),
    );
    assert_eq!(query.sql, "SELECT * FROM test_model WHERE (age>?) OR (age<?);");
    assert_eq!(query.args, vec![SqlValue::Int(18), SqlValue::Int(10)]);
}

#[test]
fn test_where_not() {
    let query = build(&Selector::<TestModel>::new().where_clause(not(c("age").eq(18))));
    assert_eq!(query.sql, "SELECT * FROM test_model WHERE  NOT (age=?);");
}

#[test]
fn test_where_column_to_column() {
    let query = build(&Selector::<TestModel>::new().where_clause(c("id").eq(c("age"))));
    assert_eq!(query.sql, "SELECT * FROM test_model WHERE id=age;");
    assert!(query.args.is_empty());
}

#[test]
fn test_where_null_value() {
    let query = build(
        &Selector::<TestModel>::new().where_clause(c("last_name").eq(Option::<String>::None)),
    );
    assert_eq!(query.args, vec![SqlValue::Null]);
}

#[test]
fn test_alias_is_dropped_in_predicates() {
    let query = build(&Selector::<TestModel>::new().where_clause(c("age").as_("years").eq(18)));
    assert_eq!(query.sql, "SELECT * FROM test_model WHERE age=?;");
}

#[test]
fn test_tagged_column_name_is_used() {
    let core = Core::new();
    core.registry()
        .register::<TestModel>(&[oxide_orm_core::ModelOption::ColumnName {
            field: "first_name".into(),
            column: "fname".into(),
        }])
        .unwrap();
    let query = build_with(
        &core,
        &Selector::<TestModel>::new()
            .select([c("first_name")])
            .where_clause(c("first_name").eq("Tom")),
    );
    assert_eq!(query.sql, "SELECT fname FROM test_model WHERE fname=?;");
}

// =============================================================================
// Test: Raw fragments
// =============================================================================

#[test]
fn test_raw_predicate() {
    let query = build(
        &Selector::<TestModel>::new().where_clause(raw("age > ? AND age < ?").arg(10).arg(20).as_predicate()),
    );
    assert_eq!(query.sql, "SELECT * FROM test_model WHERE (age > ? AND age < ?);");
    assert_eq!(query.args, vec![SqlValue::Int(10), SqlValue::Int(20)]);
}

#[test]
fn test_raw_select_item() {
    let query = build(&Selector::<TestModel>::new().select([raw("COUNT(*) AS n")]));
    assert_eq!(query.sql, "SELECT COUNT(*) AS n FROM test_model;");
}

#[test]
fn test_raw_combined_with_column_predicate() {
    let query = build(
        &Selector::<TestModel>::new()
            .where_clause(c("age").eq(18).and(raw("first_name LIKE ?").arg("T%").as_predicate())),
    );
    assert_eq!(
        query.sql,
        "SELECT * FROM test_model WHERE (age=?) AND ((first_name LIKE ?));"
    );
    assert_eq!(
        query.args,
        vec![SqlValue::Int(18), SqlValue::Text("T%".into())]
    );
}

// =============================================================================
// Test: Aggregates, grouping and ordering
// =============================================================================

#[test]
fn test_group_by_having() {
    let query = build(
        &Selector::<TestModel>::new()
            .select([Expr::from(c("age")), count(c("id")).as_("total").into()])
            .group_by([c("age")])
            .having(count(c("id")).gt(1)),
    );
    assert_eq!(
        query.sql,
        "SELECT age,COUNT(id) AS total FROM test_model GROUP BY age HAVING COUNT(id)>?;"
    );
    assert_eq!(query.args, vec![SqlValue::Int(1)]);
}

#[test]
fn test_aggregate_over_joined_table() {
    let person = Table::of::<TestModel>().as_("p");
    let pet = Table::of::<Pet>().as_("t");
    let query = build(
        &Selector::<TestModel>::new()
            .select([
                Expr::from(person.c("first_name")),
                count(pet.c("id")).as_("pets").into(),
            ])
            .from(
                person
                    .clone()
                    .join(pet.clone())
                    .on([person.c("id").eq(pet.c("owner_id"))]),
            )
            .group_by([person.c("first_name")])
            .having(count(pet.c("id")).gt(1)),
    );
    assert_eq!(
        query.sql,
        "SELECT p.first_name,COUNT(t.id) AS pets FROM (test_model AS p JOIN pet AS t ON p.id=t.owner_id) GROUP BY p.first_name HAVING COUNT(t.id)>?;"
    );
    assert_eq!(query.args, vec![SqlValue::Int(1)]);
}

#[test]
fn test_having_without_group_by() {
    let err = build_err(&Selector::<TestModel>::new().having(max(c("age")).gt(1)));
    assert!(matches!(err, OrmError::NoGroupUseHaving));
}

#[test]
fn test_order_by() {
    let query = build(
        &Selector::<TestModel>::new()
            .order_by(c("age").desc())
            .order_by(c("id").asc()),
    );
    assert_eq!(query.sql, "SELECT * FROM test_model ORDER BY age DESC,id ASC;");
}

#[test]
fn test_order_by_without_direction() {
    let err = build_err(&Selector::<TestModel>::new().order_by(c("age")));
    assert!(matches!(err, OrmError::NoOrderByDirection));
}

#[test]
fn test_full_clause_order() {
    let query = build(
        &Selector::<TestModel>::new()
            .select([Expr::from(c("age")), count(c("id")).into()])
            .where_clause(c("id").gt(0))
            .group_by([c("age")])
            .having(count(c("id")).gt(1))
            .order_by(c("age").asc())
            .limit(10),
    );
    assert_eq!(
        query.sql,
        "SELECT age,COUNT(id) FROM test_model WHERE id>? GROUP BY age HAVING COUNT(id)>? ORDER BY age ASC LIMIT 10;"
    );
    assert_eq!(query.args, vec![SqlValue::Int(0), SqlValue::Int(1)]);
}

// =============================================================================
// Test: Tables, joins and subqueries
// =============================================================================

#[test]
fn test_from_aliased_table() {
    let person = Table::of::<TestModel>().as_("p");
    let query = build(
        &Selector::<TestModel>::new()
            .select([person.c("first_name")])
            .from(person.clone())
            .where_clause(person.c("age").eq(18)),
    );
    assert_eq!(
        query.sql,
        "SELECT p.first_name FROM test_model AS p WHERE p.age=?;"
    );
}

#[test]
fn test_join_on() {
    let person = Table::of::<TestModel>().as_("p");
    let pet = Table::of::<Pet>().as_("t");
    let query = build(
        &Selector::<TestModel>::new()
            .select([person.c("first_name"), pet.c("name").as_("pet_name")])
            .from(
                person
                    .clone()
                    .join(pet.clone())
                    .on([person.c("id").eq(pet.c("owner_id"))]),
            ),
    );
    assert_eq!(
        query.sql,
        "SELECT p.first_name,t.name AS pet_name FROM (test_model AS p JOIN pet AS t ON p.id=t.owner_id);"
    );
}

#[test]
fn test_unaliased_table_column_uses_table_name() {
    let pet = Table::of::<Pet>();
    let query = build(
        &Selector::<TestModel>::new()
            .from(Table::of::<TestModel>().left_join(pet.clone()).on([
                c("id").eq(pet.c("owner_id")),
                pet.c("name").eq("Rex"),
            ])),
    );
    assert_eq!(
        query.sql,
        "SELECT * FROM (test_model LEFT JOIN pet ON (id=pet.owner_id) AND (pet.name=?));"
    );
    assert_eq!(query.args, vec![SqlValue::Text("Rex".into())]);
}

#[test]
fn test_join_using() {
    let query = build(
        &Selector::<TestModel>::new().from(
            Table::of::<TestModel>()
                .right_join(Table::of::<Pet>())
                .using(["id"]),
        ),
    );
    assert_eq!(
        query.sql,
        "SELECT * FROM (test_model RIGHT JOIN pet USING (id));"
    );
}

#[test]
fn test_nested_join() {
    let pets = Table::of::<Pet>().as_("a");
    let others = Table::of::<Pet>().as_("b");
    let query = build(
        &Selector::<TestModel>::new().from(
            Table::of::<TestModel>()
                .join(pets.clone())
                .using(["id"])
                .join(others.clone())
                .on([pets.c("name").eq(others.c("name"))]),
        ),
    );
    assert_eq!(
        query.sql,
        "SELECT * FROM ((test_model JOIN pet AS a USING (id)) JOIN pet AS b ON a.name=b.name);"
    );
}

#[test]
fn test_subquery_arguments_precede_outer_arguments() {
    let adults = Selector::<TestModel>::new()
        .where_clause(c("age").gt(18))
        .as_subquery("adults");
    let query = build(
        &Selector::<TestModel>::new()
            .from(adults)
            .where_clause(c("first_name").eq("Tom")),
    );
    assert_eq!(
        query.sql,
        "SELECT * FROM (SELECT * FROM test_model WHERE age>?) AS adults WHERE first_name=?;"
    );
    assert_eq!(
        query.args,
        vec![SqlValue::Int(18), SqlValue::Text("Tom".into())]
    );
}

#[test]
fn test_subquery_column_is_unsupported() {
    let adults = Selector::<TestModel>::new().as_subquery("adults");
    let err = build_err(
        &Selector::<TestModel>::new()
            .from(adults.clone())
            .where_clause(adults.c("age").eq(18)),
    );
    assert!(matches!(err, OrmError::UnsupportedTable(_)));
}

// =============================================================================
// Test: Errors
// =============================================================================

#[test]
fn test_unknown_field() {
    let err = build_err(&Selector::<TestModel>::new().where_clause(c("missing").eq(1)));
    assert!(matches!(err, OrmError::UnknownField(name) if name == "missing"));
}

#[test]
fn test_value_in_select_list() {
    let err = build_err(&Selector::<TestModel>::new().select([Expr::from(SqlValue::Int(1))]));
    assert!(matches!(err, OrmError::UnsupportedExpression(_)));
}

#[test]
fn test_predicate_in_select_list() {
    let err = build_err(&Selector::<TestModel>::new().select([Expr::from(c("age").eq(1))]));
    assert!(matches!(err, OrmError::UnsupportedExpression(_)));
}
