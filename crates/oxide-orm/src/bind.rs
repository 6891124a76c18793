//! Binding statement arguments to sqlx queries.

use oxide_orm_core::SqlValue;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Prepares `sql` with every argument bound in placeholder order.
pub(crate) fn prepare<'q>(
    sql: &'q str,
    args: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    args.iter()
        .cloned()
        .fold(sqlx::query(sql), bind_param)
}

/// Binds a SqlValue parameter to a raw query.
fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}
