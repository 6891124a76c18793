//! Terminal handlers: compile, run on the session, decode.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::builder::QueryBuilder;
use crate::error::OrmError;
use crate::middleware::{dispatch, Endpoint, QueryContext, QueryOutput, QueryResult, QueryType};
use crate::model::{Entity, Model};
use crate::session::{BoxFuture, Session};

/// Wraps a statement in a context and runs it through the session's chain.
pub(crate) async fn execute(
    session: &dyn Session,
    query_type: QueryType,
    builder: &dyn QueryBuilder,
    model: Arc<Model>,
    endpoint: &dyn Endpoint,
) -> QueryResult {
    let ctx = QueryContext::new(query_type, builder, model, session);
    dispatch(&ctx, endpoint).await
}

/// Decodes the first row into a `T`, fetching nothing past it.
pub(crate) struct GetOne<T>(PhantomData<fn() -> T>);

impl<T> GetOne<T> {
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Entity + Default> Endpoint for GetOne<T> {
    fn call<'a>(&'a self, ctx: &'a QueryContext<'a>) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            let core = ctx.session.core();
            let query = ctx.build()?;
            let row = ctx.session.query_one(&query.sql, &query.args).await?;
            let record: T = core.strategy().decode(&ctx.model, row.as_ref())?;
            Ok(QueryOutput::Record(Box::new(record)))
        })
    }
}

/// Decodes every row into a `Vec<T>`; an empty result is [`OrmError::NoRows`].
pub(crate) struct GetMulti<T>(PhantomData<fn() -> T>);

impl<T> GetMulti<T> {
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Entity + Default> Endpoint for GetMulti<T> {
    fn call<'a>(&'a self, ctx: &'a QueryContext<'a>) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            let core = ctx.session.core();
            let query = ctx.build()?;
            let rows = ctx.session.query(&query.sql, &query.args).await?;
            if rows.is_empty() {
                return Err(OrmError::NoRows);
            }
            let records = rows
                .iter()
                .map(|row| core.strategy().decode::<T>(&ctx.model, row.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(QueryOutput::Record(Box::new(records)))
        })
    }
}

/// Runs a statement that returns no rows.
pub(crate) struct Exec;

impl Endpoint for Exec {
    fn call<'a>(&'a self, ctx: &'a QueryContext<'a>) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            let query = ctx.build()?;
            let res = ctx.session.exec(&query.sql, &query.args).await?;
            Ok(QueryOutput::Exec(res))
        })
    }
}
