//! Interceptors wrapped around statement execution.
//!
//! A middleware receives the [`QueryContext`] and a [`Next`] handle. Calling
//! [`Next::run`] hands the request to the following middleware, or to the
//! terminal handler once the chain is exhausted. `Next` is consumed by the
//! call, so a middleware cannot dispatch the statement twice.
//!
//! # Example
//!
//! ```ignore
//! struct Audit;
//!
//! impl Middleware for Audit {
//!     fn handle<'a>(&'a self, ctx: &'a QueryContext<'a>, next: Next<'a>) -> BoxFuture<'a, QueryResult> {
//!         Box::pin(async move {
//!             let result = next.run(ctx).await;
//!             println!("{} finished: {}", ctx.query_type, result.is_ok());
//!             result
//!         })
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::builder::{Query, QueryBuilder};
use crate::error::{OrmError, Result};
use crate::model::Model;
use crate::session::{BoxFuture, ExecResult, Session};

/// Kind of statement passing through the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
    /// Hand-written SQL.
    Raw,
}

impl QueryType {
    /// Returns the tag used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Raw => "RAW",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of work passed through the chain.
pub struct QueryContext<'a> {
    /// Statement kind.
    pub query_type: QueryType,
    /// The statement, so middlewares can re-derive its SQL.
    pub builder: &'a dyn QueryBuilder,
    /// Model of the entity the statement reads or writes.
    pub model: Arc<Model>,
    /// Session the statement runs on.
    pub session: &'a dyn Session,
}

impl<'a> QueryContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(
        query_type: QueryType,
        builder: &'a dyn QueryBuilder,
        model: Arc<Model>,
        session: &'a dyn Session,
    ) -> Self {
        Self {
            query_type,
            builder,
            model,
            session,
        }
    }

    /// Compiles the statement with the session configuration.
    ///
    /// # Errors
    ///
    /// See [`QueryBuilder::build`].
    pub fn build(&self) -> Result<Query> {
        self.builder.build(self.session.core())
    }
}

/// Successful outcome of a dispatched statement.
pub enum QueryOutput {
    /// A decoded record or list of records.
    Record(Box<dyn Any + Send>),
    /// Execution summary.
    Exec(ExecResult),
}

impl fmt::Debug for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(_) => f.write_str("Record(..)"),
            Self::Exec(res) => f.debug_tuple("Exec").field(res).finish(),
        }
    }
}

impl QueryOutput {
    /// Extracts a decoded value of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnexpectedOutput`] if the output holds something else.
    pub fn into_record<T: 'static>(self) -> Result<T> {
        match self {
            Self::Record(record) => record
                .downcast::<T>()
                .map(|record| *record)
                .map_err(|_| OrmError::UnexpectedOutput(std::any::type_name::<T>())),
            Self::Exec(_) => Err(OrmError::UnexpectedOutput(std::any::type_name::<T>())),
        }
    }

    /// Extracts the execution summary.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnexpectedOutput`] if the output holds records.
    pub fn into_exec(self) -> Result<ExecResult> {
        match self {
            Self::Exec(res) => Ok(res),
            Self::Record(_) => Err(OrmError::UnexpectedOutput("ExecResult")),
        }
    }
}

/// Result flowing back through the chain.
pub type QueryResult = Result<QueryOutput>;

/// An interceptor around statement execution.
pub trait Middleware: Send + Sync {
    /// Handles the request, usually by awaiting `next.run(ctx)` once.
    fn handle<'a>(&'a self, ctx: &'a QueryContext<'a>, next: Next<'a>)
        -> BoxFuture<'a, QueryResult>;
}

/// The terminal handler at the end of the chain.
pub trait Endpoint: Send + Sync {
    /// Compiles and runs the statement.
    fn call<'a>(&'a self, ctx: &'a QueryContext<'a>) -> BoxFuture<'a, QueryResult>;
}

/// The rest of the chain.
pub struct Next<'a> {
    middlewares: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Creates a chain over `middlewares` ending in `endpoint`.
    #[must_use]
    pub fn new(middlewares: &'a [Arc<dyn Middleware>], endpoint: &'a dyn Endpoint) -> Self {
        Self {
            middlewares,
            endpoint,
        }
    }

    /// Runs the next middleware, or the endpoint when none is left.
    pub fn run(self, ctx: &'a QueryContext<'a>) -> BoxFuture<'a, QueryResult> {
        match self.middlewares.split_first() {
            Some((head, rest)) => head.handle(ctx, Next::new(rest, self.endpoint)),
            None => self.endpoint.call(ctx),
        }
    }
}

/// Runs `ctx` through the session's middleware chain into `endpoint`.
pub(crate) fn dispatch<'a>(
    ctx: &'a QueryContext<'a>,
    endpoint: &'a dyn Endpoint,
) -> BoxFuture<'a, QueryResult> {
    Next::new(ctx.session.core().middlewares(), endpoint).run(ctx)
}
