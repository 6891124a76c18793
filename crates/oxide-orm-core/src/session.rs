//! Session contract and the configuration every session carries.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::accessor::AccessStrategy;
use crate::dialect::{Dialect, GenericDialect};
use crate::error::Result;
use crate::middleware::Middleware;
use crate::model::Registry;
use crate::row::Row;
use crate::value::SqlValue;

/// A boxed future returned by sessions and middlewares.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Rows returned by [`Session::query`].
pub type Rows = Vec<Box<dyn Row + Send>>;

/// A single row returned by [`Session::query_one`].
pub type BoxRow = Box<dyn Row + Send>;

/// Summary of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Number of rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// Row id of the last inserted row, when the driver reports one.
    pub last_insert_id: i64,
}

/// A database handle or an open transaction.
///
/// Dropping a returned future cancels the statement.
pub trait Session: Send + Sync {
    /// Configuration shared by every statement run on this session.
    fn core(&self) -> &Core;

    /// Runs a statement that returns rows.
    fn query<'a>(&'a self, sql: &'a str, args: &'a [SqlValue]) -> BoxFuture<'a, Result<Rows>>;

    /// Runs a statement and reads only its first row.
    ///
    /// Rows after the first are never fetched. An empty result is
    /// [`OrmError::NoRows`](crate::OrmError::NoRows).
    fn query_one<'a>(&'a self, sql: &'a str, args: &'a [SqlValue])
        -> BoxFuture<'a, Result<BoxRow>>;

    /// Runs a statement that returns no rows.
    fn exec<'a>(&'a self, sql: &'a str, args: &'a [SqlValue])
        -> BoxFuture<'a, Result<ExecResult>>;
}

/// Registry, dialect, access strategy and middleware chain of a session.
#[derive(Clone)]
pub struct Core {
    registry: Arc<Registry>,
    dialect: Arc<dyn Dialect>,
    strategy: AccessStrategy,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            dialect: Arc::new(GenericDialect::new()),
            strategy: AccessStrategy::default(),
            middlewares: Vec::new(),
        }
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("dialect", &self.dialect.name())
            .field("strategy", &self.strategy)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

impl Core {
    /// Creates a configuration with a fresh registry, the generic dialect
    /// and the direct-offset accessor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares an existing registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the SQL dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    /// Sets the field access strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: AccessStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Appends a middleware. The first one added runs outermost.
    #[must_use]
    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Returns the model registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the access strategy.
    #[must_use]
    pub const fn strategy(&self) -> AccessStrategy {
        self.strategy
    }

    /// Returns the middlewares in registration order.
    #[must_use]
    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }
}
