//! Database handle, connection options and the transaction closure.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use oxide_orm_core::{
    AccessStrategy, BoxFuture, BoxRow, Core, Dialect, ExecResult, Middleware, OrmError, Registry,
    Result, Rows, Session, SqlValue, SqliteDialect,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

use crate::bind::prepare;
use crate::row::{first_row, into_rows};
use crate::tx::Tx;

/// Options applied when a [`DB`] is created.
///
/// ```ignore
/// let options = DbOptions::new()
///     .max_connections(4)
///     .strategy(AccessStrategy::Reflect)
///     .middleware(QueryLog::new());
/// let db = DB::open_with("sqlite::memory:", options).await?;
/// ```
#[derive(Clone)]
pub struct DbOptions {
    core: Core,
    max_connections: u32,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            core: Core::new().with_dialect(SqliteDialect::new()),
            max_connections: 5,
        }
    }
}

impl fmt::Debug for DbOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbOptions")
            .field("core", &self.core)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DbOptions {
    /// SQLite dialect, direct-offset access, no middleware, five connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the SQL dialect.
    #[must_use]
    pub fn dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.core = self.core.with_dialect(dialect);
        self
    }

    /// Sets the field access strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: AccessStrategy) -> Self {
        self.core = self.core.with_strategy(strategy);
        self
    }

    /// Shares a model registry with other handles.
    #[must_use]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.core = self.core.with_registry(registry);
        self
    }

    /// Appends a middleware. The first one added runs outermost.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.core = self.core.with_middleware(middleware);
        self
    }

    /// Sets the pool size used by [`DB::open_with`].
    #[must_use]
    pub const fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

/// A pooled SQLite database.
///
/// Cloning is cheap; clones share the pool and the configuration.
#[derive(Clone)]
pub struct DB {
    pool: SqlitePool,
    core: Arc<Core>,
}

impl fmt::Debug for DB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DB").field("core", &self.core).finish_non_exhaustive()
    }
}

impl DB {
    /// Connects with default options.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the pool cannot connect.
    pub async fn open(url: &str) -> Result<Self> {
        Self::open_with(url, DbOptions::default()).await
    }

    /// Connects with the given options.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the pool cannot connect.
    pub async fn open_with(url: &str, options: DbOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .connect(url)
            .await
            .map_err(OrmError::database)?;
        info!(url, max_connections = options.max_connections, "database opened");
        Ok(Self::from_pool(pool, options))
    }

    /// Wraps an existing pool. `max_connections` is ignored.
    #[must_use]
    pub fn from_pool(pool: SqlitePool, options: DbOptions) -> Self {
        Self {
            pool,
            core: Arc::new(options.core),
        }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if no connection is available.
    pub async fn begin(&self) -> Result<Tx> {
        let tx = self.pool.begin().await.map_err(OrmError::database)?;
        debug!("transaction started");
        Ok(Tx::new(tx, Arc::clone(&self.core)))
    }

    /// Runs `f` in a transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err` or panics. A panic is returned as
    /// [`OrmError::Panicked`]; if the rollback fails as well, both errors are
    /// returned in [`OrmError::FailedToRollback`].
    ///
    /// ```ignore
    /// let id = db
    ///     .do_tx(|tx| Box::pin(async move {
    ///         let res = Inserter::new().value(user).exec(tx).await?;
    ///         Ok(res.last_insert_id)
    ///     }))
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the closure's error, the panic, or the commit/rollback error.
    pub async fn do_tx<T, F>(&self, f: F) -> Result<T>
    where
        F: for<'t> FnOnce(&'t Tx) -> BoxFuture<'t, Result<T>>,
    {
        let tx = self.begin().await?;
        let outcome = AssertUnwindSafe(async { f(&tx).await }).catch_unwind().await;

        let (business, panicked) = match outcome {
            Ok(Ok(value)) => {
                tx.commit().await?;
                return Ok(value);
            }
            Ok(Err(err)) => (err, false),
            Err(payload) => (OrmError::Panicked(panic_message(payload.as_ref())), true),
        };

        match tx.rollback().await {
            Ok(()) => Err(business),
            Err(rollback) => {
                warn!(error = %rollback, panicked, "rollback after failed transaction failed");
                Err(OrmError::FailedToRollback {
                    business: Box::new(business),
                    rollback: Box::new(rollback),
                    panicked,
                })
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl Session for DB {
    fn core(&self) -> &Core {
        &self.core
    }

    fn query<'a>(&'a self, sql: &'a str, args: &'a [SqlValue]) -> BoxFuture<'a, Result<Rows>> {
        Box::pin(async move {
            let rows = prepare(sql, args)
                .fetch_all(&self.pool)
                .await
                .map_err(OrmError::database)?;
            Ok(into_rows(rows))
        })
    }

    fn query_one<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<BoxRow>> {
        Box::pin(async move {
            let row = prepare(sql, args)
                .fetch_optional(&self.pool)
                .await
                .map_err(OrmError::database)?;
            first_row(row)
        })
    }

    fn exec<'a>(
        &'a self,
        sql: &'a str,
        args: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<ExecResult>> {
        Box::pin(async move {
            let res = prepare(sql, args)
                .execute(&self.pool)
                .await
                .map_err(OrmError::database)?;
            Ok(ExecResult {
                rows_affected: res.rows_affected(),
                last_insert_id: res.last_insert_rowid(),
            })
        })
    }
}
