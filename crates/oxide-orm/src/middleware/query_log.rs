//! Statement logging.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use oxide_orm_core::{
    BoxFuture, Middleware, Next, QueryContext, QueryResult, QueryType, SqlValue,
};
use tokio::time::Instant;
use tracing::debug;

use super::truncate_sql;

/// One finished statement, as passed to a [`QueryLog`] sink.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Statement kind.
    pub query_type: QueryType,
    /// Compiled SQL, possibly truncated.
    pub sql: String,
    /// Bound arguments.
    pub args: Vec<SqlValue>,
    /// Time spent in the rest of the chain.
    pub elapsed: Duration,
    /// Error message if the statement failed.
    pub error: Option<String>,
}

type Sink = Arc<dyn Fn(&LogEntry) + Send + Sync>;

/// Logs every statement with its arguments and duration.
///
/// By default entries go to `tracing` at debug level; [`QueryLog::sink`]
/// redirects them to a custom function.
#[derive(Clone, Default)]
pub struct QueryLog {
    min_duration: Option<Duration>,
    max_sql_length: Option<usize>,
    sink: Option<Sink>,
}

impl fmt::Debug for QueryLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryLog")
            .field("min_duration", &self.min_duration)
            .field("max_sql_length", &self.max_sql_length)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl QueryLog {
    /// Logs every statement through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only log statements slower than this duration.
    #[must_use]
    pub const fn min_duration(mut self, duration: Duration) -> Self {
        self.min_duration = Some(duration);
        self
    }

    /// Set maximum SQL length to display.
    #[must_use]
    pub const fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Sends entries to `sink` instead of `tracing`.
    #[must_use]
    pub fn sink(mut self, sink: impl Fn(&LogEntry) + Send + Sync + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    fn emit(&self, entry: &LogEntry) {
        if let Some(sink) = &self.sink {
            sink(entry);
            return;
        }
        match &entry.error {
            None => debug!(
                query_type = %entry.query_type,
                elapsed = ?entry.elapsed,
                args = ?entry.args,
                "{}",
                entry.sql
            ),
            Some(error) => debug!(
                query_type = %entry.query_type,
                elapsed = ?entry.elapsed,
                args = ?entry.args,
                error = %error,
                "{}",
                entry.sql
            ),
        }
    }
}

impl Middleware for QueryLog {
    fn handle<'a>(
        &'a self,
        ctx: &'a QueryContext<'a>,
        next: Next<'a>,
    ) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            let start = Instant::now();
            let result = next.run(ctx).await;
            let elapsed = start.elapsed();

            if self.min_duration.is_some_and(|min| elapsed < min) {
                return result;
            }
            // A statement that fails to compile never reached the session.
            let Ok(query) = ctx.build() else {
                return result;
            };
            self.emit(&LogEntry {
                query_type: ctx.query_type,
                sql: truncate_sql(&query.sql, self.max_sql_length),
                args: query.args,
                elapsed,
                error: result.as_ref().err().map(ToString::to_string),
            });
            result
        })
    }
}
