//! Slow statement detection.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use oxide_orm_core::{
    BoxFuture, Middleware, Next, QueryContext, QueryResult, QueryType, SqlValue,
};
use tokio::time::Instant;
use tracing::warn;

use super::truncate_sql;

type Hook = Arc<dyn Fn(QueryType, &str, &[SqlValue], Duration) + Send + Sync>;

/// Warns about statements that take at least `threshold`.
#[derive(Clone)]
pub struct SlowQuery {
    threshold: Duration,
    max_sql_length: Option<usize>,
    hook: Option<Hook>,
}

impl fmt::Debug for SlowQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlowQuery")
            .field("threshold", &self.threshold)
            .field("max_sql_length", &self.max_sql_length)
            .finish_non_exhaustive()
    }
}

impl SlowQuery {
    /// Creates a slow-query detector.
    #[must_use]
    pub const fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            max_sql_length: Some(200),
            hook: None,
        }
    }

    /// Set maximum SQL length to display.
    #[must_use]
    pub const fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Calls `hook` with the statement kind, SQL, bound arguments and
    /// elapsed time of every slow statement, in addition to the warning.
    #[must_use]
    pub fn on_slow(
        mut self,
        hook: impl Fn(QueryType, &str, &[SqlValue], Duration) + Send + Sync + 'static,
    ) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }
}

impl Middleware for SlowQuery {
    fn handle<'a>(
        &'a self,
        ctx: &'a QueryContext<'a>,
        next: Next<'a>,
    ) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            let start = Instant::now();
            let result = next.run(ctx).await;
            let elapsed = start.elapsed();
            if elapsed < self.threshold {
                return result;
            }

            let (sql, args) = ctx
                .build()
                .map(|query| (truncate_sql(&query.sql, self.max_sql_length), query.args))
                .unwrap_or_default();
            warn!(
                query_type = %ctx.query_type,
                elapsed = ?elapsed,
                threshold = ?self.threshold,
                args = ?args,
                "slow query: {sql}"
            );
            if let Some(hook) = &self.hook {
                hook(ctx.query_type, &sql, &args, elapsed);
            }
            result
        })
    }
}
