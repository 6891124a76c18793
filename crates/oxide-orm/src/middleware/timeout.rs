//! Per-statement deadline.

use std::time::Duration;

use oxide_orm_core::{BoxFuture, Middleware, Next, OrmError, QueryContext, QueryResult};
use tracing::warn;

/// Fails a statement with [`OrmError::Timeout`] when the rest of the chain
/// does not finish within `limit`. The pending statement is dropped.
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    limit: Duration,
}

impl Timeout {
    /// Creates a timeout middleware.
    #[must_use]
    pub const fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

impl Middleware for Timeout {
    fn handle<'a>(
        &'a self,
        ctx: &'a QueryContext<'a>,
        next: Next<'a>,
    ) -> BoxFuture<'a, QueryResult> {
        Box::pin(async move {
            if let Ok(result) = tokio::time::timeout(self.limit, next.run(ctx)).await {
                result
            } else {
                warn!(query_type = %ctx.query_type, limit = ?self.limit, "query timed out");
                Err(OrmError::Timeout(self.limit))
            }
        })
    }
}
