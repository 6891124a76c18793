//! Middlewares shipped with the SQLite backend.
//!
//! Install them through [`DbOptions::middleware`](crate::DbOptions::middleware)
//! or [`Core::with_middleware`](oxide_orm_core::Core::with_middleware). The
//! first one added runs outermost, so a [`Timeout`] added before a
//! [`QueryLog`] also bounds the time spent logging.

mod query_log;
mod slow_query;
mod timeout;

pub use query_log::{LogEntry, QueryLog};
pub use slow_query::SlowQuery;
pub use timeout::Timeout;

/// Cuts `sql` to at most `max` bytes on a character boundary.
fn truncate_sql(sql: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if sql.len() > max => {
            let mut end = max;
            while !sql.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &sql[..end])
        }
        _ => sql.to_string(),
    }
}
