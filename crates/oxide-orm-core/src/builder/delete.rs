//! DELETE statement builder.

use std::marker::PhantomData;

use tracing::debug;

use super::expr::Predicate;
use super::{Builder, Query, QueryBuilder};
use crate::error::Result;
use crate::executor::{execute, Exec};
use crate::middleware::QueryType;
use crate::model::Entity;
use crate::session::{Core, ExecResult, Session};

/// Builds and runs a DELETE on the table of `T`.
pub struct Deleter<T> {
    table: Option<String>,
    wheres: Vec<Predicate>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Default for Deleter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Deleter<T> {
    /// Creates a DELETE on the table of `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: None,
            wheres: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Overrides the target table name.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Adds a WHERE predicate; several are joined with `AND`.
    #[must_use]
    pub fn where_clause(mut self, predicate: Predicate) -> Self {
        self.wheres.push(predicate);
        self
    }

    /// Runs the statement.
    ///
    /// # Errors
    ///
    /// Returns any build error or the session's error.
    pub async fn exec(&self, session: &dyn Session) -> Result<ExecResult> {
        let model = session.core().registry().get::<T>()?;
        execute(session, QueryType::Delete, self, model, &Exec)
            .await?
            .into_exec()
    }
}

impl<T: Entity> QueryBuilder for Deleter<T> {
    fn build(&self, core: &Core) -> Result<Query> {
        let model = core.registry().get::<T>()?;
        let mut b = Builder::new(core, model.clone());
        b.push("DELETE FROM ");
        b.push(self.table.as_deref().unwrap_or_else(|| model.table_name()));
        b.build_clause("WHERE", &self.wheres)?;

        let query = b.finish();
        debug!(sql = %query.sql, args = query.args.len(), "built delete");
        Ok(query)
    }
}
