//! SELECT statement builder.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use super::expr::{Column, Expr, Predicate};
use super::table::{Subquery, TableReference};
use super::{Builder, Query, QueryBuilder};
use crate::error::{OrmError, Result};
use crate::executor::{execute, GetMulti, GetOne};
use crate::middleware::QueryType;
use crate::model::Entity;
use crate::session::{Core, Session};

/// Builds and runs a SELECT over the table of `T`.
pub struct Selector<T> {
    columns: Vec<Expr>,
    table: Option<TableReference>,
    wheres: Vec<Predicate>,
    group_by: Vec<Column>,
    having: Vec<Predicate>,
    order_by: Vec<Column>,
    offset: u64,
    limit: u64,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Default for Selector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Selector<T> {
    /// Creates a `SELECT * FROM <table of T>`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            table: None,
            wheres: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            offset: 0,
            limit: 0,
            _entity: PhantomData,
        }
    }

    /// Sets the select list: columns, aggregates or raw fragments.
    #[must_use]
    pub fn select<E: Into<Expr>>(mut self, columns: impl IntoIterator<Item = E>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Reads from another table, join or subquery.
    #[must_use]
    pub fn from(mut self, table: impl Into<TableReference>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Adds a WHERE predicate; several are joined with `AND`.
    #[must_use]
    pub fn where_clause(mut self, predicate: Predicate) -> Self {
        self.wheres.push(predicate);
        self
    }

    /// Sets the GROUP BY columns.
    #[must_use]
    pub fn group_by(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.group_by = columns.into_iter().collect();
        self
    }

    /// Adds a HAVING predicate; several are joined with `AND`.
    #[must_use]
    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having.push(predicate);
        self
    }

    /// Appends an ORDER BY column, which must carry `asc()` or `desc()`.
    #[must_use]
    pub fn order_by(mut self, column: Column) -> Self {
        self.order_by.push(column);
        self
    }

    /// Sets OFFSET; zero leaves it out.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Sets LIMIT; zero leaves it out.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Wraps the statement for use as `(SELECT ...) AS alias`.
    #[must_use]
    pub fn as_subquery(self, alias: &str) -> Subquery {
        Subquery::new(Arc::new(self), alias)
    }

    /// Returns the first matching row.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NoRows`] when nothing matches, any build error,
    /// or the session's error.
    pub async fn get(&self, session: &dyn Session) -> Result<T>
    where
        T: Default,
    {
        let model = session.core().registry().get::<T>()?;
        execute(session, QueryType::Select, self, model, &GetOne::<T>::new())
            .await?
            .into_record()
    }

    /// Returns every matching row.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NoRows`] when nothing matches, any build error,
    /// or the session's error.
    pub async fn get_multi(&self, session: &dyn Session) -> Result<Vec<T>>
    where
        T: Default,
    {
        let model = session.core().registry().get::<T>()?;
        execute(session, QueryType::Select, self, model, &GetMulti::<T>::new())
            .await?
            .into_record()
    }

    /// Runs the statement and decodes every row into another entity type,
    /// typically the shape of a join or aggregate result.
    ///
    /// The middleware chain is not involved.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownColumn`] if a result column does not map to
    /// a field of `U`, any build error, or the session's error.
    pub async fn scan<U: Entity + Default>(&self, session: &dyn Session) -> Result<Vec<U>> {
        let core = session.core();
        let model = core.registry().get::<U>()?;
        let query = self.build(core)?;
        let rows = session.query(&query.sql, &query.args).await?;
        rows.iter()
            .map(|row| core.strategy().decode::<U>(&model, row.as_ref()))
            .collect()
    }
}

impl<T: Entity> QueryBuilder for Selector<T> {
    fn build(&self, core: &Core) -> Result<Query> {
        let model = core.registry().get::<T>()?;
        let mut b = Builder::new(core, model);

        b.push("SELECT ");
        if self.columns.is_empty() {
            b.push("*");
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                b.push(",");
            }
            b.build_selectable(column)?;
        }

        b.push(" FROM ");
        b.build_table(self.table.as_ref())?;
        b.build_clause("WHERE", &self.wheres)?;

        if !self.group_by.is_empty() {
            b.push(" GROUP BY ");
            for (i, column) in self.group_by.iter().enumerate() {
                if i > 0 {
                    b.push(",");
                }
                b.build_column(column, false)?;
            }
        }

        if !self.having.is_empty() {
            if self.group_by.is_empty() {
                return Err(OrmError::NoGroupUseHaving);
            }
            b.build_clause("HAVING", &self.having)?;
        }

        if !self.order_by.is_empty() {
            b.push(" ORDER BY ");
            for (i, column) in self.order_by.iter().enumerate() {
                if column.order.is_none() {
                    return Err(OrmError::NoOrderByDirection);
                }
                if i > 0 {
                    b.push(",");
                }
                b.build_column(column, false)?;
            }
        }

        if self.offset > 0 {
            b.push(&format!(" OFFSET {}", self.offset));
            if self.limit > 0 {
                b.push(",");
            }
        }
        if self.limit > 0 {
            b.push(&format!(" LIMIT {}", self.limit));
        }

        let query = b.finish();
        debug!(sql = %query.sql, args = query.args.len(), "built select");
        Ok(query)
    }
}
