//! Hand-written statements that still go through the middleware chain.

use std::marker::PhantomData;

use super::{Query, QueryBuilder};
use crate::error::Result;
use crate::executor::{execute, Exec, GetMulti, GetOne};
use crate::middleware::QueryType;
use crate::model::Entity;
use crate::session::{Core, ExecResult, Session};
use crate::value::{SqlValue, ToSqlValue};

/// SQL text plus arguments, decoded into `T` when it returns rows.
///
/// The text is sent as written: no `;` is appended and placeholders are not
/// rewritten for the dialect.
pub struct RawQuery<T> {
    sql: String,
    args: Vec<SqlValue>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RawQuery<T> {
    /// Creates a statement from SQL text.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Binds the next argument.
    #[must_use]
    pub fn arg(mut self, value: impl ToSqlValue) -> Self {
        self.args.push(value.to_sql_value());
        self
    }

    /// Binds several arguments.
    #[must_use]
    pub fn args(mut self, values: impl IntoIterator<Item = SqlValue>) -> Self {
        self.args.extend(values);
        self
    }

    /// Returns the first row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OrmError::NoRows`] when the result is empty, or the
    /// session's error.
    pub async fn get(&self, session: &dyn Session) -> Result<T>
    where
        T: Default,
    {
        let model = session.core().registry().get::<T>()?;
        execute(session, QueryType::Raw, self, model, &GetOne::<T>::new())
            .await?
            .into_record()
    }

    /// Returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OrmError::NoRows`] when the result is empty, or the
    /// session's error.
    pub async fn get_multi(&self, session: &dyn Session) -> Result<Vec<T>>
    where
        T: Default,
    {
        let model = session.core().registry().get::<T>()?;
        execute(session, QueryType::Raw, self, model, &GetMulti::<T>::new())
            .await?
            .into_record()
    }

    /// Runs a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns the session's error.
    pub async fn exec(&self, session: &dyn Session) -> Result<ExecResult> {
        let model = session.core().registry().get::<T>()?;
        execute(session, QueryType::Raw, self, model, &Exec)
            .await?
            .into_exec()
    }
}

impl<T: Entity> QueryBuilder for RawQuery<T> {
    fn build(&self, _core: &Core) -> Result<Query> {
        Ok(Query {
            sql: self.sql.clone(),
            args: self.args.clone(),
        })
    }
}
