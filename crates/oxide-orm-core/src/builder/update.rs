//! UPDATE statement builder.

use tracing::debug;

use super::expr::{Column, Predicate};
use super::{Builder, Query, QueryBuilder};
use crate::error::{OrmError, Result};
use crate::executor::{execute, Exec};
use crate::middleware::QueryType;
use crate::model::{Entity, Field};
use crate::session::{Core, ExecResult, Session};

/// Builds and runs an UPDATE that copies fields from a value of `T`.
pub struct Updater<T> {
    table: Option<String>,
    value: Option<T>,
    updates: Vec<Column>,
    wheres: Vec<Predicate>,
}

impl<T: Entity> Default for Updater<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Updater<T> {
    /// Creates an UPDATE on the table of `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: None,
            value: None,
            updates: Vec::new(),
            wheres: Vec::new(),
        }
    }

    /// Overrides the target table name.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Sets the value the new column contents are read from.
    #[must_use]
    pub fn value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    /// Restricts the SET list; by default every field is written.
    #[must_use]
    pub fn updates(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.updates = columns.into_iter().collect();
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
    /// Returns [`OrmError::MissingUpdateValue`] when no value was set, any
    /// other build error, or the session's error.
    pub async fn exec(&self, session: &dyn Session) -> Result<ExecResult> {
        let model = session.core().registry().get::<T>()?;
        execute(session, QueryType::Update, self, model, &Exec)
            .await?
            .into_exec()
    }
}

impl<T: Entity> QueryBuilder for Updater<T> {
    fn build(&self, core: &Core) -> Result<Query> {
        let value = self.value.as_ref().ok_or(OrmError::MissingUpdateValue)?;
        let model = core.registry().get::<T>()?;
        let fields: Vec<&Field> = if self.updates.is_empty() {
            model.fields().iter().collect()
        } else {
            self.updates
                .iter()
                .map(|column| {
                    model
                        .field(column.name())
                        .ok_or_else(|| OrmError::UnknownField(column.name().to_string()))
                })
                .collect::<Result<_>>()?
        };
        let reader = core.strategy().reader(&model, value)?;

        let mut b = Builder::new(core, model.clone());
        b.push("UPDATE ");
        b.push(self.table.as_deref().unwrap_or_else(|| model.table_name()));
        b.push(" SET ");
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                b.push(",");
            }
            b.push(&field.column);
            b.push("=");
            b.push_param(reader.field(field.name)?);
        }
        b.build_clause("WHERE", &self.wheres)?;

        let query = b.finish();
        debug!(sql = %query.sql, args = query.args.len(), "built update");
        Ok(query)
    }
}
