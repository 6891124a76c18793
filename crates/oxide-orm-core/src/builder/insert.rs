//! INSERT statement builder and upsert clauses.

use tracing::debug;

use super::expr::Column;
use super::{Builder, Query, QueryBuilder};
use crate::error::{OrmError, Result};
use crate::executor::{execute, Exec};
use crate::middleware::QueryType;
use crate::model::{Entity, Field};
use crate::session::{Core, ExecResult, Session};
use crate::value::{SqlValue, ToSqlValue};

/// `column = literal` in an upsert clause.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub(crate) column: String,
    pub(crate) value: SqlValue,
}

/// Assigns a literal value to a field on conflict.
#[must_use]
pub fn assign(column: &str, value: impl ToSqlValue) -> Assignment {
    Assignment {
        column: column.to_string(),
        value: value.to_sql_value(),
    }
}

/// One assignment of an upsert's update list.
#[derive(Debug, Clone)]
pub enum Assignable {
    /// Take the value the conflicting row would have inserted.
    Column(Column),
    /// Set a literal value.
    Assignment(Assignment),
}

impl From<Column> for Assignable {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<Assignment> for Assignable {
    fn from(assignment: Assignment) -> Self {
        Self::Assignment(assignment)
    }
}

/// What to do when an inserted row conflicts with an existing one.
#[derive(Debug, Clone, Default)]
pub struct Upsert {
    pub(crate) assigns: Vec<Assignable>,
    pub(crate) conflict_columns: Vec<String>,
}

impl Upsert {
    /// Assignments applied to the existing row.
    #[must_use]
    pub fn assigns(&self) -> &[Assignable] {
        &self.assigns
    }

    /// Fields whose uniqueness triggers the update.
    #[must_use]
    pub fn conflict_columns(&self) -> &[String] {
        &self.conflict_columns
    }
}

/// Builds and runs an INSERT of one or more `T`.
pub struct Inserter<T> {
    columns: Vec<String>,
    values: Vec<T>,
    upsert: Option<Upsert>,
}

impl<T: Entity> Default for Inserter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Inserter<T> {
    /// Creates an INSERT with no rows.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            values: Vec::new(),
            upsert: None,
        }
    }

    /// Restricts the inserted fields; by default every field is written.
    #[must_use]
    pub fn columns<S: AsRef<str>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Appends rows.
    #[must_use]
    pub fn values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.values.extend(values);
        self
    }

    /// Appends one row.
    #[must_use]
    pub fn value(mut self, value: T) -> Self {
        self.values.push(value);
        self
    }

    /// Starts an upsert clause.
    #[must_use]
    pub fn upsert(self) -> UpsertBuilder<T> {
        UpsertBuilder {
            inserter: self,
            conflict_columns: Vec::new(),
        }
    }

    /// Runs the statement.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::InsertZeroRows`] when no row was given, any other
    /// build error, or the session's error.
    pub async fn exec(&self, session: &dyn Session) -> Result<ExecResult> {
        let model = session.core().registry().get::<T>()?;
        execute(session, QueryType::Insert, self, model, &Exec)
            .await?
            .into_exec()
    }
}

/// Second half of an upsert: conflict target and update list.
pub struct UpsertBuilder<T> {
    inserter: Inserter<T>,
    conflict_columns: Vec<String>,
}

impl<T: Entity> UpsertBuilder<T> {
    /// Sets the conflict target. MySQL ignores it.
    #[must_use]
    pub fn conflict_columns<S: AsRef<str>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.conflict_columns = columns.into_iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Sets the update list and returns the finished INSERT.
    ///
    /// A bare column takes the incoming value; [`assign`] sets a literal.
    #[must_use]
    pub fn update<A: Into<Assignable>>(self, assigns: impl IntoIterator<Item = A>) -> Inserter<T> {
        let mut inserter = self.inserter;
        inserter.upsert = Some(Upsert {
            assigns: assigns.into_iter().map(Into::into).collect(),
            conflict_columns: self.conflict_columns,
        });
        inserter
    }
}

impl<T: Entity> QueryBuilder for Inserter<T> {
    fn build(&self, core: &Core) -> Result<Query> {
        if self.values.is_empty() {
            return Err(OrmError::InsertZeroRows);
        }

        let model = core.registry().get::<T>()?;
        let fields: Vec<&Field> = if self.columns.is_empty() {
            model.fields().iter().collect()
        } else {
            self.columns
                .iter()
                .map(|name| {
                    model
                        .field(name)
                        .ok_or_else(|| OrmError::UnknownField(name.clone()))
                })
                .collect::<Result<_>>()?
        };

        let mut b = Builder::new(core, model.clone());
        b.push("INSERT INTO ");
        b.push(model.table_name());
        b.push(" (");
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                b.push(",");
            }
            b.push(&field.column);
        }
        b.push(") VALUES ");

        for (row, value) in self.values.iter().enumerate() {
            if row > 0 {
                b.push(",");
            }
            let reader = core.strategy().reader(&model, value)?;
            b.push("(");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    b.push(",");
                }
                b.push_param(reader.field(field.name)?);
            }
            b.push(")");
        }

        if let Some(upsert) = &self.upsert {
            core.dialect().build_upsert(&mut b, upsert)?;
        }

        let query = b.finish();
        debug!(sql = %query.sql, rows = self.values.len(), "built insert");
        Ok(query)
    }
}
