//! SQL Dialect support.
//!
//! Dialects share the statement skeleton and differ in identifier quoting
//! and in how an INSERT turns into an upsert.

mod generic;
mod mysql;
mod sqlite;

pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::builder::{Assignable, Builder, Upsert};
use crate::error::{OrmError, Result};

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the parameter placeholder style.
    fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Quotes an identifier.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        format!("{quote}{name}{quote}")
    }

    /// Appends the upsert clause of an INSERT.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownField`] for a column the entity lacks and
    /// [`OrmError::UnsupportedAssignable`] for an assignment of another shape.
    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()>;
}

/// Renders `col=?` for literal assignments and delegates "take the incoming
/// value" assignments to `incoming`, after `col=` has been written.
pub(crate) fn build_assignments(
    builder: &mut Builder<'_>,
    assigns: &[Assignable],
    incoming: impl Fn(&mut Builder<'_>, &str) -> Result<()>,
) -> Result<()> {
    for (i, assign) in assigns.iter().enumerate() {
        if i > 0 {
            builder.push(",");
        }
        match assign {
            Assignable::Assignment(assignment) => {
                builder.push_column(&assignment.column)?;
                builder.push("=");
                builder.push_param(assignment.value.clone());
            }
            Assignable::Column(column) if column.is_bare() => {
                builder.push_column(column.name())?;
                builder.push("=");
                incoming(builder, column.name())?;
            }
            Assignable::Column(column) => {
                return Err(OrmError::UnsupportedAssignable(format!("{column:?}")));
            }
        }
    }
    Ok(())
}

/// `ON CONFLICT(cols) DO UPDATE SET col=?,col=excluded.col`
pub(crate) fn build_on_conflict(builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
    builder.push(" ON CONFLICT(");
    for (i, column) in upsert.conflict_columns.iter().enumerate() {
        if i > 0 {
            builder.push(",");
        }
        builder.push_column(column)?;
    }
    builder.push(") DO UPDATE SET ");
    build_assignments(builder, &upsert.assigns, |b, field| {
        b.push("excluded.");
        b.push_column(field)
    })
}
