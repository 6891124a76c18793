//! MySQL dialect implementation.

use super::{build_assignments, Dialect};
use crate::builder::{Builder, Upsert};
use crate::error::Result;

/// MySQL dialect.
///
/// Upserts render as `ON DUPLICATE KEY UPDATE ...`; conflict columns are
/// ignored because MySQL infers them from the primary and unique keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
        builder.push(" ON DUPLICATE KEY UPDATE ");
        build_assignments(builder, &upsert.assigns, |b, field| {
            b.push("VALUES(");
            b.push_column(field)?;
            b.push(")");
            Ok(())
        })
    }
}
