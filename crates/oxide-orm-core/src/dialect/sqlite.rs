//! SQLite dialect implementation.

use super::{build_on_conflict, Dialect};
use crate::builder::{Builder, Upsert};
use crate::error::Result;

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }

    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
        // SQLite 3.24.0+
        build_on_conflict(builder, upsert)
    }
}
