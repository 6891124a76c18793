//! Generic SQL dialect.

use super::{build_on_conflict, Dialect};
use crate::builder::{Builder, Upsert};
use crate::error::Result;

/// A generic SQL dialect using ANSI SQL standards.
///
/// Upserts render as `ON CONFLICT(...) DO UPDATE SET ...`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn build_upsert(&self, builder: &mut Builder<'_>, upsert: &Upsert) -> Result<()> {
        build_on_conflict(builder, upsert)
    }
}
