//! Result cursor contract.

use crate::error::{OrmError, Result};
use crate::value::{SqlValue, ValueKind};

/// Typed destination for one column of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSlot {
    kind: ValueKind,
    nullable: bool,
    value: SqlValue,
}

impl ScanSlot {
    /// Creates an empty slot for a column of the given storage class.
    #[must_use]
    pub const fn new(kind: ValueKind, nullable: bool) -> Self {
        Self {
            kind,
            nullable,
            value: SqlValue::Null,
        }
    }

    /// Storage class the column should be decoded as.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether the destination accepts `NULL`.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// Stores the scanned value.
    pub fn set(&mut self, value: SqlValue) {
        self.value = value;
    }

    /// Takes the scanned value out of the slot.
    pub fn take(&mut self) -> SqlValue {
        std::mem::replace(&mut self.value, SqlValue::Null)
    }
}

/// One row of a result set.
pub trait Row {
    /// Column names in result order.
    fn columns(&self) -> Vec<String>;

    /// Decodes every column into the slot at the same position, in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be decoded as its slot's kind.
    fn scan(&self, slots: &mut [ScanSlot]) -> Result<()>;
}

/// A row held in memory, used by mock sessions and raw adapters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRow {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl MemoryRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column and its value.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: SqlValue) -> Self {
        self.columns.push(column.into());
        self.values.push(value);
        self
    }
}

impl Row for MemoryRow {
    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn scan(&self, slots: &mut [ScanSlot]) -> Result<()> {
        if slots.len() != self.values.len() {
            return Err(OrmError::Conversion(format!(
                "expected {} destinations, got {}",
                self.values.len(),
                slots.len()
            )));
        }
        for (slot, value) in slots.iter_mut().zip(&self.values) {
            if value.is_null() && !slot.nullable() {
                return Err(OrmError::Conversion(format!(
                    "NULL scanned into non-nullable {}",
                    slot.kind()
                )));
            }
            slot.set(value.clone());
        }
        Ok(())
    }
}
