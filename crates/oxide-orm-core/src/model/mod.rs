//! Per-type table metadata.
//!
//! An [`Entity`] describes its fields once, at compile time, through
//! `#[derive(Entity)]`. The [`Registry`] turns that description into a
//! [`Model`] (table name, column names, lookup maps) the first time the type
//! is used and caches it for the lifetime of the registry.

mod registry;

use std::any::TypeId;
use std::collections::HashMap;

pub use registry::{underscore_name, ModelOption, Registry};

use crate::error::{OrmError, Result};
use crate::value::{SqlValue, ValueKind};

/// Compile-time description of one struct field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Rust field name.
    pub name: &'static str,
    /// Raw `key=value,...` tag, empty when the field carries none.
    pub tag: &'static str,
    /// Byte offset of the field inside the struct.
    pub offset: usize,
    /// Storage class the field is scanned as.
    pub kind: ValueKind,
    /// Whether the field is an `Option`.
    pub nullable: bool,
    /// Reads the field given a pointer to it.
    pub read: unsafe fn(*const u8) -> SqlValue,
    /// Writes the field given a pointer to it.
    pub write: unsafe fn(*mut u8, SqlValue) -> Result<()>,
}

/// A record type that maps to a table.
///
/// Implement it with `#[derive(Entity)]`.
///
/// # Safety
///
/// For every entry of `FIELDS`, `offset` must be the offset of a field of
/// `Self` whose type is exactly the one `read` and `write` were instantiated
/// with. The direct-offset accessor dereferences those offsets without
/// further checks.
pub unsafe trait Entity: Send + Sync + 'static {
    /// Table name reported by the type itself; `None` or empty falls back to
    /// the snake_case type name.
    const TABLE_NAME: Option<&'static str> = None;

    /// Fields in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    /// Reads a field by Rust name, `None` if there is no such field.
    fn get_field(&self, name: &str) -> Option<SqlValue>;

    /// Writes a field by Rust name, `None` if there is no such field.
    fn set_field(&mut self, name: &str, value: SqlValue) -> Option<Result<()>>;
}

/// Resolved metadata for one field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Rust field name.
    pub name: &'static str,
    /// Column name in the table.
    pub column: String,
    /// Byte offset inside the struct.
    pub offset: usize,
    /// Storage class.
    pub kind: ValueKind,
    /// Whether the column may be NULL.
    pub nullable: bool,
    pub(crate) read: unsafe fn(*const u8) -> SqlValue,
    pub(crate) write: unsafe fn(*mut u8, SqlValue) -> Result<()>,
}

/// Table metadata for an entity type.
///
/// The field and column maps index into the same `fields` vector, so a
/// field renamed through one is seen through the other.
#[derive(Debug, Clone)]
pub struct Model {
    type_id: TypeId,
    type_name: &'static str,
    table_name: String,
    fields: Vec<Field>,
    field_map: HashMap<&'static str, usize>,
    column_map: HashMap<String, usize>,
}

impl Model {
    pub(crate) fn new(
        type_id: TypeId,
        type_name: &'static str,
        table_name: String,
        fields: Vec<Field>,
    ) -> Result<Self> {
        let field_map = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name, idx))
            .collect();
        let mut column_map: HashMap<String, usize> = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if let Some(&owner) = column_map.get(&field.column) {
                let owner: &Field = &fields[owner];
                return Err(OrmError::DuplicateColumn {
                    column: field.column.clone(),
                    field: owner.name.to_string(),
                });
            }
            column_map.insert(field.column.clone(), idx);
        }
        Ok(Self {
            type_id,
            type_name,
            table_name,
            fields,
            field_map,
            column_map,
        })
    }

    /// Returns the table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by Rust name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_map.get(name).map(|&idx| &self.fields[idx])
    }

    /// Looks up a field by column name.
    #[must_use]
    pub fn field_by_column(&self, column: &str) -> Option<&Field> {
        self.column_map.get(column).map(|&idx| &self.fields[idx])
    }

    /// Returns the full Rust type name the model was built for.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn is_for<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn set_table_name(&mut self, name: String) {
        self.table_name = name;
    }

    /// Maps `field` to `column`. The column must not belong to another field.
    pub(crate) fn rename_column(&mut self, field: &str, column: String) -> Result<()> {
        let idx = *self
            .field_map
            .get(field)
            .ok_or_else(|| OrmError::UnknownField(field.to_string()))?;
        if let Some(&owner) = self.column_map.get(&column) {
            if owner != idx {
                return Err(OrmError::DuplicateColumn {
                    column,
                    field: self.fields[owner].name.to_string(),
                });
            }
        }
        let old = std::mem::replace(&mut self.fields[idx].column, column.clone());
        self.column_map.remove(&old);
        self.column_map.insert(column, idx);
        Ok(())
    }
}
