//! Field access strategies.
//!
//! Both strategies expose the same two capabilities: reading a field by name
//! (used to collect INSERT/UPDATE arguments) and populating a record from a
//! result row. [`AccessStrategy::Reflect`] goes through the by-name
//! `get_field`/`set_field` the derive generates. [`AccessStrategy::Unsafe`]
//! computes the record's base address once and reads or writes each field at
//! its precomputed offset through the typed thunks stored in the model.

use std::any::type_name;
use std::marker::PhantomData;

use crate::error::{OrmError, Result};
use crate::model::{Entity, Field, Model};
use crate::row::{Row, ScanSlot};
use crate::value::SqlValue;

/// Reads fields of a record.
pub trait ValueReader {
    /// Returns the value of the field with the given Rust name.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownField`] if the model has no such field.
    fn field(&self, name: &str) -> Result<SqlValue>;
}

/// Writes fields of a record.
pub trait ValueWriter {
    /// Sets the field with the given Rust name.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownField`] for a missing field and
    /// [`OrmError::Conversion`] if the value does not fit the field type.
    fn set_field(&mut self, name: &str, value: SqlValue) -> Result<()>;

    /// Populates the record from one result row, mapping columns by name.
    ///
    /// Fields without a matching column keep their current value.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownColumn`] if the row carries a column the
    /// model does not map, or any error raised while scanning.
    fn set_columns(&mut self, row: &dyn Row) -> Result<()>;
}

/// Which accessor implementation a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessStrategy {
    /// By-name access through generated safe code.
    Reflect,
    /// Direct reads and writes at precomputed field offsets.
    #[default]
    Unsafe,
}

impl AccessStrategy {
    /// Creates a reader over `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::ModelMismatch`] if `model` was not built for `T`.
    pub fn reader<'a, T: Entity>(
        self,
        model: &'a Model,
        entity: &'a T,
    ) -> Result<Box<dyn ValueReader + 'a>> {
        check_model::<T>(model)?;
        let reader: Box<dyn ValueReader + 'a> = match self {
            Self::Reflect => Box::new(ReflectReader { model, entity }),
            Self::Unsafe => Box::new(OffsetReader {
                model,
                base: std::ptr::from_ref(entity).cast::<u8>(),
                _entity: PhantomData,
            }),
        };
        Ok(reader)
    }

    /// Creates a writer over `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::ModelMismatch`] if `model` was not built for `T`.
    pub fn writer<'a, T: Entity>(
        self,
        model: &'a Model,
        entity: &'a mut T,
    ) -> Result<Box<dyn ValueWriter + 'a>> {
        check_model::<T>(model)?;
        let writer: Box<dyn ValueWriter + 'a> = match self {
            Self::Reflect => Box::new(ReflectWriter { model, entity }),
            Self::Unsafe => Box::new(OffsetWriter {
                model,
                base: std::ptr::from_mut(entity).cast::<u8>(),
                _entity: PhantomData,
            }),
        };
        Ok(writer)
    }

    /// Builds a default `T` and populates it from `row`.
    ///
    /// # Errors
    ///
    /// See [`ValueWriter::set_columns`].
    pub fn decode<T: Entity + Default>(self, model: &Model, row: &dyn Row) -> Result<T> {
        let mut entity = T::default();
        self.writer(model, &mut entity)?.set_columns(row)?;
        Ok(entity)
    }
}

fn check_model<T: Entity>(model: &Model) -> Result<()> {
    if model.is_for::<T>() {
        Ok(())
    } else {
        Err(OrmError::ModelMismatch {
            expected: model.type_name(),
            found: type_name::<T>(),
        })
    }
}

fn lookup<'m>(model: &'m Model, name: &str) -> Result<&'m Field> {
    model
        .field(name)
        .ok_or_else(|| OrmError::UnknownField(name.to_string()))
}

/// Resolves the row's columns, scans them in one call and hands each value
/// to `assign` together with its field.
fn scan_row(
    model: &Model,
    row: &dyn Row,
    mut assign: impl FnMut(&Field, SqlValue) -> Result<()>,
) -> Result<()> {
    let fields = row
        .columns()
        .iter()
        .map(|column| {
            model
                .field_by_column(column)
                .ok_or_else(|| OrmError::UnknownColumn(column.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut slots: Vec<ScanSlot> = fields
        .iter()
        .map(|field| ScanSlot::new(field.kind, field.nullable))
        .collect();
    row.scan(&mut slots)?;

    for (field, slot) in fields.into_iter().zip(slots.iter_mut()) {
        assign(field, slot.take())?;
    }
    Ok(())
}

struct ReflectReader<'a, T> {
    model: &'a Model,
    entity: &'a T,
}

impl<T: Entity> ValueReader for ReflectReader<'_, T> {
    fn field(&self, name: &str) -> Result<SqlValue> {
        lookup(self.model, name)?;
        self.entity
            .get_field(name)
            .ok_or_else(|| OrmError::UnknownField(name.to_string()))
    }
}

struct ReflectWriter<'a, T> {
    model: &'a Model,
    entity: &'a mut T,
}

impl<T: Entity> ValueWriter for ReflectWriter<'_, T> {
    fn set_field(&mut self, name: &str, value: SqlValue) -> Result<()> {
        lookup(self.model, name)?;
        self.entity
            .set_field(name, value)
            .unwrap_or_else(|| Err(OrmError::UnknownField(name.to_string())))
    }

    fn set_columns(&mut self, row: &dyn Row) -> Result<()> {
        let entity = &mut *self.entity;
        scan_row(self.model, row, |field, value| {
            entity
                .set_field(field.name, value)
                .unwrap_or_else(|| Err(OrmError::UnknownField(field.name.to_string())))
        })
    }
}

struct OffsetReader<'a> {
    model: &'a Model,
    base: *const u8,
    _entity: PhantomData<&'a ()>,
}

impl ValueReader for OffsetReader<'_> {
    fn field(&self, name: &str) -> Result<SqlValue> {
        let field = lookup(self.model, name)?;
        // SAFETY: the model was checked to belong to the borrowed entity, so
        // `offset` addresses a live field of the type `read` expects.
        Ok(unsafe { (field.read)(self.base.add(field.offset)) })
    }
}

struct OffsetWriter<'a> {
    model: &'a Model,
    base: *mut u8,
    _entity: PhantomData<&'a mut ()>,
}

impl OffsetWriter<'_> {
    fn write(base: *mut u8, field: &Field, value: SqlValue) -> Result<()> {
        // SAFETY: `base` comes from an exclusive borrow of the entity the
        // model was checked against; `write` matches the field's type.
        unsafe { (field.write)(base.add(field.offset), value) }
    }
}

impl ValueWriter for OffsetWriter<'_> {
    fn set_field(&mut self, name: &str, value: SqlValue) -> Result<()> {
        let field = lookup(self.model, name)?;
        Self::write(self.base, field, value)
    }

    fn set_columns(&mut self, row: &dyn Row) -> Result<()> {
        let base = self.base;
        scan_row(self.model, row, |field, value| Self::write(base, field, value))
    }
}
