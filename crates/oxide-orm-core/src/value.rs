//! SQL values, field value conversion and the raw field thunks used by the
//! direct-offset accessor.

use std::fmt;

use crate::error::{OrmError, Result};

/// A SQL value bound as a statement parameter or read back from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the SQL type name used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOLEAN",
            Self::Int(_) => "INTEGER",
            Self::Float(_) => "REAL",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
        }
    }

    /// Returns true for `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// Storage class a field is scanned as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Booleans.
    Bool,
    /// Signed and unsigned integers.
    Int,
    /// Floating point numbers.
    Float,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Blob,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "BOOLEAN",
            Self::Int => "INTEGER",
            Self::Float => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        };
        f.write_str(name)
    }
}

/// A Rust type that can be stored in an entity field.
///
/// `KIND` tells a row cursor which typed destination to allocate when the
/// field is scanned; `NULLABLE` is true for `Option<T>`.
pub trait FieldValue: Sized + 'static {
    /// Storage class of the field.
    const KIND: ValueKind;
    /// Whether the field accepts `NULL`.
    const NULLABLE: bool = false;

    /// Reads the field into a SQL value.
    fn to_value(&self) -> SqlValue;

    /// Converts a scanned SQL value back into the field type.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Conversion`] if the value does not fit the type.
    fn from_value(value: SqlValue) -> Result<Self>;
}

fn mismatch(kind: ValueKind, value: &SqlValue) -> OrmError {
    OrmError::Conversion(format!("cannot read {} as {kind}", value.type_name()))
}

macro_rules! int_field_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FieldValue for $t {
                const KIND: ValueKind = ValueKind::Int;

                fn to_value(&self) -> SqlValue {
                    SqlValue::Int(i64::from(*self))
                }

                fn from_value(value: SqlValue) -> Result<Self> {
                    match value {
                        SqlValue::Int(n) => <$t>::try_from(n).map_err(|_| {
                            OrmError::Conversion(format!(
                                "{n} out of range for {}",
                                stringify!($t)
                            ))
                        }),
                        SqlValue::Bool(b) => Ok(<$t>::from(b)),
                        other => Err(mismatch(Self::KIND, &other)),
                    }
                }
            }
        )*
    };
}

int_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl FieldValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }

    fn from_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            SqlValue::Int(n) => Ok(n != 0),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float(f) => Ok(f),
            SqlValue::Int(n) => Ok(n as Self),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> SqlValue {
        SqlValue::Float(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: SqlValue) -> Result<Self> {
        f64::from_value(value).map(|f| f as Self)
    }
}

impl FieldValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn from_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(s) => Ok(s),
            SqlValue::Blob(b) => {
                Self::from_utf8(b).map_err(|e| OrmError::Conversion(e.to_string()))
            }
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for Vec<u8> {
    const KIND: ValueKind = ValueKind::Blob;

    fn to_value(&self) -> SqlValue {
        SqlValue::Blob(self.clone())
    }

    fn from_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Blob(b) => Ok(b),
            SqlValue::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: ValueKind = T::KIND;
    const NULLABLE: bool = true;

    fn to_value(&self) -> SqlValue {
        self.as_ref().map_or(SqlValue::Null, FieldValue::to_value)
    }

    fn from_value(value: SqlValue) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}

/// Reads the `F` stored at `ptr`.
///
/// # Safety
///
/// `ptr` must point to a live, aligned, initialized `F`.
pub unsafe fn read_at<F: FieldValue>(ptr: *const u8) -> SqlValue {
    // SAFETY: guaranteed by the caller.
    let field = unsafe { &*ptr.cast::<F>() };
    field.to_value()
}

/// Converts `value` to `F` and stores it at `ptr`, dropping the previous value.
///
/// # Safety
///
/// `ptr` must point to a live, aligned, initialized `F` that is not aliased.
///
/// # Errors
///
/// Returns [`OrmError::Conversion`] if `value` does not fit `F`; the field is
/// left untouched in that case.
pub unsafe fn write_at<F: FieldValue>(ptr: *mut u8, value: SqlValue) -> Result<()> {
    let converted = F::from_value(value)?;
    // SAFETY: guaranteed by the caller.
    unsafe { *ptr.cast::<F>() = converted };
    Ok(())
}
