//! Adapter from sqlx rows to the core [`Row`] cursor.

use oxide_orm_core::{BoxRow, OrmError, Result, Row, Rows, ScanSlot, SqlValue, ValueKind};
use sqlx::sqlite::SqliteRow as RawRow;
use sqlx::{Column, Row as _};

/// One SQLite result row.
pub struct SqliteRow(RawRow);

impl SqliteRow {
    /// Wraps a row fetched through sqlx.
    #[must_use]
    pub const fn new(row: RawRow) -> Self {
        Self(row)
    }

    /// Returns the underlying sqlx row.
    #[must_use]
    pub fn into_inner(self) -> RawRow {
        self.0
    }
}

/// Boxes fetched rows for the session contract.
pub(crate) fn into_rows(rows: Vec<RawRow>) -> Rows {
    rows.into_iter()
        .map(|row| Box::new(SqliteRow(row)) as Box<dyn Row + Send>)
        .collect()
}

/// Boxes the first row of a result, or fails with [`OrmError::NoRows`].
pub(crate) fn first_row(row: Option<RawRow>) -> Result<BoxRow> {
    row.map(|row| Box::new(SqliteRow(row)) as BoxRow)
        .ok_or(OrmError::NoRows)
}

impl SqliteRow {
    fn decode(&self, index: usize, kind: ValueKind) -> Result<SqlValue> {
        let row = &self.0;
        let value = match kind {
            ValueKind::Bool => row
                .try_get::<Option<bool>, _>(index)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Bool)),
            ValueKind::Int => row
                .try_get::<Option<i64>, _>(index)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Int)),
            ValueKind::Float => row
                .try_get::<Option<f64>, _>(index)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Float)),
            ValueKind::Text => row
                .try_get::<Option<String>, _>(index)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Text)),
            ValueKind::Blob => row
                .try_get::<Option<Vec<u8>>, _>(index)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Blob)),
        };
        value.map_err(OrmError::database)
    }
}

impl Row for SqliteRow {
    fn columns(&self) -> Vec<String> {
        self.0
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect()
    }

    fn scan(&self, slots: &mut [ScanSlot]) -> Result<()> {
        let width = self.0.columns().len();
        if slots.len() != width {
            return Err(OrmError::Conversion(format!(
                "expected {width} destinations, got {}",
                slots.len()
            )));
        }
        for (index, slot) in slots.iter_mut().enumerate() {
            let value = self.decode(index, slot.kind())?;
            if value.is_null() && !slot.nullable() {
                let name = self.0.columns()[index].name().to_string();
                return Err(OrmError::Conversion(format!(
                    "NULL in column {name} scanned into non-nullable {}",
                    slot.kind()
                )));
            }
            slot.set(value);
        }
        Ok(())
    }
}
