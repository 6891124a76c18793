//! Error types shared by the builders, the registry and every session backend.

use std::time::Duration;

use thiserror::Error;

/// Boxed transport error carried by [`OrmError::Database`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while building or executing a statement.
#[derive(Debug, Error)]
pub enum OrmError {
    /// A field name that the model does not declare.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A result column that maps to no field of the model.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Two fields mapped to the same column.
    #[error("column {column} is already mapped to field {field}")]
    DuplicateColumn {
        /// The contested column name.
        column: String,
        /// Field that already owns the column.
        field: String,
    },

    /// A field tag pair that is not of the form `key=value`.
    #[error("invalid tag content: {0}")]
    InvalidTag(String),

    /// An expression that cannot appear where it was used.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// A table reference that cannot own a column.
    #[error("unsupported table reference: {0}")]
    UnsupportedTable(String),

    /// An upsert assignment that is neither a bare column nor a column/value pair.
    #[error("unsupported assignable: {0}")]
    UnsupportedAssignable(String),

    /// A model built for one type was used to access a value of another.
    #[error("model for {expected} used with {found}")]
    ModelMismatch {
        /// Type the model was built for.
        expected: &'static str,
        /// Type of the value being accessed.
        found: &'static str,
    },

    /// INSERT with no rows.
    #[error("insert requires at least one row")]
    InsertZeroRows,

    /// HAVING without GROUP BY.
    #[error("having requires group by")]
    NoGroupUseHaving,

    /// ORDER BY column without ASC/DESC.
    #[error("order by column requires a direction")]
    NoOrderByDirection,

    /// UPDATE without a value record.
    #[error("update requires a value")]
    MissingUpdateValue,

    /// The query returned no rows.
    #[error("no rows in result set")]
    NoRows,

    /// A stored value could not be converted to the field type.
    #[error("value conversion failed: {0}")]
    Conversion(String),

    /// A middleware replaced the result with one of another shape.
    #[error("unexpected query output, expected {0}")]
    UnexpectedOutput(&'static str),

    /// Error returned by the underlying connection or driver.
    #[error("database error: {0}")]
    Database(#[source] BoxError),

    /// The statement did not finish within the configured limit.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// The transaction was already committed or rolled back.
    #[error("transaction already closed")]
    TransactionClosed,

    /// A transaction closure panicked.
    #[error("transaction closure panicked: {0}")]
    Panicked(String),

    /// Rolling back after a failed or panicking transaction closure failed too.
    #[error("rollback failed ({rollback}) after: {business}, panicked: {panicked}")]
    FailedToRollback {
        /// Error returned (or panic raised) by the closure.
        business: Box<OrmError>,
        /// Error returned by the rollback itself.
        rollback: Box<OrmError>,
        /// Whether the closure panicked.
        panicked: bool,
    },
}

impl OrmError {
    /// Wraps a driver error.
    pub fn database(err: impl Into<BoxError>) -> Self {
        Self::Database(err.into())
    }
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
