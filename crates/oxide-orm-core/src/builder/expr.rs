//! Expression tree: columns, values, predicates, raw fragments and aggregates.

use super::table::TableReference;
use crate::value::{SqlValue, ToSqlValue};

/// Any node that compiles to a SQL fragment.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A column of a table.
    Column(Column),
    /// A literal bound as a parameter.
    Value(SqlValue),
    /// A binary or unary predicate.
    Predicate(Box<Predicate>),
    /// A raw SQL fragment with its own arguments.
    Raw(RawExpr),
    /// An aggregate function call.
    Aggregate(Aggregate),
}

/// Predicate operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `NOT`
    Not,
}

impl Op {
    /// Returns the SQL token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }

    /// Word operators are padded with spaces when rendered.
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Not)
    }
}

/// A boolean expression.
///
/// `NOT` has no left operand; a raw predicate has neither operator nor right
/// operand.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub(crate) left: Option<Expr>,
    pub(crate) op: Option<Op>,
    pub(crate) right: Option<Expr>,
}

impl Predicate {
    fn binary(left: Expr, op: Op, right: Expr) -> Self {
        Self {
            left: Some(left),
            op: Some(op),
            right: Some(right),
        }
    }

    /// Combines two predicates with `AND`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self.into(), Op::And, other.into())
    }

    /// Combines two predicates with `OR`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::binary(self.into(), Op::Or, other.into())
    }
}

/// Negates a predicate.
#[must_use]
pub fn not(p: Predicate) -> Predicate {
    Predicate {
        left: None,
        op: Some(Op::Not),
        right: Some(p.into()),
    }
}

/// Sort direction of an ORDER BY column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

impl Order {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A column referenced by its Rust field name.
#[derive(Debug, Clone)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) table: Option<TableReference>,
    pub(crate) alias: Option<String>,
    pub(crate) order: Option<Order>,
}

/// Creates a column of the statement's own entity.
#[must_use]
pub fn c(name: &str) -> Column {
    Column {
        name: name.to_string(),
        table: None,
        alias: None,
        order: None,
    }
}

impl Column {
    pub(crate) fn owned_by(name: &str, table: TableReference) -> Self {
        Self {
            table: Some(table),
            ..c(name)
        }
    }

    /// Returns the Rust field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders `AS alias` when selected.
    #[must_use]
    pub fn as_(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Sorts ascending in ORDER BY.
    #[must_use]
    pub fn asc(mut self) -> Self {
        self.order = Some(Order::Asc);
        self
    }

    /// Sorts descending in ORDER BY.
    #[must_use]
    pub fn desc(mut self) -> Self {
        self.order = Some(Order::Desc);
        self
    }

    /// `column = rhs`
    #[must_use]
    pub fn eq(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::binary(self.into(), Op::Eq, rhs.into())
    }

    /// `column > rhs`
    #[must_use]
    pub fn gt(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::binary(self.into(), Op::Gt, rhs.into())
    }

    /// `column < rhs`
    #[must_use]
    pub fn lt(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::binary(self.into(), Op::Lt, rhs.into())
    }

    /// True for a plain column of the statement's entity with no alias or
    /// sort order.
    pub(crate) const fn is_bare(&self) -> bool {
        self.table.is_none() && self.alias.is_none() && self.order.is_none()
    }
}

/// A raw SQL fragment with positional arguments.
#[derive(Debug, Clone)]
pub struct RawExpr {
    pub(crate) sql: String,
    pub(crate) args: Vec<SqlValue>,
}

/// Creates a raw fragment.
#[must_use]
pub fn raw(sql: &str) -> RawExpr {
    RawExpr {
        sql: sql.to_string(),
        args: Vec::new(),
    }
}

impl RawExpr {
    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl ToSqlValue) -> Self {
        self.args.push(value.to_sql_value());
        self
    }

    /// Uses the fragment as a predicate, rendered inside parentheses.
    #[must_use]
    pub fn as_predicate(self) -> Predicate {
        Predicate {
            left: Some(Expr::Raw(self)),
            op: None,
            right: None,
        }
    }
}

/// An aggregate function over one column.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub(crate) func: &'static str,
    pub(crate) arg: Column,
    pub(crate) alias: Option<String>,
}

impl Aggregate {
    const fn new(func: &'static str, column: Column) -> Self {
        Self {
            func,
            arg: column,
            alias: None,
        }
    }

    /// Renders `AS alias` when selected.
    #[must_use]
    pub fn as_(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// `FUNC(col) = rhs`
    #[must_use]
    pub fn eq(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::binary(self.into(), Op::Eq, rhs.into())
    }

    /// `FUNC(col) > rhs`
    #[must_use]
    pub fn gt(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::binary(self.into(), Op::Gt, rhs.into())
    }

    /// `FUNC(col) < rhs`
    #[must_use]
    pub fn lt(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::binary(self.into(), Op::Lt, rhs.into())
    }
}

/// `AVG(col)`
#[must_use]
pub fn avg(column: Column) -> Aggregate {
    Aggregate::new("AVG", column)
}

/// `SUM(col)`
#[must_use]
pub fn sum(column: Column) -> Aggregate {
    Aggregate::new("SUM", column)
}

/// `COUNT(col)`
#[must_use]
pub fn count(column: Column) -> Aggregate {
    Aggregate::new("COUNT", column)
}

/// `MAX(col)`
#[must_use]
pub fn max(column: Column) -> Aggregate {
    Aggregate::new("MAX", column)
}

/// `MIN(col)`
#[must_use]
pub fn min(column: Column) -> Aggregate {
    Aggregate::new("MIN", column)
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<Predicate> for Expr {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(Box::new(predicate))
    }
}

impl From<RawExpr> for Expr {
    fn from(raw: RawExpr) -> Self {
        Self::Raw(raw)
    }
}

impl From<Aggregate> for Expr {
    fn from(aggregate: Aggregate) -> Self {
        Self::Aggregate(aggregate)
    }
}

impl From<SqlValue> for Expr {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

impl<T: ToSqlValue> From<Option<T>> for Expr {
    fn from(value: Option<T>) -> Self {
        Self::Value(value.to_sql_value())
    }
}

macro_rules! value_expr {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Expr {
                fn from(value: $t) -> Self {
                    Self::Value(value.to_sql_value())
                }
            }
        )*
    };
}

value_expr!(bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, String, &str, Vec<u8>);
