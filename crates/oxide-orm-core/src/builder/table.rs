//! Table references: entity tables, joins and subqueries.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use super::expr::{Column, Predicate};
use super::QueryBuilder;
use crate::error::Result;
use crate::model::{Entity, Model, Registry};

/// Something a statement reads from.
#[derive(Debug, Clone)]
pub enum TableReference {
    /// The table of an entity type.
    Table(Table),
    /// Two references joined together.
    Join(Box<Join>),
    /// A nested SELECT.
    Subquery(Subquery),
}

/// The table of an entity type, optionally aliased.
#[derive(Clone)]
pub struct Table {
    resolve: fn(&Registry) -> Result<Arc<Model>>,
    entity: &'static str,
    pub(crate) alias: Option<String>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("entity", &self.entity)
            .field("alias", &self.alias)
            .finish()
    }
}

fn resolve_model<T: Entity>(registry: &Registry) -> Result<Arc<Model>> {
    registry.get::<T>()
}

impl Table {
    /// References the table of `T`.
    #[must_use]
    pub fn of<T: Entity>() -> Self {
        Self {
            resolve: resolve_model::<T>,
            entity: type_name::<T>(),
            alias: None,
        }
    }

    /// Aliases the table: `t AS alias`.
    #[must_use]
    pub fn as_(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// A column qualified by this table.
    #[must_use]
    pub fn c(&self, name: &str) -> Column {
        Column::owned_by(name, TableReference::Table(self.clone()))
    }

    pub(crate) fn model(&self, registry: &Registry) -> Result<Arc<Model>> {
        (self.resolve)(registry)
    }
}

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
}

impl JoinKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
        }
    }
}

/// A join of two table references.
#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) left: TableReference,
    pub(crate) right: TableReference,
    pub(crate) kind: JoinKind,
    pub(crate) using: Vec<String>,
    pub(crate) on: Vec<Predicate>,
}

/// A join waiting for its `ON` or `USING` clause.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    left: TableReference,
    right: TableReference,
    kind: JoinKind,
}

impl JoinBuilder {
    /// Finishes the join with `ON p1 AND p2 ...`.
    #[must_use]
    pub fn on(self, predicates: impl IntoIterator<Item = Predicate>) -> Join {
        Join {
            left: self.left,
            right: self.right,
            kind: self.kind,
            using: Vec::new(),
            on: predicates.into_iter().collect(),
        }
    }

    /// Finishes the join with `USING (col, ...)`.
    #[must_use]
    pub fn using<S: AsRef<str>>(self, columns: impl IntoIterator<Item = S>) -> Join {
        Join {
            left: self.left,
            right: self.right,
            kind: self.kind,
            using: columns.into_iter().map(|c| c.as_ref().to_string()).collect(),
            on: Vec::new(),
        }
    }
}

/// A SELECT used as a table.
#[derive(Clone)]
pub struct Subquery {
    pub(crate) builder: Arc<dyn QueryBuilder>,
    pub(crate) alias: String,
}

impl fmt::Debug for Subquery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subquery").field("alias", &self.alias).finish()
    }
}

impl Subquery {
    pub(crate) fn new(builder: Arc<dyn QueryBuilder>, alias: &str) -> Self {
        Self {
            builder,
            alias: alias.to_string(),
        }
    }

    /// A column owned by the subquery.
    ///
    /// The subquery carries no model, so compiling such a column fails with
    /// [`OrmError::UnsupportedTable`](crate::OrmError::UnsupportedTable).
    #[must_use]
    pub fn c(&self, name: &str) -> Column {
        Column::owned_by(name, TableReference::Subquery(self.clone()))
    }
}

macro_rules! joinable {
    ($($t:ty),* $(,)?) => {
        $(
            impl $t {
                /// Starts an inner join with `right`.
                #[must_use]
                pub fn join(self, right: impl Into<TableReference>) -> JoinBuilder {
                    JoinBuilder {
                        left: self.into(),
                        right: right.into(),
                        kind: JoinKind::Inner,
                    }
                }

                /// Starts a left join with `right`.
                #[must_use]
                pub fn left_join(self, right: impl Into<TableReference>) -> JoinBuilder {
                    JoinBuilder {
                        left: self.into(),
                        right: right.into(),
                        kind: JoinKind::Left,
                    }
                }

                /// Starts a right join with `right`.
                #[must_use]
                pub fn right_join(self, right: impl Into<TableReference>) -> JoinBuilder {
                    JoinBuilder {
                        left: self.into(),
                        right: right.into(),
                        kind: JoinKind::Right,
                    }
                }
            }
        )*
    };
}

joinable!(Table, Join, Subquery);

impl From<Table> for TableReference {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<Join> for TableReference {
    fn from(join: Join) -> Self {
        Self::Join(Box::new(join))
    }
}

impl From<Subquery> for TableReference {
    fn from(subquery: Subquery) -> Self {
        Self::Subquery(subquery)
    }
}
