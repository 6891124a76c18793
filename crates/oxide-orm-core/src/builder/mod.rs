//! Statement builders and the expression compiler they share.
//!
//! Every statement accumulates its clauses as typed values and compiles them
//! in one pass into a [`Query`]: SQL text terminated by `;` plus the
//! positional arguments in placeholder order.
//!
//! ```ignore
//! use oxide_orm_core::builder::{c, Selector};
//!
//! let query = Selector::<TestModel>::new()
//!     .where_clause(c("age").eq(18).and(c("first_name").eq("Tom")))
//!     .build(&core)?;
//!
//! assert_eq!(query.sql, "SELECT * FROM test_model WHERE (age=?) AND (first_name=?);");
//! ```

mod delete;
mod expr;
mod insert;
mod raw;
mod select;
mod table;
mod update;

use std::sync::Arc;

pub use delete::Deleter;
pub use expr::{
    avg, c, count, max, min, not, raw, sum, Aggregate, Column, Expr, Op, Order, Predicate, RawExpr,
};
pub use insert::{assign, Assignable, Assignment, Inserter, Upsert, UpsertBuilder};
pub use raw::RawQuery;
pub use select::Selector;
pub use table::{Join, JoinBuilder, JoinKind, Subquery, Table, TableReference};
pub use update::Updater;

use crate::error::{OrmError, Result};
use crate::model::Model;
use crate::session::Core;
use crate::value::SqlValue;

/// A compiled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// SQL text, terminated by `;`.
    pub sql: String,
    /// Arguments in placeholder order.
    pub args: Vec<SqlValue>,
}

/// Anything that compiles to a [`Query`].
pub trait QueryBuilder: Send + Sync {
    /// Compiles the statement against the session configuration.
    ///
    /// # Errors
    ///
    /// Returns the first structural or usage error met while compiling.
    fn build(&self, core: &Core) -> Result<Query>;
}

/// Output buffer and argument list for one statement compilation.
///
/// Dialects receive it to render their upsert clause.
pub struct Builder<'a> {
    core: &'a Core,
    model: Arc<Model>,
    sql: String,
    args: Vec<SqlValue>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(core: &'a Core, model: Arc<Model>) -> Self {
        Self {
            core,
            model,
            sql: String::with_capacity(64),
            args: Vec::new(),
        }
    }

    /// Model of the statement's own entity.
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Appends raw SQL text.
    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends a placeholder and binds `value` to it.
    pub fn push_param(&mut self, value: SqlValue) {
        self.sql.push_str(self.core.dialect().parameter_placeholder());
        self.args.push(value);
    }

    /// Appends the column name of a field of the statement's entity.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownField`] if the entity has no such field.
    pub fn push_column(&mut self, field: &str) -> Result<()> {
        let model = Arc::clone(&self.model);
        let field = model
            .field(field)
            .ok_or_else(|| OrmError::UnknownField(field.to_string()))?;
        self.sql.push_str(&field.column);
        Ok(())
    }

    /// Appends the arguments of a nested statement.
    fn extend_args(&mut self, args: Vec<SqlValue>) {
        self.args.extend(args);
    }

    /// Renders a column. `alias` is honoured only in select lists.
    pub(crate) fn build_column(&mut self, column: &Column, alias: bool) -> Result<()> {
        let model = match &column.table {
            None => Arc::clone(&self.model),
            Some(TableReference::Table(table)) => {
                let model = table.model(self.core.registry())?;
                let prefix = table.alias.as_deref().unwrap_or_else(|| model.table_name());
                self.sql.push_str(prefix);
                self.sql.push('.');
                model
            }
            Some(other) => return Err(OrmError::UnsupportedTable(format!("{other:?}"))),
        };

        let field = model
            .field(&column.name)
            .ok_or_else(|| OrmError::UnknownField(column.name.clone()))?;
        self.sql.push_str(&field.column);

        if alias {
            if let Some(alias) = &column.alias {
                self.sql.push_str(" AS ");
                self.sql.push_str(alias);
            }
        }
        if let Some(order) = column.order {
            self.sql.push(' ');
            self.sql.push_str(order.as_str());
        }
        Ok(())
    }

    /// Renders an expression in predicate context (WHERE, HAVING, ON).
    pub(crate) fn build_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Column(column) => self.build_column(column, false),
            Expr::Value(value) => {
                self.push_param(value.clone());
                Ok(())
            }
            Expr::Predicate(predicate) => self.build_predicate(predicate),
            Expr::Raw(raw) => {
                self.sql.push('(');
                self.sql.push_str(&raw.sql);
                self.sql.push(')');
                self.args.extend(raw.args.iter().cloned());
                Ok(())
            }
            Expr::Aggregate(aggregate) => self.build_aggregate(aggregate, false),
        }
    }

    fn build_operand(&mut self, expr: &Expr) -> Result<()> {
        if let Expr::Predicate(predicate) = expr {
            self.sql.push('(');
            self.build_predicate(predicate)?;
            self.sql.push(')');
            Ok(())
        } else {
            self.build_expr(expr)
        }
    }

    pub(crate) fn build_predicate(&mut self, predicate: &Predicate) -> Result<()> {
        if let Some(left) = &predicate.left {
            self.build_operand(left)?;
        }
        if let Some(op) = predicate.op {
            if op.is_keyword() {
                self.sql.push(' ');
                self.sql.push_str(op.as_str());
                self.sql.push(' ');
            } else {
                self.sql.push_str(op.as_str());
            }
        }
        if let Some(right) = &predicate.right {
            self.build_operand(right)?;
        }
        Ok(())
    }

    /// Renders ` <keyword> p1 AND p2 ...` when `predicates` is not empty.
    pub(crate) fn build_clause(&mut self, keyword: &str, predicates: &[Predicate]) -> Result<()> {
        let mut iter = predicates.iter().cloned();
        let Some(first) = iter.next() else {
            return Ok(());
        };
        let folded = iter.fold(first, Predicate::and);
        self.sql.push(' ');
        self.sql.push_str(keyword);
        self.sql.push(' ');
        self.build_predicate(&folded)
    }

    fn build_aggregate(&mut self, aggregate: &Aggregate, alias: bool) -> Result<()> {
        self.sql.push_str(aggregate.func);
        self.sql.push('(');
        self.build_column(&aggregate.arg, false)?;
        self.sql.push(')');
        if alias {
            if let Some(alias) = &aggregate.alias {
                self.sql.push_str(" AS ");
                self.sql.push_str(alias);
            }
        }
        Ok(())
    }

    /// Renders one item of a select list.
    pub(crate) fn build_selectable(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Column(column) => self.build_column(column, true),
            Expr::Aggregate(aggregate) => self.build_aggregate(aggregate, true),
            Expr::Raw(raw) => {
                self.sql.push_str(&raw.sql);
                self.args.extend(raw.args.iter().cloned());
                Ok(())
            }
            Expr::Value(_) | Expr::Predicate(_) => {
                Err(OrmError::UnsupportedExpression(format!("{expr:?}")))
            }
        }
    }

    /// Renders a FROM target; `None` is the statement's own table.
    pub(crate) fn build_table(&mut self, table: Option<&TableReference>) -> Result<()> {
        match table {
            None => {
                let model = Arc::clone(&self.model);
                self.sql.push_str(model.table_name());
            }
            Some(TableReference::Table(table)) => {
                let model = table.model(self.core.registry())?;
                self.sql.push_str(model.table_name());
                if let Some(alias) = &table.alias {
                    self.sql.push_str(" AS ");
                    self.sql.push_str(alias);
                }
            }
            Some(TableReference::Join(join)) => self.build_join(join)?,
            Some(TableReference::Subquery(subquery)) => {
                let inner = subquery.builder.build(self.core)?;
                self.sql.push('(');
                self.sql.push_str(inner.sql.trim_end_matches(';'));
                self.sql.push_str(") AS ");
                self.sql.push_str(&subquery.alias);
                self.extend_args(inner.args);
            }
        }
        Ok(())
    }

    fn build_join(&mut self, join: &Join) -> Result<()> {
        self.sql.push('(');
        self.build_table(Some(&join.left))?;
        self.sql.push(' ');
        self.sql.push_str(join.kind.as_str());
        self.sql.push(' ');
        self.build_table(Some(&join.right))?;

        if !join.using.is_empty() {
            // USING columns resolve against the right child when it is an
            // entity table, otherwise against the statement's entity.
            let model = match &join.right {
                TableReference::Table(table) => table.model(self.core.registry())?,
                _ => Arc::clone(&self.model),
            };
            self.sql.push_str(" USING (");
            for (i, name) in join.using.iter().enumerate() {
                if i > 0 {
                    self.sql.push(',');
                }
                let field = model
                    .field(name)
                    .ok_or_else(|| OrmError::UnknownField(name.clone()))?;
                self.sql.push_str(&field.column);
            }
            self.sql.push(')');
        }

        self.build_clause("ON", &join.on)?;
        self.sql.push(')');
        Ok(())
    }

    /// Terminates the statement.
    pub(crate) fn finish(mut self) -> Query {
        self.sql.push(';');
        Query {
            sql: self.sql,
            args: self.args,
        }
    }
}
