//! # oxide-orm
//!
//! Typed statements for plain Rust structs, executed on SQLite through sqlx.
//!
//! This crate provides:
//! - [`DB`], a pooled database implementing the core `Session` contract
//! - [`Tx`] and the [`DB::do_tx`] transaction closure
//! - Query log, slow query and timeout middlewares
//! - Re-exports of the statement builders and `#[derive(Entity)]`
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_orm::builder::{c, Inserter, Selector};
//! use oxide_orm::{Entity, DB};
//!
//! #[derive(Debug, Default, Entity)]
//! struct User {
//!     id: i64,
//!     first_name: String,
//!     age: i8,
//! }
//!
//! async fn example() -> oxide_orm::Result<()> {
//!     let db = DB::open("sqlite::memory:").await?;
//!
//!     Inserter::new()
//!         .value(User { id: 1, first_name: "Tom".into(), age: 18 })
//!         .exec(&db)
//!         .await?;
//!
//!     let adults = Selector::<User>::new()
//!         .where_clause(c("age").gt(17))
//!         .get_multi(&db)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Transactions
//!
//! ```ignore
//! db.do_tx(|tx| Box::pin(async move {
//!     Inserter::new().value(user).exec(tx).await?;
//!     Deleter::<User>::new().where_clause(c("age").lt(18)).exec(tx).await?;
//!     Ok(())
//! }))
//! .await?;
//! ```

mod bind;
mod db;
pub mod middleware;
mod row;
mod tx;

pub use db::{DbOptions, DB};
pub use row::SqliteRow;
pub use tx::Tx;

pub use oxide_orm_core::{
    builder, dialect, AccessStrategy, BoxFuture, Core, Dialect, Entity, ExecResult,
    GenericDialect, MemoryRow, Middleware, ModelOption, MySqlDialect, Next, OrmError, Query,
    QueryBuilder, QueryContext, QueryOutput, QueryResult, QueryType, Registry, Result, Row,
    Session, SqlValue, SqliteDialect, ToSqlValue,
};
pub use oxide_orm_derive::Entity;
