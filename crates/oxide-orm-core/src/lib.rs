//! # oxide-orm-core
//!
//! Typed statement building and row mapping for plain Rust structs.
//!
//! This crate provides:
//! - A registry that derives table metadata from `#[derive(Entity)]` structs
//! - Two interchangeable ways to read and write fields: a generated
//!   name-dispatched accessor and a direct offset accessor
//! - Builders for SELECT, INSERT (with upsert), UPDATE and DELETE that compile
//!   to SQL text plus positional arguments
//! - Joins and subqueries as table sources
//! - Dialects for `ON CONFLICT` and `ON DUPLICATE KEY UPDATE` upserts
//! - A middleware chain wrapped around every dispatched statement
//!
//! Running statements needs a [`Session`]; `oxide-orm` ships one over SQLite.
//!
//! ## Building statements
//!
//! ```ignore
//! use oxide_orm_core::builder::{c, Selector};
//! use oxide_orm_core::{Core, Entity, QueryBuilder};
//!
//! #[derive(Entity, Default)]
//! struct TestModel {
//!     id: i64,
//!     first_name: String,
//!     age: i8,
//! }
//!
//! let query = Selector::<TestModel>::new()
//!     .where_clause(c("age").eq(18))
//!     .build(&Core::new())?;
//!
//! assert_eq!(query.sql, "SELECT * FROM test_model WHERE age=?;");
//! ```

pub mod accessor;
pub mod builder;
pub mod dialect;
pub mod error;
mod executor;
pub mod middleware;
pub mod model;
pub mod row;
pub mod session;
pub mod value;

pub use accessor::{AccessStrategy, ValueReader, ValueWriter};
pub use builder::{Query, QueryBuilder};
pub use dialect::{Dialect, GenericDialect, MySqlDialect, SqliteDialect};
pub use error::{BoxError, OrmError, Result};
pub use middleware::{Middleware, Next, QueryContext, QueryOutput, QueryResult, QueryType};
pub use model::{Entity, Field, FieldDescriptor, Model, ModelOption, Registry};
pub use row::{MemoryRow, Row, ScanSlot};
pub use session::{BoxFuture, BoxRow, Core, ExecResult, Rows, Session};
pub use value::{read_at, write_at, FieldValue, SqlValue, ToSqlValue, ValueKind};
