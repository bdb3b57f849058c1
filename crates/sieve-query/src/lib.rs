//! # sieve-query
//!
//! The query abstraction filter rules are written against.
//!
//! Rules never talk to a database directly. They add predicates to anything
//! implementing [`FilterQuery`]: a standalone [`Condition`] tree, a
//! [`SelectStatement`], or a host application's own query builder. The
//! bundled backends then render a [`SelectStatement`] to parameterized SQL.
//!
//! ## Architecture
//!
//! - [`value`]: [`Value`], the loosely typed data carried by predicates
//! - [`expr`]: [`Predicate`] leaves and [`Condition`] groups
//! - [`query`]: the [`FilterQuery`] capability trait
//! - [`relation`]: [`Relation`] metadata for existence subqueries
//! - [`backend`]: SQL rendering ([`PostgresQueryBuilder`],
//!   [`MySqlQueryBuilder`], [`SqliteQueryBuilder`])
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve_query::{CompareOp, FilterQuery, PostgresQueryBuilder, Relation, SelectStatement, Value};
//!
//! let mut stmt = SelectStatement::new("users")
//! 	.relation(Relation::has_many("phones", "phones", "user_id"));
//!
//! stmt.where_compare("age", CompareOp::LessThanOrEqual, Value::from("18"));
//! stmt.where_has("phones", &mut |q| {
//! 	q.where_like("number", Value::from("31%"));
//! });
//!
//! let (sql, values) = stmt.build(&PostgresQueryBuilder::new()).unwrap();
//! assert_eq!(
//! 	sql,
//! 	r#"SELECT * FROM "users" WHERE "age" <= $1 AND EXISTS (SELECT 1 FROM "phones" WHERE "phones"."user_id" = "users"."id" AND "phones"."number" LIKE $2)"#
//! );
//! assert_eq!(values.len(), 2);
//! ```

pub mod backend;
pub mod error;
pub mod expr;
pub mod query;
pub mod relation;
pub mod select;
pub mod value;

pub use backend::{MySqlQueryBuilder, PostgresQueryBuilder, QueryBuilder, SqliteQueryBuilder};
pub use error::{QueryError, QueryResult};
pub use expr::{CompareOp, Cond, Condition, ConditionExpression, ConditionType, DatePart, Predicate};
pub use query::{FilterQuery, Scope};
pub use relation::{Relation, RelationJoin};
pub use select::SelectStatement;
pub use value::{Value, Values};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::backend::{MySqlQueryBuilder, PostgresQueryBuilder, QueryBuilder, SqliteQueryBuilder};
	pub use crate::expr::{CompareOp, Cond, Condition, DatePart, Predicate};
	pub use crate::query::FilterQuery;
	pub use crate::relation::Relation;
	pub use crate::select::SelectStatement;
	pub use crate::value::Value;
}
