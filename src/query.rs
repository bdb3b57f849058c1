//! Query representation and SQL rendering.
//!
//! This module provides access to the predicate model, the
//! [`FilterQuery`](sieve_query::FilterQuery) capability and the bundled
//! PostgreSQL, MySQL and SQLite backends.
//!
//! # Examples
//!
//! ```rust
//! use sieve::query::{PostgresQueryBuilder, SelectStatement};
//!
//! let (sql, _) = SelectStatement::new("users")
//! 	.build(&PostgresQueryBuilder::new())
//! 	.unwrap();
//! assert_eq!(sql, r#"SELECT * FROM "users""#);
//! ```

pub use sieve_query::*;
