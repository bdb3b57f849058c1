//! # sieve-filter
//!
//! Allow-listed request filters for query builders.
//!
//! Untrusted input such as `contains[name]=wallace&max[age]=18` is turned
//! into predicates on a [`FilterQuery`](sieve_query::FilterQuery), after
//! every (rule, field) pair has been checked against an allow-list.
//! Relation-qualified fields (`phones.number`) are filtered through
//! existence subqueries on the relation.
//!
//! ## Architecture
//!
//! - [`rule`]: the [`Rule`] trait and the built-in rules
//! - [`registry`]: [`RuleRegistry`], rule name resolution
//! - [`path`]: splitting field keys into column and relation
//! - [`allow`]: [`AllowList`] and its [`AllowListGuard`]
//! - [`input`]: raw input sources and the [`FilterRequest`]
//! - [`engine`]: [`Filter`], grouping, validation and application
//! - [`model`]: [`ModelFilter`] declarations
//! - [`settings`]: [`FilterSettings`] loaded from TOML or JSON
//!
//! ## Built-in rules
//!
//! | rule | predicate |
//! |---|---|
//! | `exact`, `min`, `max`, `not_equal` | `=`, `>=`, `<=`, `<>` |
//! | `contains`, `starts_with`, `ends_with` | `LIKE '%v%'`, `LIKE 'v%'`, `LIKE '%v'` |
//! | `in`, `not_in` | `IN (...)`, `NOT IN (...)` |
//! | `has` | relation exists, or not for a falsy value |
//! | `is_null` | `IS NULL`, or `IS NOT NULL` for a falsy value |
//! | `date_min`, `date_max`, `date_exact` | comparison on the date part |
//! | `year_min`, `year_max`, `year_exact` | comparison on the year |
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve_filter::{FilterDeclaration, ModelFilter};
//! use sieve_filter::input::QueryParams;
//! use sieve_query::{PostgresQueryBuilder, Relation, SelectStatement};
//!
//! struct UserFilter;
//!
//! impl ModelFilter for UserFilter {
//! 	fn filterable(&self) -> FilterDeclaration {
//! 		FilterDeclaration::new()
//! 			.field("name", "contains")
//! 			.field("phones.number", "exact")
//! 	}
//! }
//!
//! let params = QueryParams::parse("contains[name]=wal&exact[phones.number]=31").unwrap();
//! let mut query = SelectStatement::new("users")
//! 	.relation(Relation::has_many("phones", "phones", "user_id"));
//!
//! UserFilter.apply(&mut query, &params).unwrap();
//!
//! let (sql, _) = query.build(&PostgresQueryBuilder::new()).unwrap();
//! assert_eq!(
//! 	sql,
//! 	r#"SELECT * FROM "users" WHERE ("name" LIKE $1 AND EXISTS (SELECT 1 FROM "phones" WHERE "phones"."user_id" = "users"."id" AND "phones"."number" = $2))"#
//! );
//! ```

pub mod allow;
pub mod engine;
pub mod error;
pub mod input;
pub mod model;
pub mod path;
pub mod registry;
pub mod rule;
pub mod settings;

pub use allow::{AllowList, AllowListGuard, Permission};
pub use engine::{Filter, FilterCallback, GroupedFilters};
pub use error::{FilterError, FilterResult, RestrictionError};
pub use input::{DataCallback, FilterInput, FilterRequest, InputSource, InputValue, QueryParams, RequestDataExtractor};
pub use model::{FilterDeclaration, Filterable, ModelFilter, ModelFilterComposer};
pub use registry::RuleRegistry;
pub use rule::{RelationRule, Rule, RuleSpec};
pub use settings::FilterSettings;
