//! # Sieve
//!
//! Allow-listed filtering of untrusted request input into SQL query
//! predicates.
//!
//! Incoming parameters such as `contains[name]=wallace&max[age]=18` name a
//! rule and a field. Every (rule, field) pair is checked against an
//! allow-list before it touches the query, and fields qualified with a
//! relation path (`phones.number`) become existence subqueries.
//!
//! ## Feature Flags
//!
//! - `filter` (default) - The filter engine from `sieve-filter`. Without it
//!   only the query layer is available.
//!
//! ## Quick Example
//!
//! ```rust
//! # #[cfg(feature = "filter")]
//! # {
//! use sieve::prelude::*;
//!
//! let params = QueryParams::parse("max[age]=18&contains[name]=wallace").unwrap();
//! let mut query = SelectStatement::new("users");
//!
//! Filter::new().apply(&mut query, &params).unwrap();
//!
//! let (sql, values) = query.build(&PostgresQueryBuilder::new()).unwrap();
//! assert_eq!(sql, r#"SELECT * FROM "users" WHERE ("age" <= $1 AND "name" LIKE $2)"#);
//! assert_eq!(values.len(), 2);
//! # }
//! ```

pub mod filter;
pub mod query;

/// Re-export commonly used types
pub mod prelude {
	pub use sieve_query::prelude::*;

	#[cfg(feature = "filter")]
	pub use sieve_filter::input::QueryParams;
	#[cfg(feature = "filter")]
	pub use sieve_filter::{
		AllowList, Filter, FilterDeclaration, FilterError, FilterRequest, FilterResult, ModelFilter,
		ModelFilterComposer, Permission, RuleSpec,
	};
}
