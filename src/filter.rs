//! Request filters, allow-lists and model filter declarations.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "filter")]
//! # {
//! use sieve::filter::{Filter, Permission};
//!
//! let mut filter = Filter::new();
//! filter.allow([("name", Permission::rules(["contains"]))].into_iter().collect());
//! assert!(filter.allow_list().check("exact", "name").is_err());
//! # }
//! ```

#[cfg(feature = "filter")]
pub use sieve_filter::*;
