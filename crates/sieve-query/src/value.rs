//! Values bound to filter predicates.
//!
//! Filter input arrives as loosely typed data (query strings, JSON bodies),
//! so [`Value`] models exactly the shapes that input can take rather than
//! the full range of SQL column types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar or list value carried by a predicate.
///
/// ## Emptiness
///
/// Only an empty string and an empty list are considered empty. `0`, `0.0`,
/// `false` and `"0"` are ordinary values.
///
/// ## Example
///
/// ```rust
/// use sieve_query::Value;
///
/// assert!(Value::from("").is_empty());
/// assert!(Value::List(vec![]).is_empty());
/// assert!(!Value::from(0).is_empty());
/// assert!(!Value::from("0").is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	/// SQL `NULL`
	Null,
	/// Boolean value
	Bool(bool),
	/// 64-bit signed integer
	Int(i64),
	/// 64-bit floating point
	Float(f64),
	/// String value
	String(String),
	/// Ordered list of values, used by membership predicates
	List(Vec<Value>),
}

impl Value {
	/// Returns `true` for `""` and `[]`.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		match self {
			Self::String(s) => s.is_empty(),
			Self::List(items) => items.is_empty(),
			_ => false,
		}
	}

	/// Returns `true` if this value is null.
	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Returns the string slice if this is a string value.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the value as a list.
	///
	/// Scalars become a one-element list; a list is returned as is.
	#[must_use]
	pub fn to_list(&self) -> Vec<Value> {
		match self {
			Self::List(items) => items.clone(),
			other => vec![other.clone()],
		}
	}

	/// Convert this value to a SQL literal suitable for inlining.
	///
	/// Used by `to_string` renderings of statements, which are meant for
	/// debugging and logging rather than execution.
	///
	/// # Example
	///
	/// ```rust
	/// use sieve_query::Value;
	///
	/// assert_eq!(Value::from(42).to_sql_literal(), "42");
	/// assert_eq!(Value::Null.to_sql_literal(), "NULL");
	/// assert_eq!(Value::from("it's").to_sql_literal(), "'it''s'");
	/// ```
	#[must_use]
	pub fn to_sql_literal(&self) -> String {
		match self {
			Self::Null => "NULL".to_string(),
			Self::Bool(true) => "TRUE".to_string(),
			Self::Bool(false) => "FALSE".to_string(),
			Self::Int(v) => v.to_string(),
			Self::Float(v) => v.to_string(),
			Self::String(s) => format!("'{}'", s.replace('\'', "''")),
			Self::List(items) => {
				let inner: Vec<String> = items.iter().map(Value::to_sql_literal).collect();
				format!("({})", inner.join(", "))
			}
		}
	}
}

/// Plain-text rendering, used to build LIKE patterns from filter input.
impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => Ok(()),
			Self::Bool(v) => write!(f, "{}", v),
			Self::Int(v) => write!(f, "{}", v),
			Self::Float(v) => write!(f, "{}", v),
			Self::String(s) => f.write_str(s),
			Self::List(items) => {
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(",")?;
					}
					write!(f, "{}", item)?;
				}
				Ok(())
			}
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Self::Int(i64::from(v))
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::String(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::String(v)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(items: Vec<T>) -> Self {
		Self::List(items.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map_or(Self::Null, Into::into)
	}
}

impl TryFrom<serde_json::Value> for Value {
	type Error = serde_json::Error;

	/// Objects are rejected; every other JSON shape has a counterpart.
	fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
		serde_json::from_value(value)
	}
}

/// Parameter values collected while rendering a statement, in placeholder
/// order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Values(pub Vec<Value>);

impl Values {
	/// Append a value.
	pub fn push(&mut self, value: Value) {
		self.0.push(value);
	}

	/// Number of collected values.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no value was collected.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterate over the collected values.
	pub fn iter(&self) -> impl Iterator<Item = &Value> {
		self.0.iter()
	}

	/// Returns `true` if an equal value was collected.
	pub fn contains(&self, value: &Value) -> bool {
		self.0.contains(value)
	}
}

impl IntoIterator for Values {
	type Item = Value;
	type IntoIter = std::vec::IntoIter<Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
