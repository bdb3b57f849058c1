//! SQL Writer helper for constructing SQL strings
//!
//! This module provides `SqlWriter` which keeps the SQL text and the bound
//! values in step while a statement is rendered.

use crate::value::{Value, Values};

/// SQL Writer for constructing SQL strings
///
/// In inline mode values are written as SQL literals instead of placeholders
/// and nothing is collected.
///
/// # Examples
///
/// ```rust
/// use sieve_query::backend::SqlWriter;
/// use sieve_query::Value;
///
/// let mut writer = SqlWriter::new();
/// writer.push_identifier("age", |s| format!("\"{}\"", s));
/// writer.push(" >= ");
/// writer.push_value(Value::from(18), |i| format!("${}", i));
///
/// let (sql, values) = writer.finish();
/// assert_eq!(sql, "\"age\" >= $1");
/// assert_eq!(values.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SqlWriter {
	sql: String,
	values: Values,
	/// Current parameter index (1-based for PostgreSQL)
	param_index: usize,
	inline: bool,
}

impl SqlWriter {
	/// Create a new SQL writer
	pub fn new() -> Self {
		Self {
			sql: String::new(),
			values: Values::default(),
			param_index: 1,
			inline: false,
		}
	}

	/// Create a writer that inlines values as literals.
	pub fn inline() -> Self {
		Self {
			inline: true,
			..Self::new()
		}
	}

	/// Push a string to SQL
	pub fn push(&mut self, s: &str) {
		self.sql.push_str(s);
	}

	/// Push an identifier (escaped)
	pub fn push_identifier<F>(&mut self, ident: &str, escape_fn: F)
	where
		F: FnOnce(&str) -> String,
	{
		self.sql.push_str(&escape_fn(ident));
	}

	/// Push a value placeholder and collect value
	///
	/// # Returns
	///
	/// * `Some(index)` - The parameter index used for a non-NULL value
	/// * `None` - NULL value or inline mode (no parameter consumed)
	///
	/// NULL is always inlined so it never binds against a typed placeholder.
	pub fn push_value<F>(&mut self, value: Value, format_fn: F) -> Option<usize>
	where
		F: FnOnce(usize) -> String,
	{
		if value.is_null() || self.inline {
			self.sql.push_str(&value.to_sql_literal());
			return None;
		}

		let index = self.param_index;
		self.sql.push_str(&format_fn(index));
		self.values.push(value);
		self.param_index += 1;
		Some(index)
	}

	/// Push a list of items with a separator
	pub fn push_list<I, T, F>(&mut self, items: I, separator: &str, mut f: F)
	where
		I: IntoIterator<Item = T>,
		F: FnMut(&mut Self, T),
	{
		let mut first = true;
		for item in items {
			if !first {
				self.sql.push_str(separator);
			}
			f(self, item);
			first = false;
		}
	}

	/// Same as [`push_list`](Self::push_list) for fallible item writers.
	pub fn try_push_list<I, T, E, F>(&mut self, items: I, separator: &str, mut f: F) -> Result<(), E>
	where
		I: IntoIterator<Item = T>,
		F: FnMut(&mut Self, T) -> Result<(), E>,
	{
		let mut first = true;
		for item in items {
			if !first {
				self.sql.push_str(separator);
			}
			f(self, item)?;
			first = false;
		}
		Ok(())
	}

	/// Get current SQL string
	pub fn sql(&self) -> &str {
		&self.sql
	}

	/// Get collected values
	pub fn values(&self) -> &Values {
		&self.values
	}

	/// Consume writer and return (SQL, Values)
	pub fn finish(self) -> (String, Values) {
		(self.sql, self.values)
	}

	/// Convert to string (consuming self).
	pub fn into_string(self) -> String {
		self.sql
	}
}

impl Default for SqlWriter {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sql_writer_value_postgres() {
		let mut writer = SqlWriter::new();
		writer.push_value(Value::Int(42), |i| format!("${}", i));
		writer.push(" ");
		writer.push_value(Value::from("test"), |i| format!("${}", i));

		assert_eq!(writer.sql(), "$1 $2");
		assert_eq!(writer.values().len(), 2);
	}

	#[test]
	fn test_sql_writer_value_mysql() {
		let mut writer = SqlWriter::new();
		writer.push_value(Value::Int(42), |_| "?".to_string());
		writer.push(" ");
		writer.push_value(Value::from("test"), |_| "?".to_string());

		assert_eq!(writer.sql(), "? ?");
		assert_eq!(writer.values().len(), 2);
	}

	#[test]
	fn test_sql_writer_null_is_inlined() {
		let mut writer = SqlWriter::new();
		let index = writer.push_value(Value::Null, |i| format!("${}", i));

		assert_eq!(index, None);
		assert_eq!(writer.sql(), "NULL");
		assert!(writer.values().is_empty());
	}

	#[test]
	fn test_sql_writer_inline_mode() {
		let mut writer = SqlWriter::inline();
		writer.push_value(Value::from("it's"), |i| format!("${}", i));

		let (sql, values) = writer.finish();
		assert_eq!(sql, "'it''s'");
		assert!(values.is_empty());
	}

	#[test]
	fn test_sql_writer_list() {
		let mut writer = SqlWriter::new();
		writer.push_list(vec!["a", "b", "c"], ", ", |w, item| {
			w.push_identifier(item, |s| format!("\"{}\"", s));
		});

		assert_eq!(writer.sql(), "\"a\", \"b\", \"c\"");
	}
}
