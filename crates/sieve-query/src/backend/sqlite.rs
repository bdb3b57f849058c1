//! SQLite query builder backend

use super::QueryBuilder;
use crate::expr::DatePart;

/// SQLite query builder
///
/// This struct implements SQL generation for SQLite, using the following conventions:
/// - Identifiers: Double quotes (`"table_name"`)
/// - Placeholders: Question marks (`?`)
/// - Date parts: `date(col)` and `CAST(strftime('%Y', col) AS INTEGER)`
///
/// `strftime` returns text. The year is cast to an integer so that the cast
/// expression carries INTEGER affinity; a bound year then compares
/// numerically whether it was bound as an integer or as a string.
#[derive(Debug, Clone, Default)]
pub struct SqliteQueryBuilder;

impl SqliteQueryBuilder {
	/// Create a new SQLite query builder
	pub fn new() -> Self {
		Self
	}
}

impl QueryBuilder for SqliteQueryBuilder {
	fn escape_iden(&self, ident: &str) -> String {
		let escaped = ident.replace('"', "\"\"");
		format!("\"{}\"", escaped)
	}

	fn placeholder(&self, _index: usize) -> String {
		"?".to_string()
	}

	fn date_part(&self, column: &str, part: DatePart) -> String {
		match part {
			DatePart::Date => format!("date({})", column),
			DatePart::Year => format!("CAST(strftime('%Y', {}) AS INTEGER)", column),
		}
	}
}
