//! MySQL query builder backend

use super::QueryBuilder;
use crate::expr::DatePart;

/// MySQL query builder
///
/// This struct implements SQL generation for MySQL, using the following conventions:
/// - Identifiers: Backticks (`` `table_name` ``)
/// - Placeholders: Question marks (`?`)
/// - Date parts: `DATE(col)` and `YEAR(col)`
#[derive(Debug, Clone, Default)]
pub struct MySqlQueryBuilder;

impl MySqlQueryBuilder {
	/// Create a new MySQL query builder
	pub fn new() -> Self {
		Self
	}
}

impl QueryBuilder for MySqlQueryBuilder {
	fn escape_iden(&self, ident: &str) -> String {
		// Escape backticks within the identifier
		let escaped = ident.replace('`', "``");
		format!("`{}`", escaped)
	}

	fn placeholder(&self, _index: usize) -> String {
		"?".to_string()
	}

	fn date_part(&self, column: &str, part: DatePart) -> String {
		match part {
			DatePart::Date => format!("DATE({})", column),
			DatePart::Year => format!("YEAR({})", column),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::CompareOp;
	use crate::query::FilterQuery;
	use crate::select::SelectStatement;
	use crate::value::Value;
	use rstest::rstest;

	#[rstest]
	fn test_escape_iden() {
		let builder = MySqlQueryBuilder::new();
		assert_eq!(builder.escape_iden("users"), "`users`");
		assert_eq!(builder.escape_iden("my`table"), "`my``table`");
	}

	#[rstest]
	fn test_year_comparison() {
		let mut stmt = SelectStatement::new("posts");
		stmt.where_year("published_at", CompareOp::GreaterThanOrEqual, Value::from("2020"));
		stmt.where_date("published_at", CompareOp::LessThanOrEqual, Value::from("2021-06-30"));

		let (sql, values) = stmt.build(&MySqlQueryBuilder::new()).unwrap();

		assert_eq!(
			sql,
			"SELECT * FROM `posts` WHERE YEAR(`published_at`) >= ? AND DATE(`published_at`) <= ?"
		);
		assert_eq!(values.len(), 2);
	}
}
