//! PostgreSQL query builder backend

use super::QueryBuilder;
use crate::expr::DatePart;

/// PostgreSQL query builder
///
/// This struct implements SQL generation for PostgreSQL, using the following conventions:
/// - Identifiers: Double quotes (`"table_name"`)
/// - Placeholders: Numbered (`$1`, `$2`, ...)
/// - Date parts: `col::date` and `EXTRACT(YEAR FROM col)`
#[derive(Debug, Clone, Default)]
pub struct PostgresQueryBuilder;

impl PostgresQueryBuilder {
	/// Create a new PostgreSQL query builder
	pub fn new() -> Self {
		Self
	}
}

impl QueryBuilder for PostgresQueryBuilder {
	fn escape_iden(&self, ident: &str) -> String {
		// Escape double quotes within the identifier
		let escaped = ident.replace('"', "\"\"");
		format!("\"{}\"", escaped)
	}

	fn placeholder(&self, index: usize) -> String {
		format!("${}", index)
	}

	fn date_part(&self, column: &str, part: DatePart) -> String {
		match part {
			DatePart::Date => format!("{}::date", column),
			DatePart::Year => format!("EXTRACT(YEAR FROM {})", column),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("users", r#""users""#)]
	#[case(r#"my"table"#, r#""my""table""#)]
	fn test_escape_iden(#[case] ident: &str, #[case] expected: &str) {
		assert_eq!(PostgresQueryBuilder::new().escape_iden(ident), expected);
	}

	#[rstest]
	fn test_numbered_placeholders() {
		let builder = PostgresQueryBuilder::new();
		assert_eq!(builder.placeholder(1), "$1");
		assert_eq!(builder.placeholder(12), "$12");
	}

	#[rstest]
	#[case(DatePart::Date, r#""created_at"::date"#)]
	#[case(DatePart::Year, r#"EXTRACT(YEAR FROM "created_at")"#)]
	fn test_date_part(#[case] part: DatePart, #[case] expected: &str) {
		let builder = PostgresQueryBuilder::new();
		assert_eq!(builder.date_part(r#""created_at""#, part), expected);
	}
}
