//! SELECT statements that filters are applied to.

use crate::backend::QueryBuilder;
use crate::error::QueryResult;
use crate::expr::{Condition, Predicate};
use crate::query::FilterQuery;
use crate::relation::Relation;
use crate::value::Values;
use std::collections::HashMap;

/// A SELECT over one table, carrying the relations its filters may reach.
///
/// # Examples
///
/// ```rust
/// use sieve_query::{CompareOp, FilterQuery, PostgresQueryBuilder, SelectStatement, Value};
///
/// let mut query = SelectStatement::new("users");
/// query.where_compare("age", CompareOp::GreaterThanOrEqual, Value::from(18));
///
/// let (sql, values) = query.build(&PostgresQueryBuilder::new()).unwrap();
/// assert_eq!(sql, r#"SELECT * FROM "users" WHERE "age" >= $1"#);
/// assert_eq!(values.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectStatement {
	table: String,
	columns: Vec<String>,
	condition: Condition,
	relations: HashMap<String, Relation>,
}

impl SelectStatement {
	/// Select every column of `table`.
	pub fn new(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			..Self::default()
		}
	}

	/// Restrict the selected columns.
	#[must_use]
	pub fn column(mut self, column: impl Into<String>) -> Self {
		self.columns.push(column.into());
		self
	}

	/// Declare a relation that existence predicates may refer to.
	#[must_use]
	pub fn relation(mut self, relation: Relation) -> Self {
		self.relations.insert(relation.name().to_string(), relation);
		self
	}

	/// The queried table.
	pub fn table(&self) -> &str {
		&self.table
	}

	/// Selected columns; empty means `*`.
	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	/// The WHERE condition built so far.
	pub fn condition(&self) -> &Condition {
		&self.condition
	}

	/// Look up a declared relation by name.
	pub fn get_relation(&self, name: &str) -> Option<&Relation> {
		self.relations.get(name)
	}

	/// Render with placeholders, returning the SQL and its bound values.
	pub fn build(&self, builder: &dyn QueryBuilder) -> QueryResult<(String, Values)> {
		builder.build_select(self)
	}

	/// Render with values inlined. Meant for logging and assertions, not
	/// for execution.
	pub fn to_string(&self, builder: &dyn QueryBuilder) -> QueryResult<String> {
		builder.build_select_inline(self)
	}
}

impl FilterQuery for SelectStatement {
	fn push_predicate(&mut self, predicate: Predicate) {
		self.condition.push_predicate(predicate);
	}

	fn push_condition(&mut self, condition: Condition) {
		self.condition.push_condition(condition);
	}
}
