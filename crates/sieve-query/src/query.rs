//! The query capability consumed by filter rules.
//!
//! [`FilterQuery`] is object safe so rules can be stored as trait objects and
//! applied to any query representation: implementors only provide
//! [`push_predicate`](FilterQuery::push_predicate) and
//! [`push_condition`](FilterQuery::push_condition), every capability method
//! has a default built on those two. A host query builder may override any
//! of them to map onto its own API instead.

use crate::expr::{CompareOp, Condition, DatePart, Predicate};
use crate::value::Value;

/// Scope closure handed to nested groups and relation subqueries.
pub type Scope<'a> = &'a mut dyn FnMut(&mut dyn FilterQuery);

/// Predicate-building capabilities of a query.
///
/// All predicates added through one `FilterQuery` are combined with AND.
///
/// # Examples
///
/// ```rust
/// use sieve_query::{CompareOp, Condition, FilterQuery, Value};
///
/// let mut query = Condition::all();
/// query.where_compare("age", CompareOp::LessThanOrEqual, Value::from("18"));
/// query.where_like("name", Value::from("%wallace%"));
///
/// assert_eq!(query.len(), 2);
/// ```
pub trait FilterQuery {
	/// Append a predicate to this query.
	fn push_predicate(&mut self, predicate: Predicate);

	/// Append a nested condition to this query.
	fn push_condition(&mut self, condition: Condition);

	/// `column op value`
	fn where_compare(&mut self, column: &str, op: CompareOp, value: Value) {
		self.push_predicate(Predicate::Compare {
			column: column.to_string(),
			op,
			value,
		});
	}

	/// `column LIKE pattern`
	fn where_like(&mut self, column: &str, pattern: Value) {
		self.push_predicate(Predicate::Like {
			column: column.to_string(),
			pattern,
		});
	}

	/// `column IN (...)`
	fn where_in(&mut self, column: &str, values: Vec<Value>) {
		self.push_predicate(Predicate::In {
			column: column.to_string(),
			values,
			negated: false,
		});
	}

	/// `column NOT IN (...)`
	fn where_not_in(&mut self, column: &str, values: Vec<Value>) {
		self.push_predicate(Predicate::In {
			column: column.to_string(),
			values,
			negated: true,
		});
	}

	/// `column IS NULL`
	fn where_null(&mut self, column: &str) {
		self.push_predicate(Predicate::Null {
			column: column.to_string(),
			negated: false,
		});
	}

	/// `column IS NOT NULL`
	fn where_not_null(&mut self, column: &str) {
		self.push_predicate(Predicate::Null {
			column: column.to_string(),
			negated: true,
		});
	}

	/// Compare the date part of a temporal column.
	fn where_date(&mut self, column: &str, op: CompareOp, value: Value) {
		self.push_predicate(Predicate::DatePart {
			column: column.to_string(),
			part: DatePart::Date,
			op,
			value,
		});
	}

	/// Compare the year component of a temporal column.
	fn where_year(&mut self, column: &str, op: CompareOp, value: Value) {
		self.push_predicate(Predicate::DatePart {
			column: column.to_string(),
			part: DatePart::Year,
			op,
			value,
		});
	}

	/// Add the predicates built by `scope` as one nested AND group.
	fn where_group(&mut self, scope: Scope<'_>) {
		let mut group = Condition::all();
		scope(&mut group);
		self.push_condition(group);
	}

	/// Require at least one related row satisfying the predicates built by
	/// `scope`.
	fn where_has(&mut self, relation: &str, scope: Scope<'_>) {
		let mut condition = Condition::all();
		scope(&mut condition);
		self.push_predicate(Predicate::Exists {
			relation: relation.to_string(),
			condition,
			negated: false,
		});
	}

	/// Require that no related row satisfies the predicates built by `scope`.
	fn where_doesnt_have(&mut self, relation: &str, scope: Scope<'_>) {
		let mut condition = Condition::all();
		scope(&mut condition);
		self.push_predicate(Predicate::Exists {
			relation: relation.to_string(),
			condition,
			negated: true,
		});
	}

	/// Require at least one related row.
	fn has(&mut self, relation: &str) {
		self.where_has(relation, &mut |_| {});
	}

	/// Require that no related row exists.
	fn doesnt_have(&mut self, relation: &str) {
		self.where_doesnt_have(relation, &mut |_| {});
	}
}
