//! Leaf predicates of a condition tree.

use super::condition::Condition;
use crate::value::Value;

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
	/// `=`
	Equal,
	/// `<>`
	NotEqual,
	/// `<`
	LessThan,
	/// `<=`
	LessThanOrEqual,
	/// `>`
	GreaterThan,
	/// `>=`
	GreaterThanOrEqual,
}

impl CompareOp {
	/// SQL spelling of the operator.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Equal => "=",
			Self::NotEqual => "<>",
			Self::LessThan => "<",
			Self::LessThanOrEqual => "<=",
			Self::GreaterThan => ">",
			Self::GreaterThanOrEqual => ">=",
		}
	}
}

/// Which part of a temporal column a comparison looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePart {
	/// The calendar date, time of day truncated
	Date,
	/// The year component
	Year,
}

/// A single predicate on a column or relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	/// `column op value`
	Compare {
		column: String,
		op: CompareOp,
		value: Value,
	},
	/// `column LIKE pattern`
	Like { column: String, pattern: Value },
	/// `column IN (...)` or `column NOT IN (...)`
	In {
		column: String,
		values: Vec<Value>,
		negated: bool,
	},
	/// `column IS NULL` or `column IS NOT NULL`
	Null { column: String, negated: bool },
	/// `DATE(column) op value` or `YEAR(column) op value`
	DatePart {
		column: String,
		part: DatePart,
		op: CompareOp,
		value: Value,
	},
	/// `EXISTS (...)` or `NOT EXISTS (...)` over a named relation, with the
	/// predicates the related rows must satisfy.
	Exists {
		relation: String,
		condition: Condition,
		negated: bool,
	},
}

impl Predicate {
	/// Returns `true` for a relation existence predicate.
	pub fn is_exists(&self) -> bool {
		matches!(self, Self::Exists { .. })
	}
}
