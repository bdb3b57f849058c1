//! Filter rules.
//!
//! A [`Rule`] turns one `(field, value)` pair into one predicate on a
//! [`FilterQuery`]. Closures with the right signature are rules too, so
//! custom rules rarely need a dedicated type:
//!
//! ```rust
//! use sieve_filter::rule::Rule;
//! use sieve_query::{CompareOp, Condition, FilterQuery, Value};
//!
//! let adult = |query: &mut dyn FilterQuery, field: &str, _value: &Value| {
//! 	query.where_compare(field, CompareOp::GreaterThanOrEqual, Value::from(18));
//! };
//!
//! let mut cond = Condition::all();
//! adult.apply(&mut cond, "age", &Value::from("1"));
//! assert_eq!(cond.len(), 1);
//! ```

use sieve_query::{CompareOp, FilterQuery, Value};
use std::fmt;
use std::sync::Arc;

/// A named predicate transform.
///
/// Implementations must be stateless apart from the query they are handed.
pub trait Rule: Send + Sync {
	/// Add this rule's predicate for `field` and `value` to `query`.
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value);

	/// How the rule is applied when its field lives behind a relation.
	///
	/// Rules without a relation form are applied inside the relation's shared
	/// existence subquery.
	fn relation_form(&self) -> Option<&dyn RelationRule> {
		None
	}

	/// Whether a list value is meaningful to this rule. Rules answering
	/// `false` reject list input when the filter is compiled.
	fn accepts_list(&self) -> bool {
		true
	}
}

/// Relation-aware application of a rule.
///
/// Negative rules implement this so that `not_equal` on `roles.name` means
/// "no related role has this name" instead of "some related role has another
/// name".
pub trait RelationRule: Send + Sync {
	/// Add the predicate for `field` of `relation` to `query`.
	fn apply_to_relation(&self, query: &mut dyn FilterQuery, relation: &str, field: &str, value: &Value);
}

impl<F> Rule for F
where
	F: Fn(&mut dyn FilterQuery, &str, &Value) + Send + Sync,
{
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		self(query, field, value)
	}
}

/// A rule registration: a rule value, or an alias naming a rule that is
/// already registered.
#[derive(Clone)]
pub enum RuleSpec {
	Rule(Arc<dyn Rule>),
	Alias(String),
}

impl RuleSpec {
	/// Wrap a rule value.
	pub fn rule<R: Rule + 'static>(rule: R) -> Self {
		Self::Rule(Arc::new(rule))
	}

	/// Alias an already registered rule.
	pub fn alias(target: impl Into<String>) -> Self {
		Self::Alias(target.into())
	}
}

impl fmt::Debug for RuleSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Rule(_) => f.write_str("RuleSpec::Rule(..)"),
			Self::Alias(target) => f.debug_tuple("RuleSpec::Alias").field(target).finish(),
		}
	}
}

/// `column op value`
#[derive(Debug, Clone, Copy)]
pub struct Compare {
	op: CompareOp,
}

impl Compare {
	pub fn new(op: CompareOp) -> Self {
		Self { op }
	}
}

impl Rule for Compare {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		query.where_compare(field, self.op, value.clone());
	}

	fn accepts_list(&self) -> bool {
		false
	}
}

/// `column <> value`; behind a relation, no related row may equal `value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEqual;

impl Rule for NotEqual {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		query.where_compare(field, CompareOp::NotEqual, value.clone());
	}

	fn accepts_list(&self) -> bool {
		false
	}

	fn relation_form(&self) -> Option<&dyn RelationRule> {
		Some(self)
	}
}

impl RelationRule for NotEqual {
	fn apply_to_relation(&self, query: &mut dyn FilterQuery, relation: &str, field: &str, value: &Value) {
		query.where_doesnt_have(relation, &mut |q| {
			q.where_compare(field, CompareOp::Equal, value.clone());
		});
	}
}

/// Where the wildcard goes in a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
	/// `%value%`
	Contains,
	/// `value%`
	StartsWith,
	/// `%value`
	EndsWith,
}

/// `column LIKE pattern`
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
	kind: PatternKind,
}

impl Pattern {
	pub fn new(kind: PatternKind) -> Self {
		Self { kind }
	}

	fn pattern(&self, value: &Value) -> String {
		match self.kind {
			PatternKind::Contains => format!("%{}%", value),
			PatternKind::StartsWith => format!("{}%", value),
			PatternKind::EndsWith => format!("%{}", value),
		}
	}
}

impl Rule for Pattern {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		query.where_like(field, Value::String(self.pattern(value)));
	}

	fn accepts_list(&self) -> bool {
		false
	}
}

/// `column IN (...)`, a scalar being a one-element list.
#[derive(Debug, Clone, Copy, Default)]
pub struct In;

impl Rule for In {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		query.where_in(field, value.to_list());
	}
}

/// `column NOT IN (...)`; behind a relation, no related row may be in the
/// list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotIn;

impl Rule for NotIn {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		query.where_not_in(field, value.to_list());
	}

	fn relation_form(&self) -> Option<&dyn RelationRule> {
		Some(self)
	}
}

impl RelationRule for NotIn {
	fn apply_to_relation(&self, query: &mut dyn FilterQuery, relation: &str, field: &str, value: &Value) {
		query.where_doesnt_have(relation, &mut |q| {
			q.where_in(field, value.to_list());
		});
	}
}

/// Relation existence; the field names the relation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Has;

impl Rule for Has {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		if is_truthy(value) {
			query.has(field);
		} else {
			query.doesnt_have(field);
		}
	}
}

/// `column IS NULL` for a truthy value, `IS NOT NULL` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsNull;

impl Rule for IsNull {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		if is_truthy(value) {
			query.where_null(field);
		} else {
			query.where_not_null(field);
		}
	}
}

/// Comparison on the date part of a temporal column.
#[derive(Debug, Clone, Copy)]
pub struct DateCompare {
	op: CompareOp,
}

impl DateCompare {
	pub fn new(op: CompareOp) -> Self {
		Self { op }
	}
}

impl Rule for DateCompare {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		query.where_date(field, self.op, value.clone());
	}

	fn accepts_list(&self) -> bool {
		false
	}
}

/// Comparison on the year of a temporal column.
#[derive(Debug, Clone, Copy)]
pub struct YearCompare {
	op: CompareOp,
}

impl YearCompare {
	pub fn new(op: CompareOp) -> Self {
		Self { op }
	}
}

impl Rule for YearCompare {
	fn apply(&self, query: &mut dyn FilterQuery, field: &str, value: &Value) {
		query.where_year(field, self.op, value.clone());
	}

	fn accepts_list(&self) -> bool {
		false
	}
}

/// Boolean reading of loosely typed input: `1`, `true`, `on` and `yes` are
/// truthy, anything else is not.
pub(crate) fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Bool(b) => *b,
		Value::Int(i) => *i == 1,
		Value::Float(f) => *f == 1.0,
		Value::String(s) => matches!(
			s.trim().to_ascii_lowercase().as_str(),
			"1" | "true" | "on" | "yes"
		),
		Value::Null | Value::List(_) => false,
	}
}
