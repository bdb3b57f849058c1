//! Condition system for WHERE clauses.
//!
//! This module provides [`Condition`] and [`Cond`] for building nested
//! predicate groups. A [`Condition`] is also the scope handed to closures
//! passed to [`FilterQuery::where_group`] and [`FilterQuery::where_has`].

use super::predicate::Predicate;
use crate::query::FilterQuery;

/// Type of condition combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionType {
	/// All conditions must be true (AND)
	#[default]
	All,
	/// Any condition must be true (OR)
	Any,
}

impl ConditionType {
	/// Separator used between rendered members.
	pub fn separator(&self) -> &'static str {
		match self {
			Self::All => " AND ",
			Self::Any => " OR ",
		}
	}
}

/// A single member of a condition chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpression {
	/// A leaf predicate
	Predicate(Predicate),
	/// A nested condition
	Condition(Condition),
}

impl ConditionExpression {
	/// Returns `true` if rendering this member would produce no SQL.
	pub fn is_vacuous(&self) -> bool {
		match self {
			Self::Predicate(_) => false,
			Self::Condition(cond) => cond.is_vacuous(),
		}
	}
}

/// A condition chain.
///
/// # Example
///
/// ```rust
/// use sieve_query::{Cond, CompareOp, FilterQuery, Value};
///
/// let mut cond = Cond::all();
/// cond.where_compare("age", CompareOp::GreaterThanOrEqual, Value::from(18));
/// cond.where_group(&mut |group| {
/// 	group.where_null("deleted_at");
/// });
///
/// assert_eq!(cond.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
	/// Type of condition chain (AND or OR)
	pub condition_type: ConditionType,
	/// Whether to negate the entire condition
	pub negate: bool,
	/// The conditions in this chain
	pub conditions: Vec<ConditionExpression>,
}

impl Condition {
	/// Create a new empty condition with the specified type.
	pub fn new(condition_type: ConditionType) -> Self {
		Self {
			condition_type,
			negate: false,
			conditions: Vec::new(),
		}
	}

	/// Create a new condition that requires all sub-conditions (AND).
	pub fn all() -> Self {
		Self::new(ConditionType::All)
	}

	/// Create a new condition that requires any sub-condition (OR).
	pub fn any() -> Self {
		Self::new(ConditionType::Any)
	}

	/// Add a predicate.
	#[must_use]
	// Intentional builder-pattern method, not std::ops::Add
	#[allow(clippy::should_implement_trait)]
	pub fn add(mut self, predicate: Predicate) -> Self {
		self.conditions.push(ConditionExpression::Predicate(predicate));
		self
	}

	/// Add a nested condition.
	#[must_use]
	pub fn add_condition(mut self, condition: Condition) -> Self {
		self.conditions.push(ConditionExpression::Condition(condition));
		self
	}

	/// Negate the entire condition.
	#[must_use]
	// Intentional builder-pattern method, not std::ops::Not
	#[allow(clippy::should_implement_trait)]
	pub fn not(mut self) -> Self {
		self.negate = !self.negate;
		self
	}

	/// Returns true if this condition has no sub-conditions.
	pub fn is_empty(&self) -> bool {
		self.conditions.is_empty()
	}

	/// Returns true if this condition renders to nothing, i.e. it is empty
	/// or only holds vacuous nested conditions.
	pub fn is_vacuous(&self) -> bool {
		self.conditions.iter().all(ConditionExpression::is_vacuous)
	}

	/// Returns the number of sub-conditions.
	pub fn len(&self) -> usize {
		self.conditions.len()
	}

	/// Iterate over leaf predicates of this chain, not descending into
	/// nested conditions.
	pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
		self.conditions.iter().filter_map(|c| match c {
			ConditionExpression::Predicate(p) => Some(p),
			ConditionExpression::Condition(_) => None,
		})
	}
}

impl FilterQuery for Condition {
	fn push_predicate(&mut self, predicate: Predicate) {
		self.conditions.push(ConditionExpression::Predicate(predicate));
	}

	fn push_condition(&mut self, condition: Condition) {
		self.conditions.push(ConditionExpression::Condition(condition));
	}
}

/// Helper for creating conditions.
///
/// This is a convenience wrapper around [`Condition`].
pub struct Cond;

impl Cond {
	/// Create a condition that requires all sub-conditions (AND).
	pub fn all() -> Condition {
		Condition::all()
	}

	/// Create a condition that requires any sub-condition (OR).
	pub fn any() -> Condition {
		Condition::any()
	}
}
