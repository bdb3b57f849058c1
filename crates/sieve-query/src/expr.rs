//! Expression system for filter predicates.
//!
//! - [`Predicate`]: leaf predicates on a column or relation
//! - [`Condition`] and [`Cond`]: nested AND/OR groups of predicates

mod condition;
mod predicate;

pub use condition::{Cond, Condition, ConditionExpression, ConditionType};
pub use predicate::{CompareOp, DatePart, Predicate};
