//! Rule name resolution.

use crate::error::{FilterError, FilterResult};
use crate::rule::{Compare, DateCompare, Has, In, IsNull, NotEqual, NotIn, Pattern, PatternKind, Rule, RuleSpec, YearCompare};
use indexmap::IndexMap;
use sieve_query::CompareOp;
use std::fmt;
use std::sync::Arc;

/// Maps rule names to rules, in registration order.
///
/// Registering a name again replaces the earlier rule.
///
/// # Examples
///
/// ```rust
/// use sieve_filter::RuleRegistry;
///
/// let mut registry = RuleRegistry::new();
/// registry.register_alias("eq", "exact").unwrap();
///
/// assert!(registry.has("contains"));
/// assert!(registry.resolve("eq").is_ok());
/// assert!(registry.resolve("like").is_err());
/// ```
#[derive(Clone)]
pub struct RuleRegistry {
	rules: IndexMap<String, Arc<dyn Rule>>,
}

impl RuleRegistry {
	/// Create a registry holding the built-in rules.
	pub fn new() -> Self {
		let mut registry = Self::empty();
		for (name, rule) in default_rules() {
			registry.rules.insert(name.to_string(), rule);
		}
		registry
	}

	/// Create a registry without any rule.
	pub fn empty() -> Self {
		Self {
			rules: IndexMap::new(),
		}
	}

	/// Register `rule` under `name`.
	pub fn register(&mut self, name: impl Into<String>, rule: Arc<dyn Rule>) -> FilterResult<()> {
		let name = name.into();
		if name.is_empty() {
			return Err(FilterError::InvalidRule {
				name,
				reason: "rule name must not be empty".to_string(),
			});
		}

		if self.rules.insert(name.clone(), rule).is_some() {
			tracing::trace!("filter rule '{}' overwritten", name);
		}
		Ok(())
	}

	/// Register `name` as another name for the already registered `target`.
	pub fn register_alias(&mut self, name: impl Into<String>, target: &str) -> FilterResult<()> {
		let name = name.into();
		let rule = self.rules.get(target).cloned().ok_or_else(|| FilterError::InvalidRule {
			name: name.clone(),
			reason: format!("alias target \"{}\" is not a registered rule", target),
		})?;
		self.register(name, rule)
	}

	/// Register either form of [`RuleSpec`].
	pub fn register_spec(&mut self, name: impl Into<String>, spec: RuleSpec) -> FilterResult<()> {
		match spec {
			RuleSpec::Rule(rule) => self.register(name, rule),
			RuleSpec::Alias(target) => self.register_alias(name, &target),
		}
	}

	/// Look up the rule registered under `name`.
	pub fn resolve(&self, name: &str) -> FilterResult<Arc<dyn Rule>> {
		self.rules
			.get(name)
			.cloned()
			.ok_or_else(|| FilterError::UnknownRule(name.to_string()))
	}

	pub fn has(&self, name: &str) -> bool {
		self.rules.contains_key(name)
	}

	/// Registered names, in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.rules.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}

impl Default for RuleRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for RuleRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RuleRegistry")
			.field("rules", &self.rules.keys().collect::<Vec<_>>())
			.finish()
	}
}

fn shared<R: Rule + 'static>(rule: R) -> Arc<dyn Rule> {
	Arc::new(rule)
}

fn default_rules() -> Vec<(&'static str, Arc<dyn Rule>)> {
	vec![
		("exact", shared(Compare::new(CompareOp::Equal))),
		("min", shared(Compare::new(CompareOp::GreaterThanOrEqual))),
		("max", shared(Compare::new(CompareOp::LessThanOrEqual))),
		("not_equal", shared(NotEqual)),
		("contains", shared(Pattern::new(PatternKind::Contains))),
		("starts_with", shared(Pattern::new(PatternKind::StartsWith))),
		("ends_with", shared(Pattern::new(PatternKind::EndsWith))),
		("in", shared(In)),
		("not_in", shared(NotIn)),
		("has", shared(Has)),
		("is_null", shared(IsNull)),
		("date_min", shared(DateCompare::new(CompareOp::GreaterThanOrEqual))),
		("date_max", shared(DateCompare::new(CompareOp::LessThanOrEqual))),
		("date_exact", shared(DateCompare::new(CompareOp::Equal))),
		("year_min", shared(YearCompare::new(CompareOp::GreaterThanOrEqual))),
		("year_max", shared(YearCompare::new(CompareOp::LessThanOrEqual))),
		("year_exact", shared(YearCompare::new(CompareOp::Equal))),
	]
}
