//! The filter engine.
//!
//! A [`Filter`] holds configuration only: the rule registry, the allow-list,
//! an optional rule-key prefix and an optional data callback. Applying it
//! goes through three stages:
//!
//! 1. the input is narrowed to a [`FilterRequest`],
//! 2. every (rule, field) pair is checked and resolved into a
//!    [`FilterCallback`],
//! 3. the callback adds its predicates to the query.
//!
//! Stage 2 fails as a whole before the query is touched, so a rejected
//! request never leaves a half-filtered query behind.

use crate::allow::{AllowList, AllowListGuard};
use crate::error::{FilterError, FilterResult};
use crate::input::{DataCallback, FilterInput, FilterRequest, InputSource, RequestDataExtractor};
use crate::path::parse_relation;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleSpec};
use indexmap::IndexMap;
use sieve_query::{FilterQuery, Value};
use std::fmt;
use std::sync::Arc;

/// Request filters split into base fields and related fields.
///
/// Every (rule, field) pair of a request lands in exactly one bucket:
/// `base[rule][field]` for plain fields, `related[relation][rule][field]`
/// for relation-qualified ones, with `field` stripped of its relation path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedFilters {
	pub base: IndexMap<String, IndexMap<String, Value>>,
	pub related: IndexMap<String, IndexMap<String, IndexMap<String, Value>>>,
}

impl GroupedFilters {
	pub fn from_request(request: &FilterRequest) -> Self {
		let mut grouped = Self::default();
		for (rule, fields) in request.iter() {
			for (field, value) in fields {
				let (local, relation) = parse_relation(field);
				let bucket = if relation.is_empty() {
					grouped.base.entry(rule.to_string()).or_default()
				} else {
					grouped
						.related
						.entry(relation.to_string())
						.or_default()
						.entry(rule.to_string())
						.or_default()
				};
				bucket.insert(local.to_string(), value.clone());
			}
		}
		grouped
	}
}

#[derive(Clone)]
struct Step {
	rule_name: String,
	rule: Arc<dyn Rule>,
	field: String,
	value: Value,
}

impl Step {
	fn apply(&self, query: &mut dyn FilterQuery) {
		self.rule.apply(query, &self.field, &self.value);
	}
}

#[derive(Clone)]
struct RelatedSteps {
	relation: String,
	steps: Vec<Step>,
}

impl RelatedSteps {
	fn apply(&self, query: &mut dyn FilterQuery) {
		let shared: Vec<&Step> = self
			.steps
			.iter()
			.filter(|step| step.rule.relation_form().is_none())
			.collect();
		if !shared.is_empty() {
			query.where_has(&self.relation, &mut |q| {
				for step in &shared {
					step.apply(q);
				}
			});
		}

		for step in &self.steps {
			if let Some(form) = step.rule.relation_form() {
				form.apply_to_relation(query, &self.relation, &step.field, &step.value);
			}
		}
	}
}

/// A validated, resolved filter, ready to be applied to any query.
///
/// Applying a callback cannot fail; every check already happened when it
/// was built by [`Filter::callback`].
#[derive(Clone, Default)]
pub struct FilterCallback {
	base: Vec<Step>,
	related: Vec<RelatedSteps>,
}

impl FilterCallback {
	/// Add the predicates directly to `query`.
	pub fn apply_to(&self, query: &mut dyn FilterQuery) {
		for step in &self.base {
			step.apply(query);
		}
		for related in &self.related {
			related.apply(query);
		}
	}

	/// Add the predicates to `query` as one nested AND group.
	pub fn apply_grouped(&self, query: &mut dyn FilterQuery) {
		query.where_group(&mut |q| self.apply_to(q));
	}

	/// Number of (rule, field) pairs that will be applied.
	pub fn len(&self) -> usize {
		self.base.len() + self.related.iter().map(|r| r.steps.len()).sum::<usize>()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl fmt::Debug for FilterCallback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let base: Vec<(&str, &str)> = self
			.base
			.iter()
			.map(|s| (s.rule_name.as_str(), s.field.as_str()))
			.collect();
		let related: Vec<(&str, usize)> = self
			.related
			.iter()
			.map(|r| (r.relation.as_str(), r.steps.len()))
			.collect();
		f.debug_struct("FilterCallback")
			.field("base", &base)
			.field("related", &related)
			.finish()
	}
}

/// Applies allow-listed request filters to queries.
///
/// A `Filter` is cheap to clone. Configure it once, then either clone it per
/// request or share it immutably.
///
/// The allow-list is empty by default, which leaves every registered rule
/// usable on every field. Call [`allow`](Self::allow) before applying input
/// you do not control.
///
/// # Examples
///
/// ```rust
/// use sieve_filter::{AllowList, Filter, Permission};
/// use sieve_filter::input::QueryParams;
/// use sieve_query::{PostgresQueryBuilder, SelectStatement};
///
/// let mut filter = Filter::new();
/// filter.allow(
/// 	[("name", Permission::from("contains")), ("age", Permission::Any)]
/// 		.into_iter()
/// 		.collect::<AllowList>(),
/// );
///
/// let params = QueryParams::parse("max[age]=18&contains[name]=wallace").unwrap();
/// let mut query = SelectStatement::new("users");
/// filter.apply(&mut query, &params).unwrap();
///
/// let (sql, _) = query.build(&PostgresQueryBuilder::new()).unwrap();
/// assert_eq!(sql, r#"SELECT * FROM "users" WHERE ("age" <= $1 AND "name" LIKE $2)"#);
/// ```
#[derive(Clone, Default)]
pub struct Filter {
	registry: RuleRegistry,
	guard: AllowListGuard,
	prefix: Option<String>,
	data_callback: Option<DataCallback>,
}

impl Filter {
	/// Create a filter with the built-in rules and no restrictions.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a custom rule, replacing any rule of the same name.
	pub fn set_rule<R: Rule + 'static>(&mut self, name: impl Into<String>, rule: R) -> FilterResult<&mut Self> {
		self.registry.register(name, Arc::new(rule))?;
		Ok(self)
	}

	/// Register a closure as a rule.
	///
	/// Same as [`set_rule`](Self::set_rule), with the closure signature
	/// spelled out so its argument types can be inferred.
	pub fn set_rule_fn<F>(&mut self, name: impl Into<String>, rule: F) -> FilterResult<&mut Self>
	where
		F: Fn(&mut dyn FilterQuery, &str, &Value) + Send + Sync + 'static,
	{
		self.set_rule(name, rule)
	}

	/// Register `name` as another name for the rule `target`.
	pub fn set_rule_alias(&mut self, name: impl Into<String>, target: &str) -> FilterResult<&mut Self> {
		self.registry.register_alias(name, target)?;
		Ok(self)
	}

	pub fn set_rule_spec(&mut self, name: impl Into<String>, spec: RuleSpec) -> FilterResult<&mut Self> {
		self.registry.register_spec(name, spec)?;
		Ok(self)
	}

	pub fn get_rule(&self, name: &str) -> FilterResult<Arc<dyn Rule>> {
		self.registry.resolve(name)
	}

	pub fn has_rule(&self, name: &str) -> bool {
		self.registry.has(name)
	}

	pub fn registry(&self) -> &RuleRegistry {
		&self.registry
	}

	/// Restrict filtering to the fields and rules of `list`.
	pub fn allow(&mut self, list: AllowList) -> &mut Self {
		self.guard.set(list);
		self
	}

	/// Lift every restriction.
	pub fn allow_all(&mut self) -> &mut Self {
		self.guard.clear();
		self
	}

	pub fn allow_list(&self) -> &AllowList {
		self.guard.allow_list()
	}

	/// Read rule keys as `prefix + rule`, e.g. `filter_max[age]=18`.
	pub fn set_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
		self.prefix = Some(prefix.into());
		self
	}

	pub fn prefix(&self) -> Option<&str> {
		self.prefix.as_deref()
	}

	/// Remap raw input entries before they are grouped.
	///
	/// The callback is called for every registered rule and every scalar
	/// entry of the source, as `(rule, key, value)`. It returns the field and
	/// value to filter by, or `None` to skip the entry for that rule.
	pub fn set_data_callback<F>(&mut self, callback: F) -> &mut Self
	where
		F: Fn(&str, &str, &Value) -> Option<(String, Value)> + Send + Sync + 'static,
	{
		self.data_callback = Some(Arc::new(callback));
		self
	}

	/// Narrow a raw source down to the registered rules.
	pub fn extract(&self, source: &dyn InputSource) -> FilterResult<FilterRequest> {
		RequestDataExtractor::new()
			.with_prefix(self.prefix.clone())
			.with_data_callback(self.data_callback.clone())
			.extract(source, self.registry.names())
	}

	/// Split a request into base and related filters.
	pub fn group(&self, request: &FilterRequest) -> GroupedFilters {
		GroupedFilters::from_request(request)
	}

	/// Validate and resolve `input` into a reusable callback.
	pub fn callback<'a>(&self, input: impl Into<FilterInput<'a>>) -> FilterResult<FilterCallback> {
		match input.into() {
			FilterInput::Source(source) => self.compile(&self.extract(source)?),
			FilterInput::Request(request) => self.compile(&request),
		}
	}

	/// Validate and resolve a structured request.
	pub fn compile(&self, request: &FilterRequest) -> FilterResult<FilterCallback> {
		for (rule, fields) in request.iter() {
			for field in fields.keys() {
				self.guard.check(rule, field)?;
			}
		}

		let grouped = self.group(request);
		let base = self.resolve_steps(&grouped.base)?;
		let mut related = Vec::with_capacity(grouped.related.len());
		for (relation, rules) in &grouped.related {
			let steps = self.resolve_steps(rules)?;
			if !steps.is_empty() {
				related.push(RelatedSteps {
					relation: relation.clone(),
					steps,
				});
			}
		}

		let callback = FilterCallback { base, related };
		tracing::debug!(
			"Compiled filter: {} predicates, {} relations, restricted: {}",
			callback.len(),
			callback.related.len(),
			self.guard.is_restricted()
		);
		Ok(callback)
	}

	fn resolve_steps(&self, rules: &IndexMap<String, IndexMap<String, Value>>) -> FilterResult<Vec<Step>> {
		let mut steps = Vec::new();
		for (name, fields) in rules {
			let rule = self.registry.resolve(name)?;
			for (field, value) in fields {
				if value.is_empty() {
					continue;
				}
				check_value_shape(name, rule.as_ref(), field, value)?;
				steps.push(Step {
					rule_name: name.clone(),
					rule: Arc::clone(&rule),
					field: field.clone(),
					value: value.clone(),
				});
			}
		}
		Ok(steps)
	}

	/// Apply `input` to `query` as one nested AND group.
	pub fn apply<'a>(&self, query: &mut dyn FilterQuery, input: impl Into<FilterInput<'a>>) -> FilterResult<()> {
		self.callback(input)?.apply_grouped(query);
		Ok(())
	}

	/// Apply `input` to `query` without the enclosing group.
	///
	/// The predicates are ANDed with whatever `query` already holds, which
	/// changes the meaning of a query that contains OR branches. Prefer
	/// [`apply`](Self::apply) unless the query is known to be a plain AND
	/// chain.
	pub fn apply_flat<'a>(&self, query: &mut dyn FilterQuery, input: impl Into<FilterInput<'a>>) -> FilterResult<()> {
		self.callback(input)?.apply_to(query);
		Ok(())
	}

	/// Apply a single rule to the given fields, skipping empty values.
	///
	/// Field names are used as given; relation paths are not resolved here.
	pub fn apply_rule(&self, query: &mut dyn FilterQuery, rule: &str, fields: &IndexMap<String, Value>) -> FilterResult<()> {
		for field in fields.keys() {
			self.guard.check(rule, field)?;
		}
		let handle = self.registry.resolve(rule)?;
		for (field, value) in fields {
			if !value.is_empty() {
				check_value_shape(rule, handle.as_ref(), field, value)?;
			}
		}
		for (field, value) in fields {
			if !value.is_empty() {
				handle.apply(query, field, value);
			}
		}
		Ok(())
	}
}

fn check_value_shape(rule_name: &str, rule: &dyn Rule, field: &str, value: &Value) -> FilterResult<()> {
	if matches!(value, Value::List(_)) && !rule.accepts_list() {
		return Err(FilterError::InvalidInput(format!(
			"filter rule \"{}\" on field \"{}\" expects a single value, got a list",
			rule_name, field
		)));
	}
	Ok(())
}

impl fmt::Debug for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Filter")
			.field("registry", &self.registry)
			.field("guard", &self.guard)
			.field("prefix", &self.prefix)
			.field("data_callback", &self.data_callback.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::allow::Permission;
	use crate::error::{FilterError, RestrictionError};
	use proptest::prelude::*;
	use rstest::rstest;
	use sieve_query::{CompareOp, Condition, ConditionExpression, Predicate};

	fn assert_send_sync<T: Send + Sync + Clone>() {}

	#[rstest]
	fn test_filter_is_send_sync_clone() {
		assert_send_sync::<Filter>();
		assert_send_sync::<FilterCallback>();
	}

	#[rstest]
	fn test_grouping() {
		let request = FilterRequest::new()
			.with("exact", "phones.country", "55")
			.with("contains", "name", "W");

		let grouped = Filter::new().group(&request);

		assert_eq!(grouped.base["contains"]["name"], Value::from("W"));
		assert_eq!(grouped.related["phones"]["exact"]["country"], Value::from("55"));
		assert!(!grouped.base.contains_key("exact"));
	}

	#[rstest]
	fn test_leading_separator_is_a_base_field() {
		let request = FilterRequest::new().with("exact", ".name", "W");

		let grouped = GroupedFilters::from_request(&request);

		assert_eq!(grouped.base["exact"][".name"], Value::from("W"));
		assert!(grouped.related.is_empty());
	}

	#[rstest]
	#[case(Value::from(""), 0)]
	#[case(Value::List(vec![]), 0)]
	#[case(Value::from(0), 1)]
	#[case(Value::from(0.0), 1)]
	#[case(Value::from(false), 1)]
	#[case(Value::from("0"), 1)]
	fn test_only_empty_values_are_skipped(#[case] value: Value, #[case] expected: usize) {
		let request = FilterRequest::new().with("exact", "age", value);

		let callback = Filter::new().compile(&request).unwrap();
		let mut cond = Condition::all();
		callback.apply_to(&mut cond);

		assert_eq!(callback.len(), expected);
		assert_eq!(cond.len(), expected);
	}

	#[rstest]
	fn test_restricted_request_leaves_query_untouched() {
		let mut filter = Filter::new();
		filter.allow([("name", Permission::from("contains"))].into_iter().collect());
		let request = FilterRequest::new()
			.with("contains", "name", "W")
			.with("exact", "name", "W");

		let mut cond = Condition::all();
		let result = filter.apply(&mut cond, request);

		assert!(matches!(
			result,
			Err(FilterError::Restriction(RestrictionError::RuleNotAllowed { .. }))
		));
		assert!(cond.is_empty());
	}

	#[rstest]
	fn test_unknown_rule_in_structured_request() {
		let request = FilterRequest::new().with("regex", "name", "W");

		let result = Filter::new().compile(&request);

		assert!(matches!(result, Err(FilterError::UnknownRule(name)) if name == "regex"));
	}

	#[rstest]
	fn test_apply_wraps_in_one_group() {
		let request = FilterRequest::new()
			.with("max", "age", "18")
			.with("contains", "name", "wallace");

		let mut cond = Condition::all();
		Filter::new().apply(&mut cond, request).unwrap();

		assert_eq!(cond.len(), 1);
		match &cond.conditions[0] {
			ConditionExpression::Condition(group) => assert_eq!(group.len(), 2),
			other => panic!("expected a group, got {:?}", other),
		}
	}

	#[rstest]
	fn test_apply_flat_appends_directly() {
		let request = FilterRequest::new()
			.with("max", "age", "18")
			.with("contains", "name", "wallace");

		let mut cond = Condition::all();
		Filter::new().apply_flat(&mut cond, request).unwrap();

		assert_eq!(cond.predicates().count(), 2);
	}

	#[rstest]
	fn test_relation_rules_share_one_subquery() {
		let request = FilterRequest::new()
			.with("exact", "phones.ddd", "31")
			.with("starts_with", "phones.number", "9")
			.with("not_in", "phones.carrier", vec!["X"]);

		let mut cond = Condition::all();
		Filter::new().apply_flat(&mut cond, request).unwrap();

		let exists: Vec<(&Condition, bool)> = cond
			.predicates()
			.filter_map(|p| match p {
				Predicate::Exists {
					condition, negated, ..
				} => Some((condition, *negated)),
				_ => None,
			})
			.collect();

		assert_eq!(exists.len(), 2);
		assert_eq!(exists[0].0.len(), 2);
		assert!(!exists[0].1);
		assert_eq!(exists[1].0.len(), 1);
		assert!(exists[1].1);
	}

	#[rstest]
	fn test_apply_rule_checks_allow_list() {
		let mut filter = Filter::new();
		filter.allow([("name", Permission::from("contains"))].into_iter().collect());
		let fields: IndexMap<String, Value> = [("name".to_string(), Value::from("W"))].into_iter().collect();

		let mut cond = Condition::all();
		assert!(filter.apply_rule(&mut cond, "exact", &fields).is_err());
		assert!(filter.apply_rule(&mut cond, "contains", &fields).is_ok());
		assert_eq!(cond.len(), 1);
	}

	#[rstest]
	fn test_set_rule_fn_overrides_builtin() {
		let mut filter = Filter::new();
		filter
			.set_rule_fn("exact", |q, field, _| q.where_null(field))
			.unwrap();

		let mut cond = Condition::all();
		filter
			.apply_flat(&mut cond, FilterRequest::new().with("exact", "deleted_at", "1"))
			.unwrap();

		assert_eq!(
			cond.predicates().next(),
			Some(&Predicate::Null {
				column: "deleted_at".to_string(),
				negated: false,
			})
		);
	}

	#[rstest]
	fn test_reregistered_rule_replaces_previous_one() {
		let mut filter = Filter::new();
		let request = FilterRequest::new().with("adult", "age", "18");

		filter
			.set_rule_fn("adult", |q, field, value| {
				q.where_compare(field, CompareOp::GreaterThanOrEqual, value.clone());
			})
			.unwrap();
		let mut first = Condition::all();
		filter.apply_flat(&mut first, request.clone()).unwrap();

		filter
			.set_rule_fn("adult", |q, field, _| q.where_not_null(field))
			.unwrap();
		let mut second = Condition::all();
		filter.apply_flat(&mut second, request).unwrap();

		assert_eq!(
			first.predicates().next(),
			Some(&Predicate::Compare {
				column: "age".to_string(),
				op: CompareOp::GreaterThanOrEqual,
				value: Value::from("18"),
			})
		);
		assert_eq!(
			second.predicates().next(),
			Some(&Predicate::Null {
				column: "age".to_string(),
				negated: true,
			})
		);
		assert_eq!(second.len(), 1);
	}

	#[rstest]
	#[case::exact("exact")]
	#[case::max("max")]
	#[case::not_equal("not_equal")]
	#[case::contains("contains")]
	#[case::date_min("date_min")]
	#[case::year_exact("year_exact")]
	fn test_list_value_rejected_for_scalar_rule(#[case] rule: &str) {
		let request = FilterRequest::new()
			.with("in", "id", vec!["1", "2"])
			.with(rule, "id", vec!["1", "2"]);
		let mut cond = Condition::all();

		let err = Filter::new().apply(&mut cond, request).unwrap_err();

		assert!(matches!(err, FilterError::InvalidInput(msg) if msg.contains(rule) && msg.contains("\"id\"")));
		assert!(cond.is_empty());
	}

	#[rstest]
	fn test_list_value_rejected_by_apply_rule() {
		let mut fields = IndexMap::new();
		fields.insert("name".to_string(), Value::from("W"));
		fields.insert("id".to_string(), Value::from(vec![1, 2]));
		let mut cond = Condition::all();

		let err = Filter::new().apply_rule(&mut cond, "exact", &fields).unwrap_err();

		assert!(matches!(err, FilterError::InvalidInput(_)));
		assert!(cond.is_empty());
	}

	#[rstest]
	fn test_list_value_accepted_by_set_rules_and_closures() {
		let mut filter = Filter::new();
		filter
			.set_rule_fn("any_of", |q, field, value| q.where_in(field, value.to_list()))
			.unwrap();
		let request = FilterRequest::new()
			.with("not_in", "id", vec![1, 2])
			.with("any_of", "role", vec!["a", "b"]);

		let callback = filter.compile(&request).unwrap();

		assert_eq!(callback.len(), 2);
	}

	proptest! {
		#[test]
		fn prop_non_empty_values_always_apply(value in ".{1,16}") {
			let mut fields = IndexMap::new();
			fields.insert("name".to_string(), Value::from(value));
			let mut cond = Condition::all();

			Filter::new().apply_rule(&mut cond, "exact", &fields).unwrap();

			prop_assert_eq!(cond.len(), 1);
		}

		#[test]
		fn prop_empty_lists_never_apply(rule in "exact|min|max|contains|in|not_in") {
			let request = FilterRequest::new().with(rule, "tags", Value::List(vec![]));

			let callback = Filter::new().compile(&request).unwrap();

			prop_assert!(callback.is_empty());
		}
	}
}
