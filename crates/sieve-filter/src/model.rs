//! Declarative per-model filters.
//!
//! A [`ModelFilter`] declares which fields of a model can be filtered, and
//! with which rules. Related models are declared by nesting another model
//! filter, which flattens into dotted field paths:
//!
//! ```rust
//! use sieve_filter::{FilterDeclaration, ModelFilter, Permission};
//!
//! struct PhoneFilter;
//!
//! impl ModelFilter for PhoneFilter {
//! 	fn filterable(&self) -> FilterDeclaration {
//! 		FilterDeclaration::new().field("number", "exact")
//! 	}
//! }
//!
//! struct UserFilter;
//!
//! impl ModelFilter for UserFilter {
//! 	fn filterable(&self) -> FilterDeclaration {
//! 		FilterDeclaration::new()
//! 			.field("name", ["contains", "starts_with"])
//! 			.related("phones", PhoneFilter)
//! 	}
//! }
//!
//! let allowed = UserFilter.allow_list();
//! assert!(allowed.check("exact", "phones.number").is_ok());
//! assert!(allowed.check("exact", "name").is_err());
//! ```

use crate::allow::{AllowList, Permission};
use crate::engine::{Filter, FilterCallback};
use crate::error::FilterResult;
use crate::input::FilterInput;
use crate::path::SEPARATOR;
use crate::rule::RuleSpec;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use sieve_query::FilterQuery;
use std::fmt;
use std::sync::Arc;

/// Nesting levels flattened by default.
pub const DEFAULT_NESTING_DEPTH: usize = 1;

/// What a declared key permits.
#[derive(Clone)]
pub enum Filterable {
	/// Rules permitted on a field of the model itself
	Rules(Permission),
	/// A related model with its own declaration
	Related(Arc<dyn ModelFilter>),
}

impl fmt::Debug for Filterable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Rules(permission) => f.debug_tuple("Rules").field(permission).finish(),
			Self::Related(_) => f.write_str("Related(..)"),
		}
	}
}

/// Field or relation name to [`Filterable`], in declaration order.
///
/// Deserializes from a map whose values are permissions (`"*"`, `true`, a
/// rule name or a list of rule names) or nested maps for related models.
#[derive(Debug, Clone, Default)]
pub struct FilterDeclaration(IndexMap<String, Filterable>);

impl FilterDeclaration {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declare the rules permitted on `name`.
	#[must_use]
	pub fn field(mut self, name: impl Into<String>, permission: impl Into<Permission>) -> Self {
		self.insert(name, Filterable::Rules(permission.into()));
		self
	}

	/// Declare a related model reachable through `name`.
	#[must_use]
	pub fn related<M: ModelFilter + 'static>(mut self, name: impl Into<String>, filter: M) -> Self {
		self.insert(name, Filterable::Related(Arc::new(filter)));
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, filterable: Filterable) {
		self.0.insert(name.into(), filterable);
	}

	pub fn get(&self, name: &str) -> Option<&Filterable> {
		self.0.get(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Filterable)> {
		self.0.iter().map(|(name, filterable)| (name.as_str(), filterable))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFilterable {
	Rules(Permission),
	Nested(IndexMap<String, RawFilterable>),
}

impl From<IndexMap<String, RawFilterable>> for FilterDeclaration {
	fn from(raw: IndexMap<String, RawFilterable>) -> Self {
		Self(
			raw.into_iter()
				.map(|(name, value)| {
					let filterable = match value {
						RawFilterable::Rules(permission) => Filterable::Rules(permission),
						RawFilterable::Nested(nested) => {
							Filterable::Related(Arc::new(ModelFilterComposer::new(Self::from(nested))))
						}
					};
					(name, filterable)
				})
				.collect(),
		)
	}
}

impl<'de> Deserialize<'de> for FilterDeclaration {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		IndexMap::<String, RawFilterable>::deserialize(deserializer).map(Self::from)
	}
}

/// Flatten `declaration` into an allow-list, one nesting level deep.
///
/// Keys are prefixed with `prefix` and the separator when `prefix` is not
/// empty.
pub fn flatten(declaration: &FilterDeclaration, prefix: &str) -> AllowList {
	flatten_with_depth(declaration, prefix, DEFAULT_NESTING_DEPTH)
}

/// Flatten `declaration`, following at most `depth` levels of related
/// declarations. Related declarations beyond that are dropped, which also
/// bounds declarations that refer back to each other.
pub fn flatten_with_depth(declaration: &FilterDeclaration, prefix: &str, depth: usize) -> AllowList {
	let mut list = AllowList::new();
	flatten_into(&mut list, declaration, prefix, depth);
	list
}

fn flatten_into(list: &mut AllowList, declaration: &FilterDeclaration, prefix: &str, depth: usize) {
	for (name, filterable) in declaration.iter() {
		let path = if prefix.is_empty() {
			name.to_string()
		} else {
			format!("{}{}{}", prefix, SEPARATOR, name)
		};
		match filterable {
			Filterable::Rules(permission) => list.insert(path, permission.clone()),
			Filterable::Related(related) if depth > 0 => {
				flatten_into(list, &related.filterable(), &path, depth - 1);
			}
			Filterable::Related(_) => {
				tracing::trace!("Nested filter declaration '{}' dropped beyond nesting depth", path);
			}
		}
	}
}

/// Build a filter restricted to `allow_list`, with `custom_rules` registered
/// in order.
pub fn build_filter(allow_list: AllowList, custom_rules: Vec<(String, RuleSpec)>) -> FilterResult<Filter> {
	let mut filter = Filter::new();
	for (name, spec) in custom_rules {
		filter.set_rule_spec(name, spec)?;
	}
	filter.allow(allow_list);
	Ok(filter)
}

/// Filter declaration of a model.
///
/// Implementors declare [`filterable`](Self::filterable) and optionally
/// [`custom_rules`](Self::custom_rules); everything else is provided.
/// Custom rules of related model filters are not merged in.
pub trait ModelFilter: Send + Sync {
	/// Fields and related models that can be filtered.
	fn filterable(&self) -> FilterDeclaration;

	/// Rules registered on top of the built-in ones, in order. Aliases may
	/// name built-in rules or rules registered earlier in the list.
	fn custom_rules(&self) -> Vec<(String, RuleSpec)> {
		Vec::new()
	}

	/// Levels of related declarations to follow.
	fn nesting_depth(&self) -> usize {
		DEFAULT_NESTING_DEPTH
	}

	/// The flattened allow-list of this declaration.
	fn allow_list(&self) -> AllowList {
		flatten_with_depth(&self.filterable(), "", self.nesting_depth())
	}

	/// A [`Filter`] restricted to this declaration.
	fn filter(&self) -> FilterResult<Filter> {
		build_filter(self.allow_list(), self.custom_rules())
	}

	/// Validate and resolve `input` against this declaration.
	fn callback<'a>(&self, input: impl Into<FilterInput<'a>>) -> FilterResult<FilterCallback>
	where
		Self: Sized,
	{
		self.filter()?.callback(input)
	}

	/// Apply `input` to `query` as one nested AND group.
	fn apply<'a>(&self, query: &mut dyn FilterQuery, input: impl Into<FilterInput<'a>>) -> FilterResult<()>
	where
		Self: Sized,
	{
		self.filter()?.apply(query, input)
	}
}

/// A model filter assembled from data rather than declared in code.
///
/// # Examples
///
/// ```rust
/// use sieve_filter::{FilterDeclaration, ModelFilter, ModelFilterComposer, RuleSpec};
///
/// let composer = ModelFilterComposer::new(FilterDeclaration::new().field("id", "eq"))
/// 	.with_rule("eq", RuleSpec::alias("exact"));
///
/// let filter = composer.build_filter().unwrap();
/// assert!(filter.has_rule("eq"));
/// assert!(filter.allow_list().check("eq", "id").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ModelFilterComposer {
	declaration: FilterDeclaration,
	custom_rules: Vec<(String, RuleSpec)>,
	nesting_depth: usize,
}

impl ModelFilterComposer {
	pub fn new(declaration: FilterDeclaration) -> Self {
		Self {
			declaration,
			custom_rules: Vec::new(),
			nesting_depth: DEFAULT_NESTING_DEPTH,
		}
	}

	/// Register a custom rule when the filter is built.
	#[must_use]
	pub fn with_rule(mut self, name: impl Into<String>, spec: RuleSpec) -> Self {
		self.custom_rules.push((name.into(), spec));
		self
	}

	#[must_use]
	pub fn with_nesting_depth(mut self, depth: usize) -> Self {
		self.nesting_depth = depth;
		self
	}

	pub fn declaration(&self) -> &FilterDeclaration {
		&self.declaration
	}

	/// Build the configured [`Filter`].
	pub fn build_filter(&self) -> FilterResult<Filter> {
		self.filter()
	}

	/// Apply `input` to `query` through the configured filter.
	pub fn apply_to<'a>(&self, query: &mut dyn FilterQuery, input: impl Into<FilterInput<'a>>) -> FilterResult<()> {
		self.apply(query, input)
	}
}

impl Default for ModelFilterComposer {
	fn default() -> Self {
		Self::new(FilterDeclaration::new())
	}
}

impl ModelFilter for ModelFilterComposer {
	fn filterable(&self) -> FilterDeclaration {
		self.declaration.clone()
	}

	fn custom_rules(&self) -> Vec<(String, RuleSpec)> {
		self.custom_rules.clone()
	}

	fn nesting_depth(&self) -> usize {
		self.nesting_depth
	}
}
