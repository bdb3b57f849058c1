//! Filter input: raw sources, the structured request, and extraction.
//!
//! Raw input maps rule names to field maps, as produced by query strings
//! like `contains[name]=wallace&max[age]=18`. The [`RequestDataExtractor`]
//! narrows a raw source down to a [`FilterRequest`] holding registered rules
//! only.

use crate::error::{FilterError, FilterResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sieve_query::Value;
use std::fmt;
use std::sync::Arc;

/// One raw input entry.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
	/// `key=value` or `key[]=value`
	Scalar(Value),
	/// `key[field]=value`
	Fields(IndexMap<String, Value>),
}

impl InputValue {
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Scalar(value) => value.is_empty(),
			Self::Fields(fields) => fields.is_empty(),
		}
	}
}

impl From<Value> for InputValue {
	fn from(value: Value) -> Self {
		Self::Scalar(value)
	}
}

impl From<IndexMap<String, Value>> for InputValue {
	fn from(fields: IndexMap<String, Value>) -> Self {
		Self::Fields(fields)
	}
}

/// A source of raw filter input.
pub trait InputSource {
	/// Every entry, in input order.
	fn entries(&self) -> FilterResult<Vec<(String, InputValue)>>;

	/// Entries whose key is one of `keys`, in input order.
	fn only(&self, keys: &[String]) -> FilterResult<Vec<(String, InputValue)>> {
		Ok(self
			.entries()?
			.into_iter()
			.filter(|(key, _)| keys.contains(key))
			.collect())
	}
}

impl InputSource for IndexMap<String, InputValue> {
	fn entries(&self) -> FilterResult<Vec<(String, InputValue)>> {
		Ok(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}
}

/// Query string parameters.
///
/// Understands the bracket conventions of HTML forms: `key[]=a&key[]=b`
/// collects a list, `rule[field]=v` a field map and `rule[field][]=v` a list
/// inside a field map. Any other use of brackets is kept as a plain key.
///
/// # Examples
///
/// ```rust
/// use sieve_filter::input::{InputSource, InputValue, QueryParams};
/// use sieve_query::Value;
///
/// let params = QueryParams::parse("contains[name]=wallace&in[id][]=1&in[id][]=2").unwrap();
/// let entries = params.only(&["in".to_string()]).unwrap();
///
/// match &entries[0].1 {
/// 	InputValue::Fields(fields) => {
/// 		assert_eq!(fields["id"], Value::from(vec!["1", "2"]));
/// 	}
/// 	other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
	entries: IndexMap<String, InputValue>,
}

enum KeyShape<'a> {
	Plain(&'a str),
	List(&'a str),
	Field(&'a str, &'a str),
	FieldList(&'a str, &'a str),
}

fn key_shape(key: &str) -> KeyShape<'_> {
	let Some(open) = key.find('[').filter(|&open| open > 0) else {
		return KeyShape::Plain(key);
	};
	let (base, rest) = key.split_at(open);
	if rest == "[]" {
		return KeyShape::List(base);
	}

	let Some((field, tail)) = rest[1..].split_once(']') else {
		return KeyShape::Plain(key);
	};
	if field.contains('[') {
		return KeyShape::Plain(key);
	}
	match tail {
		"" => KeyShape::Field(base, field),
		"[]" => KeyShape::FieldList(base, field),
		_ => KeyShape::Plain(key),
	}
}

fn push_list(slot: &mut Value, value: Value) {
	match slot {
		Value::List(items) => items.push(value),
		other => *other = Value::List(vec![value]),
	}
}

impl QueryParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse an URL-encoded query string, without the leading `?`.
	pub fn parse(query: &str) -> FilterResult<Self> {
		let pairs: Vec<(String, String)> =
			serde_urlencoded::from_str(query).map_err(|e| FilterError::InvalidInput(e.to_string()))?;

		let mut params = Self::new();
		for (key, value) in pairs {
			params.push(&key, Value::String(value));
		}
		Ok(params)
	}

	/// Add one decoded `key=value` pair.
	pub fn push(&mut self, key: &str, value: Value) {
		match key_shape(key) {
			KeyShape::Plain(key) => {
				self.entries.insert(key.to_string(), InputValue::Scalar(value));
			}
			KeyShape::List(key) => {
				let entry = self
					.entries
					.entry(key.to_string())
					.or_insert_with(|| InputValue::Scalar(Value::List(Vec::new())));
				match entry {
					InputValue::Scalar(slot) => push_list(slot, value),
					other => *other = InputValue::Scalar(Value::List(vec![value])),
				}
			}
			KeyShape::Field(key, field) => {
				self.with_fields(key, |fields| {
					fields.insert(field.to_string(), value);
				});
			}
			KeyShape::FieldList(key, field) => {
				self.with_fields(key, |fields| {
					let slot = fields
						.entry(field.to_string())
						.or_insert_with(|| Value::List(Vec::new()));
					push_list(slot, value);
				});
			}
		}
	}

	fn with_fields(&mut self, key: &str, f: impl FnOnce(&mut IndexMap<String, Value>)) {
		let entry = self
			.entries
			.entry(key.to_string())
			.or_insert_with(|| InputValue::Fields(IndexMap::new()));
		match entry {
			InputValue::Fields(fields) => f(fields),
			InputValue::Scalar(_) => {
				let mut fields = IndexMap::new();
				f(&mut fields);
				*entry = InputValue::Fields(fields);
			}
		}
	}

	pub fn get(&self, key: &str) -> Option<&InputValue> {
		self.entries.get(key)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl InputSource for QueryParams {
	fn entries(&self) -> FilterResult<Vec<(String, InputValue)>> {
		InputSource::entries(&self.entries)
	}

	fn only(&self, keys: &[String]) -> FilterResult<Vec<(String, InputValue)>> {
		InputSource::only(&self.entries, keys)
	}
}

/// Objects become field maps; objects nested deeper are not supported.
fn json_input(value: &serde_json::Value) -> Option<InputValue> {
	match value {
		serde_json::Value::Object(map) => map
			.iter()
			.map(|(field, v)| Value::try_from(v.clone()).ok().map(|v| (field.clone(), v)))
			.collect::<Option<IndexMap<_, _>>>()
			.map(InputValue::Fields),
		other => Value::try_from(other.clone()).ok().map(InputValue::Scalar),
	}
}

impl InputSource for serde_json::Map<String, serde_json::Value> {
	/// Entries that cannot be represented are skipped.
	fn entries(&self) -> FilterResult<Vec<(String, InputValue)>> {
		Ok(self
			.iter()
			.filter_map(|(key, value)| json_input(value).map(|input| (key.clone(), input)))
			.collect())
	}

	fn only(&self, keys: &[String]) -> FilterResult<Vec<(String, InputValue)>> {
		self.iter()
			.filter(|(key, _)| keys.contains(*key))
			.map(|(key, value)| {
				json_input(value)
					.map(|input| (key.clone(), input))
					.ok_or_else(|| FilterError::InvalidInput(format!("unsupported value for \"{}\"", key)))
			})
			.collect()
	}
}

/// Rule name to field name to value, in input order.
///
/// # Examples
///
/// ```rust
/// use sieve_filter::FilterRequest;
/// use serde_json::json;
///
/// let request = FilterRequest::from_json(json!({
/// 	"max": {"age": "18"},
/// 	"contains": {"name": "wallace"},
/// }))
/// .unwrap();
///
/// assert_eq!(request.rules().collect::<Vec<_>>(), vec!["max", "contains"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterRequest(IndexMap<String, IndexMap<String, Value>>);

impl FilterRequest {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a request from a JSON object of field maps.
	pub fn from_json(value: serde_json::Value) -> FilterResult<Self> {
		if !value.is_object() {
			return Err(FilterError::InvalidInput(
				"filter request must be an object of rule names".to_string(),
			));
		}
		Ok(serde_json::from_value(value)?)
	}

	/// Set the value of `field` for `rule`.
	pub fn insert(&mut self, rule: impl Into<String>, field: impl Into<String>, value: impl Into<Value>) {
		self.0
			.entry(rule.into())
			.or_default()
			.insert(field.into(), value.into());
	}

	/// Builder form of [`insert`](Self::insert).
	#[must_use]
	pub fn with(mut self, rule: impl Into<String>, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(rule, field, value);
		self
	}

	pub fn fields(&self, rule: &str) -> Option<&IndexMap<String, Value>> {
		self.0.get(rule)
	}

	pub fn rules(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, Value>)> {
		self.0.iter().map(|(rule, fields)| (rule.as_str(), fields))
	}

	/// Number of rules.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// What a filter is applied from.
pub enum FilterInput<'a> {
	/// Raw input, run through extraction first
	Source(&'a dyn InputSource),
	/// Already structured input, used as is
	Request(FilterRequest),
}

impl<'a, S: InputSource> From<&'a S> for FilterInput<'a> {
	fn from(source: &'a S) -> Self {
		Self::Source(source)
	}
}

impl From<FilterRequest> for FilterInput<'_> {
	fn from(request: FilterRequest) -> Self {
		Self::Request(request)
	}
}

/// Remapping applied to every `(rule, key, value)` triple of a raw source.
///
/// Returning `None`, or an empty key, drops the triple.
pub type DataCallback = Arc<dyn Fn(&str, &str, &Value) -> Option<(String, Value)> + Send + Sync>;

/// Remap `key=rule<delimiter>value` entries, so that `email=contains:31`
/// filters `email` with `contains` and value `31`.
///
/// # Examples
///
/// ```rust
/// use sieve_filter::input::rule_prefixed_values;
/// use sieve_query::Value;
///
/// let remap = rule_prefixed_values(':');
///
/// assert_eq!(
/// 	remap("exact", "phones.country", &Value::from("exact:55")),
/// 	Some(("phones.country".to_string(), Value::from("55")))
/// );
/// assert_eq!(remap("contains", "phones.country", &Value::from("exact:55")), None);
/// ```
pub fn rule_prefixed_values(delimiter: char) -> DataCallback {
	Arc::new(move |rule: &str, key: &str, value: &Value| {
		let (prefix, rest) = value.as_str()?.split_once(delimiter)?;
		(prefix == rule).then(|| (key.to_string(), Value::from(rest)))
	})
}

/// Narrows raw input down to a [`FilterRequest`].
#[derive(Clone, Default)]
pub struct RequestDataExtractor {
	prefix: Option<String>,
	data_callback: Option<DataCallback>,
}

impl RequestDataExtractor {
	pub fn new() -> Self {
		Self::default()
	}

	/// Read rule keys as `prefix + rule`.
	#[must_use]
	pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
		self.prefix = prefix;
		self
	}

	/// Switch to remap mode.
	#[must_use]
	pub fn with_data_callback(mut self, callback: Option<DataCallback>) -> Self {
		self.data_callback = callback;
		self
	}

	/// Extract the entries of `source` that belong to `rules`.
	///
	/// Without a data callback, only keys equal to a (prefixed) rule name are
	/// read, empty rule entries are dropped and a non-empty scalar under a
	/// rule key is rejected. With a data callback, every scalar entry is
	/// offered to the callback once per rule, and the prefix is not used.
	pub fn extract<'n, I>(&self, source: &dyn InputSource, rules: I) -> FilterResult<FilterRequest>
	where
		I: IntoIterator<Item = &'n str>,
	{
		match &self.data_callback {
			Some(callback) => self.extract_remapped(source, rules, callback.as_ref()),
			None => self.extract_keyed(source, rules),
		}
	}

	fn extract_keyed<'n, I>(&self, source: &dyn InputSource, rules: I) -> FilterResult<FilterRequest>
	where
		I: IntoIterator<Item = &'n str>,
	{
		let prefix = self.prefix.as_deref().unwrap_or("");
		let keys: Vec<String> = rules.into_iter().map(|rule| format!("{}{}", prefix, rule)).collect();

		let mut request = FilterRequest::new();
		for (key, input) in source.only(&keys)? {
			let rule = key.strip_prefix(prefix).unwrap_or(&key);
			match input {
				InputValue::Fields(fields) => {
					for (field, value) in fields {
						request.insert(rule, field, value);
					}
				}
				InputValue::Scalar(value) if value.is_empty() => {}
				InputValue::Scalar(_) => {
					return Err(FilterError::InvalidInput(format!(
						"filter rule \"{}\" expects a map of fields",
						rule
					)));
				}
			}
		}
		Ok(request)
	}

	fn extract_remapped<'n, I>(
		&self,
		source: &dyn InputSource,
		rules: I,
		callback: &(dyn Fn(&str, &str, &Value) -> Option<(String, Value)> + Send + Sync),
	) -> FilterResult<FilterRequest>
	where
		I: IntoIterator<Item = &'n str>,
	{
		let entries = source.entries()?;

		let mut request = FilterRequest::new();
		for rule in rules {
			for (key, input) in &entries {
				let InputValue::Scalar(value) = input else {
					continue;
				};
				if let Some((field, value)) = callback(rule, key, value)
					&& !field.is_empty()
				{
					request.insert(rule, field, value);
				}
			}
		}
		Ok(request)
	}
}

impl fmt::Debug for RequestDataExtractor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RequestDataExtractor")
			.field("prefix", &self.prefix)
			.field("data_callback", &self.data_callback.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	const RULES: [&str; 3] = ["exact", "contains", "in"];

	#[rstest]
	fn test_query_params_shapes() {
		let params = QueryParams::parse("page=2&tags[]=a&tags[]=b&exact[name]=W&in[id][]=1&in[id][]=2").unwrap();

		assert_eq!(params.get("page"), Some(&InputValue::Scalar(Value::from("2"))));
		assert_eq!(
			params.get("tags"),
			Some(&InputValue::Scalar(Value::from(vec!["a", "b"])))
		);
		match params.get("in") {
			Some(InputValue::Fields(fields)) => assert_eq!(fields["id"], Value::from(vec!["1", "2"])),
			other => panic!("unexpected {:?}", other),
		}
	}

	#[rstest]
	#[case("a[b")]
	#[case("[x]")]
	#[case("a[b]c")]
	#[case("a[b[c]]")]
	fn test_malformed_brackets_stay_plain(#[case] key: &str) {
		let mut params = QueryParams::new();
		params.push(key, Value::from("v"));

		assert_eq!(params.get(key), Some(&InputValue::Scalar(Value::from("v"))));
	}

	#[rstest]
	fn test_query_params_decode_percent_encoding() {
		let params = QueryParams::parse("contains%5Bname%5D=wallace+souza").unwrap();

		match params.get("contains") {
			Some(InputValue::Fields(fields)) => assert_eq!(fields["name"], Value::from("wallace souza")),
			other => panic!("unexpected {:?}", other),
		}
	}

	#[rstest]
	fn test_extract_keeps_registered_rules_only() {
		let params = QueryParams::parse("contains[name]=W&regex[name]=x&page=2").unwrap();

		let request = RequestDataExtractor::new().extract(&params, RULES).unwrap();

		assert_eq!(request, FilterRequest::new().with("contains", "name", "W"));
	}

	#[rstest]
	fn test_extract_drops_empty_rule_entries() {
		let params = QueryParams::parse("exact=&contains[name]=W").unwrap();

		let request = RequestDataExtractor::new().extract(&params, RULES).unwrap();

		assert_eq!(request.rules().collect::<Vec<_>>(), vec!["contains"]);
	}

	#[rstest]
	fn test_extract_rejects_scalar_rule_value() {
		let params = QueryParams::parse("exact=W").unwrap();

		let result = RequestDataExtractor::new().extract(&params, RULES);

		assert!(matches!(result, Err(FilterError::InvalidInput(_))));
	}

	#[rstest]
	fn test_extract_with_prefix() {
		let params = QueryParams::parse("filter_exact[age]=3&exact[name]=W").unwrap();

		let request = RequestDataExtractor::new()
			.with_prefix(Some("filter_".to_string()))
			.extract(&params, RULES)
			.unwrap();

		assert_eq!(request, FilterRequest::new().with("exact", "age", "3"));
	}

	#[rstest]
	fn test_extract_remapped() {
		let params = QueryParams::parse("phones.country=exact:55&name=contains:wal&page=2").unwrap();

		let request = RequestDataExtractor::new()
			.with_data_callback(Some(rule_prefixed_values(':')))
			.extract(&params, RULES)
			.unwrap();

		assert_eq!(
			request,
			FilterRequest::new()
				.with("exact", "phones.country", "55")
				.with("contains", "name", "wal")
		);
	}

	#[rstest]
	fn test_remap_drops_empty_keys() {
		let callback: DataCallback = Arc::new(|_: &str, _: &str, value: &Value| Some((String::new(), value.clone())));
		let params = QueryParams::parse("name=W").unwrap();

		let request = RequestDataExtractor::new()
			.with_data_callback(Some(callback))
			.extract(&params, RULES)
			.unwrap();

		assert!(request.is_empty());
	}

	#[rstest]
	fn test_json_map_source() {
		let body = json!({
			"contains": {"name": "W"},
			"in": {"id": [1, 2]},
			"meta": {"nested": {"deep": true}},
		});
		let map = body.as_object().unwrap();

		let request = RequestDataExtractor::new().extract(map, RULES).unwrap();

		assert_eq!(
			request,
			FilterRequest::new()
				.with("contains", "name", "W")
				.with("in", "id", vec![1, 2])
		);
	}

	#[rstest]
	fn test_from_json_rejects_non_object() {
		let result = FilterRequest::from_json(json!(["exact"]));

		assert!(matches!(result, Err(FilterError::InvalidInput(_))));
	}

	#[rstest]
	fn test_from_json_rejects_scalar_rule() {
		let result = FilterRequest::from_json(json!({"exact": "W"}));

		assert!(matches!(result, Err(FilterError::Json(_))));
	}
}
