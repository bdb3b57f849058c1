//! Filter settings loaded from configuration files.
//!
//! ```toml
//! prefix = "filter_"
//! nesting_depth = 1
//!
//! [aliases]
//! eq = "exact"
//!
//! [filterable]
//! name = ["contains", "starts_with"]
//! age = "*"
//!
//! [filterable.phones]
//! number = "exact"
//! ```

use crate::engine::Filter;
use crate::error::{FilterError, FilterResult};
use crate::model::{DEFAULT_NESTING_DEPTH, FilterDeclaration, flatten_with_depth};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Declarative configuration of a [`Filter`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
	/// Prefix of rule keys in raw input
	pub prefix: Option<String>,
	/// Levels of nested declarations to follow
	pub nesting_depth: usize,
	/// Extra rule names for registered rules
	pub aliases: IndexMap<String, String>,
	/// Filterable fields; empty leaves the filter unrestricted
	pub filterable: FilterDeclaration,
}

impl Default for FilterSettings {
	fn default() -> Self {
		Self {
			prefix: None,
			nesting_depth: DEFAULT_NESTING_DEPTH,
			aliases: IndexMap::new(),
			filterable: FilterDeclaration::new(),
		}
	}
}

impl FilterSettings {
	pub fn from_toml_str(content: &str) -> FilterResult<Self> {
		Ok(toml::from_str(content)?)
	}

	pub fn from_json_str(content: &str) -> FilterResult<Self> {
		Ok(serde_json::from_str(content)?)
	}

	/// Load settings from a `.toml` or `.json` file.
	pub fn from_path(path: impl AsRef<Path>) -> FilterResult<Self> {
		let path = path.as_ref();
		let content = fs::read_to_string(path)?;
		match path.extension().and_then(|ext| ext.to_str()) {
			Some("toml") => Self::from_toml_str(&content),
			Some("json") => Self::from_json_str(&content),
			_ => Err(FilterError::Settings(format!(
				"unsupported settings file: {}",
				path.display()
			))),
		}
	}
}

impl Filter {
	/// Build a filter from settings.
	///
	/// # Examples
	///
	/// ```rust
	/// use sieve_filter::{Filter, FilterSettings};
	///
	/// let settings = FilterSettings::from_toml_str(r#"
	/// prefix = "filter_"
	///
	/// [aliases]
	/// eq = "exact"
	///
	/// [filterable]
	/// id = "eq"
	/// "#).unwrap();
	///
	/// let filter = Filter::from_settings(&settings).unwrap();
	/// assert_eq!(filter.prefix(), Some("filter_"));
	/// assert!(filter.allow_list().check("eq", "id").is_ok());
	/// ```
	pub fn from_settings(settings: &FilterSettings) -> FilterResult<Self> {
		let mut filter = Filter::new();
		for (alias, target) in &settings.aliases {
			if !filter.has_rule(target) {
				return Err(FilterError::Settings(format!(
					"alias \"{}\" refers to unknown rule \"{}\"",
					alias, target
				)));
			}
			filter.set_rule_alias(alias.as_str(), target)?;
		}
		if let Some(prefix) = &settings.prefix {
			filter.set_prefix(prefix.as_str());
		}
		filter.allow(flatten_with_depth(
			&settings.filterable,
			"",
			settings.nesting_depth,
		));
		Ok(filter)
	}
}
