//! Error types for filter configuration and application.

use thiserror::Error;

/// Allow-list violation for a (rule, field) pair.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestrictionError {
	/// The field is not declared in the allow-list at all
	#[error("Cannot use filter \"{field}\" field with rule \"{rule}\": field is not filterable")]
	FieldNotAllowed {
		/// Requested field
		field: String,
		/// Requested rule
		rule: String,
	},

	/// The field is declared but the rule is not permitted on it
	#[error("Cannot use filter \"{field}\" field with rule \"{rule}\"")]
	RuleNotAllowed {
		/// Requested field
		field: String,
		/// Requested rule
		rule: String,
	},
}

impl RestrictionError {
	/// The rejected field.
	pub fn field(&self) -> &str {
		match self {
			Self::FieldNotAllowed { field, .. } | Self::RuleNotAllowed { field, .. } => field,
		}
	}

	/// The rejected rule.
	pub fn rule(&self) -> &str {
		match self {
			Self::FieldNotAllowed { rule, .. } | Self::RuleNotAllowed { rule, .. } => rule,
		}
	}
}

/// Errors raised while configuring or applying a filter.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FilterError {
	#[error("Unknown filter rule \"{0}\"")]
	UnknownRule(String),

	#[error("Invalid filter rule \"{name}\": {reason}")]
	InvalidRule { name: String, reason: String },

	#[error(transparent)]
	Restriction(#[from] RestrictionError),

	#[error("Invalid filter input: {0}")]
	InvalidInput(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid filter settings: {0}")]
	Settings(String),
}

pub type FilterResult<T> = Result<T, FilterError>;
