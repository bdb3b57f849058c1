//! Field/rule allow-lists.

use crate::error::RestrictionError;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Wildcard rule name.
pub const WILDCARD: &str = "*";

/// The rules permitted on one field.
///
/// Deserializes from `"*"` or `true` (any rule), a single rule name, or a
/// list of rule names. A list containing `"*"` permits any rule as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPermission", into = "RawPermission")]
pub enum Permission {
	/// Every rule is permitted
	Any,
	/// Only the listed rules are permitted
	Rules(IndexSet<String>),
}

impl Permission {
	/// Permit the given rule names.
	pub fn rules<I, S>(rules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Rules(rules.into_iter().map(Into::into).collect())
	}

	/// Returns `true` if `rule` may be used.
	pub fn permits(&self, rule: &str) -> bool {
		match self {
			Self::Any => true,
			Self::Rules(rules) => rules.contains(rule) || rules.contains(WILDCARD),
		}
	}
}

impl From<&str> for Permission {
	fn from(rule: &str) -> Self {
		if rule == WILDCARD {
			Self::Any
		} else {
			Self::rules([rule])
		}
	}
}

impl From<String> for Permission {
	fn from(rule: String) -> Self {
		Self::from(rule.as_str())
	}
}

impl From<bool> for Permission {
	fn from(any: bool) -> Self {
		if any { Self::Any } else { Self::Rules(IndexSet::new()) }
	}
}

impl<S: Into<String>> From<Vec<S>> for Permission {
	fn from(rules: Vec<S>) -> Self {
		Self::rules(rules)
	}
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Permission {
	fn from(rules: [S; N]) -> Self {
		Self::rules(rules)
	}
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPermission {
	Flag(bool),
	One(String),
	Many(Vec<String>),
}

impl From<RawPermission> for Permission {
	fn from(raw: RawPermission) -> Self {
		match raw {
			RawPermission::Flag(any) => Self::from(any),
			RawPermission::One(rule) => Self::from(rule),
			RawPermission::Many(rules) => Self::rules(rules),
		}
	}
}

impl From<Permission> for RawPermission {
	fn from(permission: Permission) -> Self {
		match permission {
			Permission::Any => Self::One(WILDCARD.to_string()),
			Permission::Rules(rules) => Self::Many(rules.into_iter().collect()),
		}
	}
}

/// Field name to permitted rules.
///
/// # Examples
///
/// ```rust
/// use sieve_filter::{AllowList, Permission};
///
/// let list: AllowList = [
/// 	("name", Permission::rules(["contains", "starts_with"])),
/// 	("age", Permission::Any),
/// ]
/// .into_iter()
/// .collect();
///
/// assert!(list.check("contains", "name").is_ok());
/// assert!(list.check("exact", "name").is_err());
/// assert!(list.check("exact", "age").is_ok());
/// assert!(list.check("exact", "email").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList(IndexMap<String, Permission>);

impl AllowList {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declare the rules permitted on `field`, replacing any earlier
	/// declaration.
	pub fn insert(&mut self, field: impl Into<String>, permission: impl Into<Permission>) {
		self.0.insert(field.into(), permission.into());
	}

	pub fn get(&self, field: &str) -> Option<&Permission> {
		self.0.get(field)
	}

	pub fn contains_field(&self, field: &str) -> bool {
		self.0.contains_key(field)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Declared fields and their permissions, in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Permission)> {
		self.0.iter().map(|(field, permission)| (field.as_str(), permission))
	}

	/// Check `rule` on `field` against this list.
	///
	/// An empty list permits nothing here; the default-open behaviour lives
	/// in [`AllowListGuard`].
	pub fn check(&self, rule: &str, field: &str) -> Result<(), RestrictionError> {
		match self.0.get(field) {
			None => Err(RestrictionError::FieldNotAllowed {
				field: field.to_string(),
				rule: rule.to_string(),
			}),
			Some(permission) if !permission.permits(rule) => Err(RestrictionError::RuleNotAllowed {
				field: field.to_string(),
				rule: rule.to_string(),
			}),
			Some(_) => Ok(()),
		}
	}
}

impl<K, P> FromIterator<(K, P)> for AllowList
where
	K: Into<String>,
	P: Into<Permission>,
{
	fn from_iter<T: IntoIterator<Item = (K, P)>>(iter: T) -> Self {
		Self(
			iter.into_iter()
				.map(|(field, permission)| (field.into(), permission.into()))
				.collect(),
		)
	}
}

impl<K, P> Extend<(K, P)> for AllowList
where
	K: Into<String>,
	P: Into<Permission>,
{
	fn extend<T: IntoIterator<Item = (K, P)>>(&mut self, iter: T) {
		for (field, permission) in iter {
			self.insert(field, permission);
		}
	}
}

/// Enforces an [`AllowList`] on incoming (rule, field) pairs.
///
/// An empty list leaves every pair unrestricted. Configure one before
/// applying filters built from untrusted input.
#[derive(Debug, Clone, Default)]
pub struct AllowListGuard {
	list: AllowList,
}

impl AllowListGuard {
	pub fn new(list: AllowList) -> Self {
		Self { list }
	}

	/// Replace the enforced list.
	pub fn set(&mut self, list: AllowList) {
		self.list = list;
	}

	/// Remove every restriction.
	pub fn clear(&mut self) {
		self.list = AllowList::new();
	}

	pub fn is_restricted(&self) -> bool {
		!self.list.is_empty()
	}

	pub fn allow_list(&self) -> &AllowList {
		&self.list
	}

	/// Check one (rule, field) pair.
	pub fn check(&self, rule: &str, field: &str) -> Result<(), RestrictionError> {
		if !self.is_restricted() {
			return Ok(());
		}

		self.list.check(rule, field).inspect_err(|err| {
			tracing::warn!("Filter rejected by allow-list: {}", err);
		})
	}
}
