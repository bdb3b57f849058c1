//! Field path parsing.
//!
//! A field key is either a plain column (`name`) or a relation-qualified
//! column (`phones.number`). The split happens at the last separator, so
//! only the final segment is the column.

/// Separator between a relation path and a column.
pub const SEPARATOR: char = '.';

/// Split `field` into `(local_field, relation)`.
///
/// A key without a separator, or whose only separator is the first
/// character, has an empty relation and is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use sieve_filter::path::parse_relation;
///
/// assert_eq!(parse_relation("phones.number"), ("number", "phones"));
/// assert_eq!(parse_relation("author.roles.name"), ("name", "author.roles"));
/// assert_eq!(parse_relation("name"), ("name", ""));
/// assert_eq!(parse_relation(".name"), (".name", ""));
/// ```
pub fn parse_relation(field: &str) -> (&str, &str) {
	match field.rfind(SEPARATOR) {
		Some(index) if index > 0 => (&field[index + 1..], &field[..index]),
		_ => (field, ""),
	}
}

/// Returns `true` if `field` crosses a relation boundary.
pub fn contains_relation(field: &str) -> bool {
	field.rfind(SEPARATOR).is_some_and(|index| index > 0)
}
