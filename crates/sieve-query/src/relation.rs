//! Relation metadata used to render existence subqueries.

/// How a related table is correlated with its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationJoin {
	/// `related.related_column = parent.parent_column`
	Direct {
		related_column: String,
		parent_column: String,
	},
	/// Correlation through a pivot table:
	/// `pivot.pivot_related_column = related.related_key` and
	/// `pivot.pivot_parent_column = parent.parent_key`
	Pivot {
		pivot_table: String,
		pivot_parent_column: String,
		pivot_related_column: String,
		related_key: String,
		parent_key: String,
	},
}

/// A named association from the queried table to another table.
///
/// # Examples
///
/// ```rust
/// use sieve_query::Relation;
///
/// // users.id <- phones.user_id
/// let phones = Relation::has_many("phones", "phones", "user_id");
/// // phones.user_id -> users.id
/// let user = Relation::belongs_to("user", "users", "user_id");
/// // users <- role_user -> roles
/// let roles = Relation::belongs_to_many("roles", "roles", "role_user", "user_id", "role_id");
///
/// assert_eq!(phones.name(), "phones");
/// assert_eq!(user.table(), "users");
/// assert_eq!(roles.table(), "roles");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
	name: String,
	table: String,
	join: RelationJoin,
}

impl Relation {
	/// Create a relation correlated by `table.related_column = parent.parent_column`.
	pub fn new(
		name: impl Into<String>,
		table: impl Into<String>,
		related_column: impl Into<String>,
		parent_column: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			table: table.into(),
			join: RelationJoin::Direct {
				related_column: related_column.into(),
				parent_column: parent_column.into(),
			},
		}
	}

	/// One-to-many: the related table holds `foreign_key` pointing at the
	/// parent's `id`.
	pub fn has_many(
		name: impl Into<String>,
		table: impl Into<String>,
		foreign_key: impl Into<String>,
	) -> Self {
		Self::new(name, table, foreign_key, "id")
	}

	/// Inverse side: the parent holds `foreign_key` pointing at the related
	/// table's `id`.
	pub fn belongs_to(
		name: impl Into<String>,
		table: impl Into<String>,
		foreign_key: impl Into<String>,
	) -> Self {
		Self::new(name, table, "id", foreign_key)
	}

	/// Many-to-many through `pivot_table`, both sides keyed by `id`.
	pub fn belongs_to_many(
		name: impl Into<String>,
		table: impl Into<String>,
		pivot_table: impl Into<String>,
		pivot_parent_column: impl Into<String>,
		pivot_related_column: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			table: table.into(),
			join: RelationJoin::Pivot {
				pivot_table: pivot_table.into(),
				pivot_parent_column: pivot_parent_column.into(),
				pivot_related_column: pivot_related_column.into(),
				related_key: "id".to_string(),
				parent_key: "id".to_string(),
			},
		}
	}

	/// Relation name as used in filter field paths.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The related table.
	pub fn table(&self) -> &str {
		&self.table
	}

	/// Correlation between the related table and its parent.
	pub fn join(&self) -> &RelationJoin {
		&self.join
	}
}
