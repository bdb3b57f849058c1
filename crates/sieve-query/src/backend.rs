//! SQL Backend implementations
//!
//! This module provides database-specific SQL generation for PostgreSQL,
//! MySQL and SQLite. The dialects only differ in identifier quoting,
//! placeholder style and date functions; rendering of the statement itself
//! is shared.

use crate::{
	error::{QueryError, QueryResult},
	expr::{Condition, ConditionExpression, ConditionType, DatePart, Predicate},
	relation::{Relation, RelationJoin},
	select::SelectStatement,
	value::{Value, Values},
};

mod mysql;
mod postgres;
mod sql_writer;
mod sqlite;

pub use mysql::MySqlQueryBuilder;
pub use postgres::PostgresQueryBuilder;
pub use sql_writer::SqlWriter;
pub use sqlite::SqliteQueryBuilder;

/// Query builder trait for generating SQL from statements
///
/// # Implementations
///
/// - [`PostgresQueryBuilder`] - PostgreSQL backend
/// - [`MySqlQueryBuilder`] - MySQL backend
/// - [`SqliteQueryBuilder`] - SQLite backend
///
/// # Examples
///
/// ```rust
/// use sieve_query::backend::{MySqlQueryBuilder, QueryBuilder};
/// use sieve_query::{FilterQuery, SelectStatement};
///
/// let mut stmt = SelectStatement::new("users");
/// stmt.where_null("deleted_at");
///
/// let (sql, values) = MySqlQueryBuilder::new().build_select(&stmt).unwrap();
/// assert_eq!(sql, "SELECT * FROM `users` WHERE `deleted_at` IS NULL");
/// assert!(values.is_empty());
/// ```
pub trait QueryBuilder {
	/// Quote a single identifier.
	fn escape_iden(&self, ident: &str) -> String;

	/// Placeholder for the 1-based parameter `index`.
	fn placeholder(&self, index: usize) -> String;

	/// Expression extracting `part` from an already quoted column.
	fn date_part(&self, column: &str, part: DatePart) -> String;

	/// Build a SELECT statement, returning the SQL and its parameter values.
	fn build_select(&self, stmt: &SelectStatement) -> QueryResult<(String, Values)> {
		let mut writer = SqlWriter::new();
		Renderer::new(self, stmt).write_select(&mut writer)?;
		Ok(writer.finish())
	}

	/// Build a SELECT statement with values inlined as literals.
	fn build_select_inline(&self, stmt: &SelectStatement) -> QueryResult<String> {
		let mut writer = SqlWriter::inline();
		Renderer::new(self, stmt).write_select(&mut writer)?;
		Ok(writer.into_string())
	}
}

/// Table that unqualified columns refer to. Inside a relation subquery
/// they are qualified with it, since a pivot join may share column names.
#[derive(Clone, Copy)]
struct TableScope<'s> {
	table: &'s str,
	qualify: bool,
}

impl<'s> TableScope<'s> {
	fn root(table: &'s str) -> Self {
		Self { table, qualify: false }
	}

	fn related(table: &'s str) -> Self {
		Self { table, qualify: true }
	}
}

struct Renderer<'a, B: QueryBuilder + ?Sized> {
	builder: &'a B,
	stmt: &'a SelectStatement,
}

impl<'a, B: QueryBuilder + ?Sized> Renderer<'a, B> {
	fn new(builder: &'a B, stmt: &'a SelectStatement) -> Self {
		Self { builder, stmt }
	}

	fn write_select(&self, writer: &mut SqlWriter) -> QueryResult<()> {
		writer.push("SELECT ");
		if self.stmt.columns().is_empty() {
			writer.push("*");
		} else {
			writer.push_list(self.stmt.columns(), ", ", |w, col| {
				w.push(&self.column(col, TableScope::root(self.stmt.table())));
			});
		}
		writer.push(" FROM ");
		writer.push_identifier(self.stmt.table(), |s| self.builder.escape_iden(s));

		let condition = self.stmt.condition();
		if !condition.is_vacuous() {
			writer.push(" WHERE ");
			self.write_members(writer, condition, TableScope::root(self.stmt.table()))?;
		}
		Ok(())
	}

	/// Quote a column. A dotted name is quoted segment by segment; a name
	/// with an empty segment (`.name`) is one literal identifier.
	fn column(&self, column: &str, scope: TableScope<'_>) -> String {
		let dotted = column.contains('.') && column.split('.').all(|segment| !segment.is_empty());
		if dotted {
			column
				.split('.')
				.map(|segment| self.builder.escape_iden(segment))
				.collect::<Vec<_>>()
				.join(".")
		} else if scope.qualify {
			self.qualified(scope.table, column)
		} else {
			self.builder.escape_iden(column)
		}
	}

	fn qualified(&self, table: &str, column: &str) -> String {
		format!(
			"{}.{}",
			self.builder.escape_iden(table),
			self.builder.escape_iden(column)
		)
	}

	/// Write the members of a chain without surrounding parentheses.
	fn write_members(&self, writer: &mut SqlWriter, condition: &Condition, scope: TableScope<'_>) -> QueryResult<()> {
		let members = condition.conditions.iter().filter(|c| !c.is_vacuous());
		writer.try_push_list(members, condition.condition_type.separator(), |w, member| {
			self.write_expr(w, member, scope)
		})
	}

	fn write_condition(&self, writer: &mut SqlWriter, condition: &Condition, scope: TableScope<'_>) -> QueryResult<()> {
		let members: Vec<&ConditionExpression> = condition
			.conditions
			.iter()
			.filter(|c| !c.is_vacuous())
			.collect();
		if members.is_empty() {
			return Ok(());
		}

		if condition.negate {
			writer.push("NOT ");
		}

		if members.len() == 1 {
			return self.write_expr(writer, members[0], scope);
		}

		writer.push("(");
		writer.try_push_list(members, condition.condition_type.separator(), |w, member| {
			self.write_expr(w, member, scope)
		})?;
		writer.push(")");
		Ok(())
	}

	fn write_expr(&self, writer: &mut SqlWriter, expr: &ConditionExpression, scope: TableScope<'_>) -> QueryResult<()> {
		match expr {
			ConditionExpression::Predicate(predicate) => self.write_predicate(writer, predicate, scope),
			ConditionExpression::Condition(condition) => self.write_condition(writer, condition, scope),
		}
	}

	fn write_value(&self, writer: &mut SqlWriter, value: &Value) {
		match value {
			Value::List(items) => {
				writer.push("(");
				writer.push_list(items, ", ", |w, item| {
					w.push_value(item.clone(), |i| self.builder.placeholder(i));
				});
				writer.push(")");
			}
			other => {
				writer.push_value(other.clone(), |i| self.builder.placeholder(i));
			}
		}
	}

	fn write_predicate(&self, writer: &mut SqlWriter, predicate: &Predicate, scope: TableScope<'_>) -> QueryResult<()> {
		match predicate {
			Predicate::Compare { column, op, value } => {
				writer.push(&self.column(column, scope));
				writer.push(" ");
				writer.push(op.as_str());
				writer.push(" ");
				self.write_value(writer, value);
			}
			Predicate::Like { column, pattern } => {
				writer.push(&self.column(column, scope));
				writer.push(" LIKE ");
				self.write_value(writer, pattern);
			}
			Predicate::In {
				column,
				values,
				negated,
			} => {
				if values.is_empty() {
					// IN () is not valid SQL; an empty set matches nothing
					writer.push(if *negated { "1 = 1" } else { "1 = 0" });
					return Ok(());
				}
				writer.push(&self.column(column, scope));
				writer.push(if *negated { " NOT IN (" } else { " IN (" });
				writer.push_list(values, ", ", |w, item| {
					w.push_value(item.clone(), |i| self.builder.placeholder(i));
				});
				writer.push(")");
			}
			Predicate::Null { column, negated } => {
				writer.push(&self.column(column, scope));
				writer.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
			}
			Predicate::DatePart {
				column,
				part,
				op,
				value,
			} => {
				writer.push(&self.builder.date_part(&self.column(column, scope), *part));
				writer.push(" ");
				writer.push(op.as_str());
				writer.push(" ");
				self.write_value(writer, value);
			}
			Predicate::Exists {
				relation,
				condition,
				negated,
			} => {
				let chain = self.resolve_relation(relation)?;
				if *negated {
					writer.push("NOT ");
				}
				self.write_exists(writer, &chain, condition, scope.table)?;
			}
		}
		Ok(())
	}

	/// Resolve a relation path. A declared name wins; otherwise a dotted
	/// path is resolved segment by segment into nested subqueries.
	fn resolve_relation(&self, path: &str) -> QueryResult<Vec<&'a Relation>> {
		if let Some(relation) = self.stmt.get_relation(path) {
			return Ok(vec![relation]);
		}
		path.split('.')
			.map(|segment| {
				self.stmt
					.get_relation(segment)
					.ok_or_else(|| QueryError::UnknownRelation(path.to_string()))
			})
			.collect()
	}

	fn write_exists(
		&self,
		writer: &mut SqlWriter,
		chain: &[&Relation],
		condition: &Condition,
		parent_table: &str,
	) -> QueryResult<()> {
		let Some((relation, rest)) = chain.split_first() else {
			return Ok(());
		};

		writer.push("EXISTS (SELECT 1 FROM ");
		writer.push_identifier(relation.table(), |s| self.builder.escape_iden(s));
		match relation.join() {
			RelationJoin::Direct {
				related_column,
				parent_column,
			} => {
				writer.push(" WHERE ");
				writer.push(&self.qualified(relation.table(), related_column));
				writer.push(" = ");
				writer.push(&self.qualified(parent_table, parent_column));
			}
			RelationJoin::Pivot {
				pivot_table,
				pivot_parent_column,
				pivot_related_column,
				related_key,
				parent_key,
			} => {
				writer.push(" INNER JOIN ");
				writer.push_identifier(pivot_table, |s| self.builder.escape_iden(s));
				writer.push(" ON ");
				writer.push(&self.qualified(pivot_table, pivot_related_column));
				writer.push(" = ");
				writer.push(&self.qualified(relation.table(), related_key));
				writer.push(" WHERE ");
				writer.push(&self.qualified(pivot_table, pivot_parent_column));
				writer.push(" = ");
				writer.push(&self.qualified(parent_table, parent_key));
			}
		}

		if !rest.is_empty() {
			writer.push(" AND ");
			self.write_exists(writer, rest, condition, relation.table())?;
		} else if !condition.is_vacuous() {
			writer.push(" AND ");
			if condition.condition_type == ConditionType::All && !condition.negate {
				self.write_members(writer, condition, TableScope::related(relation.table()))?;
			} else {
				self.write_condition(writer, condition, TableScope::related(relation.table()))?;
			}
		}
		writer.push(")");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::CompareOp;
	use crate::query::FilterQuery;
	use rstest::rstest;

	fn users() -> SelectStatement {
		SelectStatement::new("users")
			.relation(Relation::has_many("phones", "phones", "user_id"))
			.relation(Relation::belongs_to_many(
				"roles",
				"roles",
				"role_user",
				"user_id",
				"role_id",
			))
	}

	#[rstest]
	fn test_select_without_where() {
		let stmt = SelectStatement::new("users").column("id").column("name");
		let (sql, values) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(sql, r#"SELECT "id", "name" FROM "users""#);
		assert!(values.is_empty());
	}

	#[rstest]
	fn test_nested_group_is_parenthesised() {
		let mut stmt = users();
		stmt.where_group(&mut |q| {
			q.where_compare("age", CompareOp::LessThanOrEqual, Value::from("18"));
			q.where_like("name", Value::from("%wallace%"));
		});

		let (sql, values) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "users" WHERE ("age" <= $1 AND "name" LIKE $2)"#
		);
		assert_eq!(values.0, vec![Value::from("18"), Value::from("%wallace%")]);
	}

	#[rstest]
	fn test_empty_group_renders_nothing() {
		let mut stmt = users();
		stmt.where_group(&mut |_| {});

		let (sql, _) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(sql, r#"SELECT * FROM "users""#);
	}

	#[rstest]
	fn test_exists_direct_relation() {
		let mut stmt = users();
		stmt.where_has("phones", &mut |q| {
			q.where_compare("number", CompareOp::Equal, Value::from("3199999999"));
		});

		let (sql, values) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "users" WHERE EXISTS (SELECT 1 FROM "phones" WHERE "phones"."user_id" = "users"."id" AND "phones"."number" = $1)"#
		);
		assert_eq!(values.len(), 1);
	}

	#[rstest]
	fn test_not_exists_pivot_relation() {
		let mut stmt = users();
		stmt.where_doesnt_have("roles", &mut |q| {
			q.where_in("name", vec![Value::from("Admin"), Value::from("Owner")]);
		});

		let (sql, _) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "users" WHERE NOT EXISTS (SELECT 1 FROM "roles" INNER JOIN "role_user" ON "role_user"."role_id" = "roles"."id" WHERE "role_user"."user_id" = "users"."id" AND "roles"."name" IN ($1, $2))"#
		);
	}

	#[rstest]
	fn test_pivot_subquery_qualifies_shared_column_names() {
		let mut stmt = users();
		stmt.where_doesnt_have("roles", &mut |q| {
			q.where_compare("id", CompareOp::Equal, Value::from("2"));
		});

		let sql = SqliteQueryBuilder::new().build_select_inline(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "users" WHERE NOT EXISTS (SELECT 1 FROM "roles" INNER JOIN "role_user" ON "role_user"."role_id" = "roles"."id" WHERE "role_user"."user_id" = "users"."id" AND "roles"."id" = '2')"#
		);
	}

	#[rstest]
	#[case::plain("name", r#""name""#)]
	#[case::dotted("users.name", r#""users"."name""#)]
	#[case::leading_separator(".name", r#"".name""#)]
	#[case::trailing_separator("name.", r#""name.""#)]
	fn test_top_level_column_quoting(#[case] column: &str, #[case] expected: &str) {
		let mut stmt = SelectStatement::new("users");
		stmt.where_null(column);

		let (sql, _) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(sql, format!(r#"SELECT * FROM "users" WHERE {} IS NULL"#, expected));
	}

	#[rstest]
	fn test_subquery_keeps_explicitly_qualified_columns() {
		let mut stmt = users();
		stmt.where_has("phones", &mut |q| {
			q.where_null("carriers.name");
			q.where_null(".name");
		});

		let (sql, _) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "users" WHERE EXISTS (SELECT 1 FROM "phones" WHERE "phones"."user_id" = "users"."id" AND "carriers"."name" IS NULL AND "phones".".name" IS NULL)"#
		);
	}

	#[rstest]
	fn test_has_without_scope() {
		let mut stmt = users();
		stmt.has("phones");

		let (sql, _) = SqliteQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "users" WHERE EXISTS (SELECT 1 FROM "phones" WHERE "phones"."user_id" = "users"."id")"#
		);
	}

	#[rstest]
	fn test_dotted_relation_path_nests_subqueries() {
		let mut stmt = SelectStatement::new("posts")
			.relation(Relation::belongs_to("author", "users", "author_id"))
			.relation(Relation::has_many("phones", "phones", "user_id"));
		stmt.where_has("author.phones", &mut |q| {
			q.where_compare("ddd", CompareOp::Equal, Value::from("31"));
		});

		let (sql, _) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "posts" WHERE EXISTS (SELECT 1 FROM "users" WHERE "users"."id" = "posts"."author_id" AND EXISTS (SELECT 1 FROM "phones" WHERE "phones"."user_id" = "users"."id" AND "phones"."ddd" = $1))"#
		);
	}

	#[rstest]
	fn test_unknown_relation_is_an_error() {
		let mut stmt = SelectStatement::new("users");
		stmt.has("documents");

		let err = PostgresQueryBuilder::new().build_select(&stmt).unwrap_err();

		assert!(matches!(err, QueryError::UnknownRelation(name) if name == "documents"));
	}

	#[rstest]
	fn test_empty_in_matches_nothing() {
		let mut stmt = SelectStatement::new("users");
		stmt.where_in("id", vec![]);
		stmt.where_not_in("id", vec![]);

		let (sql, _) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(sql, r#"SELECT * FROM "users" WHERE 1 = 0 AND 1 = 1"#);
	}

	#[rstest]
	fn test_negated_condition() {
		let mut stmt = SelectStatement::new("users");
		stmt.push_condition(
			Condition::any()
				.add(Predicate::Null {
					column: "a".to_string(),
					negated: false,
				})
				.add(Predicate::Null {
					column: "b".to_string(),
					negated: false,
				})
				.not(),
		);

		let (sql, _) = PostgresQueryBuilder::new().build_select(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "users" WHERE NOT ("a" IS NULL OR "b" IS NULL)"#
		);
	}

	#[rstest]
	fn test_inline_rendering() {
		let mut stmt = SelectStatement::new("users");
		stmt.where_group(&mut |q| {
			q.where_compare("age", CompareOp::LessThanOrEqual, Value::from("18"));
			q.where_like("name", Value::from("%wallace%"));
		});

		let sql = PostgresQueryBuilder::new().build_select_inline(&stmt).unwrap();

		assert_eq!(
			sql,
			r#"SELECT * FROM "users" WHERE ("age" <= '18' AND "name" LIKE '%wallace%')"#
		);
	}
}
