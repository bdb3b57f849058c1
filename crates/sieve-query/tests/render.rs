//! Rendering integration tests across the bundled backends

use rstest::rstest;
use sieve_query::prelude::*;
use sieve_query::{QueryError, Value};

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

fn filtered() -> SelectStatement {
	let mut stmt = users();
	stmt.where_group(&mut |q| {
		q.where_compare("age", CompareOp::LessThanOrEqual, Value::from("18"));
		q.where_like("name", Value::from("%wallace%"));
	});
	stmt
}

#[rstest]
#[case::postgres(
	Box::new(PostgresQueryBuilder::new()) as Box<dyn QueryBuilder>,
	r#"SELECT * FROM "users" WHERE ("age" <= $1 AND "name" LIKE $2)"#
)]
#[case::mysql(
	Box::new(MySqlQueryBuilder::new()) as Box<dyn QueryBuilder>,
	"SELECT * FROM `users` WHERE (`age` <= ? AND `name` LIKE ?)"
)]
#[case::sqlite(
	Box::new(SqliteQueryBuilder::new()) as Box<dyn QueryBuilder>,
	r#"SELECT * FROM "users" WHERE ("age" <= ? AND "name" LIKE ?)"#
)]
fn test_group_renders_per_backend(#[case] builder: Box<dyn QueryBuilder>, #[case] expected: &str) {
	let (sql, values) = filtered().build(builder.as_ref()).unwrap();

	assert_eq!(sql, expected);
	assert_eq!(values.0, vec![Value::from("18"), Value::from("%wallace%")]);
}

#[rstest]
fn test_to_string_inlines_values() {
	let sql = filtered().to_string(&PostgresQueryBuilder::new()).unwrap();

	assert_eq!(
		sql,
		r#"SELECT * FROM "users" WHERE ("age" <= '18' AND "name" LIKE '%wallace%')"#
	);
}

#[rstest]
fn test_null_checks_bind_nothing() {
	let mut stmt = users();
	stmt.where_group(&mut |q| {
		q.where_null("deleted_at");
		q.where_not_null("cpf");
	});

	let (sql, values) = stmt.build(&PostgresQueryBuilder::new()).unwrap();

	assert_eq!(
		sql,
		r#"SELECT * FROM "users" WHERE ("deleted_at" IS NULL AND "cpf" IS NOT NULL)"#
	);
	assert!(values.is_empty());
}

#[rstest]
fn test_qualified_column_is_quoted_per_segment() {
	let mut stmt = users();
	stmt.where_compare("users.id", CompareOp::Equal, Value::from(1));

	let (sql, _) = stmt.build(&PostgresQueryBuilder::new()).unwrap();

	assert_eq!(sql, r#"SELECT * FROM "users" WHERE "users"."id" = $1"#);
}

#[rstest]
fn test_plain_and_negated_subqueries_share_parameters() {
	let mut stmt = users();
	stmt.where_group(&mut |q| {
		q.where_compare("name", CompareOp::Equal, Value::from("Wallace"));
		q.where_has("phones", &mut |r| {
			r.where_compare("ddd", CompareOp::Equal, Value::from("31"));
		});
		q.where_doesnt_have("roles", &mut |r| {
			r.where_compare("name", CompareOp::Equal, Value::from("Admin"));
		});
	});

	let (sql, values) = stmt.build(&PostgresQueryBuilder::new()).unwrap();

	assert_eq!(
		sql,
		concat!(
			r#"SELECT * FROM "users" WHERE ("name" = $1"#,
			r#" AND EXISTS (SELECT 1 FROM "phones" WHERE "phones"."user_id" = "users"."id" AND "phones"."ddd" = $2)"#,
			r#" AND NOT EXISTS (SELECT 1 FROM "roles" INNER JOIN "role_user" ON "role_user"."role_id" = "roles"."id""#,
			r#" WHERE "role_user"."user_id" = "users"."id" AND "roles"."name" = $3))"#,
		)
	);
	assert_eq!(values.len(), 3);
}

#[rstest]
fn test_list_value_in_comparison_is_parenthesised() {
	let mut stmt = users();
	stmt.where_compare("age", CompareOp::Equal, Value::from(vec![1, 2]));

	let (sql, values) = stmt.build(&PostgresQueryBuilder::new()).unwrap();

	assert_eq!(sql, r#"SELECT * FROM "users" WHERE "age" = ($1, $2)"#);
	assert_eq!(values.len(), 2);
}

#[rstest]
fn test_null_value_is_never_bound() {
	let mut stmt = users();
	stmt.where_compare("age", CompareOp::Equal, Value::Null);

	let (sql, values) = stmt.build(&MySqlQueryBuilder::new()).unwrap();

	assert_eq!(sql, "SELECT * FROM `users` WHERE `age` = NULL");
	assert!(values.is_empty());
}

#[rstest]
fn test_unknown_nested_relation_segment() {
	let mut stmt = users();
	stmt.has("phones.carrier");

	let result = stmt.build(&PostgresQueryBuilder::new());

	assert!(matches!(result, Err(QueryError::UnknownRelation(path)) if path == "phones.carrier"));
}
