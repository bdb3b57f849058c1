use thiserror::Error;

/// Errors raised while rendering a statement.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum QueryError {
	#[error("Unknown relation \"{0}\"")]
	UnknownRelation(String),
}

pub type QueryResult<T> = Result<T, QueryError>;
