//! Error types shared by the SQLite storage implementation.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Convenient result alias returning [`SqliteDaoError`] failures.
pub type SqliteResult<T> = Result<T, SqliteDaoError>;

/// Failures that can occur while interacting with SQLite.
#[derive(Debug, Error)]
pub enum SqliteDaoError {
    /// Required environment variable is missing.
    #[error("missing SQLite environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The connection URL could not be parsed.
    #[error("invalid SQLite connection URL `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: SqlxError,
    },
    /// Opening the connection pool failed.
    #[error("failed to open SQLite pool")]
    Connect {
        #[source]
        source: SqlxError,
    },
    /// Creating the tables failed.
    #[error("failed to apply SQLite schema")]
    Schema {
        #[source]
        source: SqlxError,
    },
    /// Health probe did not get an answer.
    #[error("SQLite health check failed")]
    HealthPing {
        #[source]
        source: SqlxError,
    },
    /// A statement failed while running the named operation.
    #[error("SQLite operation `{operation}` failed")]
    Query {
        operation: &'static str,
        #[source]
        source: SqlxError,
    },
    /// A row written inside the current transaction could not be read back.
    #[error("row `{id}` missing from `{table}` after write")]
    MissingRow { table: &'static str, id: String },
    /// A unique constraint rejected the write.
    #[error("{message}")]
    Conflict { message: String },
}

/// Wrap a sqlx failure for `operation`, classifying unique violations as conflicts.
pub(super) fn query_error(operation: &'static str) -> impl FnOnce(SqlxError) -> SqliteDaoError {
    move |source| match &source {
        SqlxError::Database(db) if db.is_unique_violation() => SqliteDaoError::Conflict {
            message: format!("{operation}: {}", db.message()),
        },
        _ => SqliteDaoError::Query { operation, source },
    }
}
