//! SQLite-backed implementation of [`AdminStore`](super::AdminStore).

mod config;
mod error;
mod models;
mod store;

pub use config::SqliteConfig;
pub use error::{SqliteDaoError, SqliteResult};
pub use store::SqliteAdminStore;

use crate::dao::storage::StorageError;

impl From<SqliteDaoError> for StorageError {
    fn from(error: SqliteDaoError) -> Self {
        match error {
            SqliteDaoError::Conflict { message } => StorageError::conflict(message),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
