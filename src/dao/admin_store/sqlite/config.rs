use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::error::{SqliteDaoError, SqliteResult};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime configuration describing how to open the SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub options: SqliteConnectOptions,
    pub max_connections: u32,
    /// In-memory databases live as long as their single connection, so the
    /// pool must never recycle it.
    pub keep_alive: bool,
}

impl SqliteConfig {
    /// Parse a `sqlite://` URL, creating the database file when missing.
    pub fn from_url(url: &str) -> SqliteResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|source| SqliteDaoError::InvalidUrl {
                url: url.to_owned(),
                source,
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        Ok(Self {
            options,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            keep_alive: false,
        })
    }

    /// Private in-memory database backed by a single pinned connection.
    pub fn in_memory() -> SqliteResult<Self> {
        let mut config = Self::from_url("sqlite::memory:")?;
        config.max_connections = 1;
        config.keep_alive = true;
        Ok(config)
    }

    /// Build a configuration by reading `DATABASE_URL`.
    pub fn from_env() -> SqliteResult<Self> {
        let url = std::env::var("DATABASE_URL").map_err(|_| SqliteDaoError::MissingEnvVar {
            var: "DATABASE_URL",
        })?;
        Self::from_url(&url)
    }

    pub(super) fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new().max_connections(self.max_connections);
        if self.keep_alive {
            options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options
        }
    }
}
