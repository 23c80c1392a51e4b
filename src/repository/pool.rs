//! Database connection management.
//!
//! SQLite is the local backend and goes through diesel-async's
//! SyncConnectionWrapper; connections are lightweight and created on demand.
//! PostgreSQL is a transfer target reached by the migration tooling, so the
//! pool only carries its URL.

use std::path::Path;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};

use super::util::to_diesel_error;

/// Diesel error type alias.
pub type DbError = diesel::result::Error;

/// Async SQLite connection type.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// SQLite connection pool (lightweight - creates connections on demand).
#[derive(Clone)]
pub struct SqlitePool {
    database_url: String,
}

impl SqlitePool {
    /// Create a new SQLite pool.
    pub fn new(database_url: &str) -> Self {
        // Strip sqlite: prefix if present
        let url = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        Self {
            database_url: url.to_string(),
        }
    }

    /// Create pool from a file path.
    pub fn from_path(path: &Path) -> Self {
        Self::new(&path.display().to_string())
    }

    /// Get a connection.
    ///
    /// SQLite leaves foreign-key enforcement off per connection; the
    /// outreach-requires-property constraint depends on it, so it is switched
    /// on here.
    pub async fn get(&self) -> Result<SqliteConn, DbError> {
        let mut conn = SqliteConn::establish(&self.database_url)
            .await
            .map_err(to_diesel_error)?;
        conn.batch_execute("PRAGMA foreign_keys = ON").await?;
        Ok(conn)
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Unified handle for whichever backend a database URL names.
#[derive(Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    /// PostgreSQL is reached through the migration tooling only; the handle
    /// carries the URL for it.
    #[cfg(feature = "postgres")]
    Postgres { database_url: String },
}

impl DbPool {
    /// Create a pool from a database URL.
    ///
    /// Detects the backend from the URL:
    /// - `postgres://` or `postgresql://` → PostgreSQL
    /// - Everything else → SQLite
    pub fn from_url(url: &str) -> Result<Self, DbError> {
        #[cfg(feature = "postgres")]
        if super::util::is_postgres_url(url) {
            return Ok(DbPool::Postgres {
                database_url: url.to_string(),
            });
        }
        #[cfg(not(feature = "postgres"))]
        if super::util::is_postgres_url(url) {
            return Err(to_diesel_error(
                "PostgreSQL support not compiled. Rebuild with --features postgres",
            ));
        }

        Ok(DbPool::Sqlite(SqlitePool::new(url)))
    }

    /// Create a SQLite pool from a file path.
    pub fn sqlite_from_path(path: &Path) -> Self {
        DbPool::Sqlite(SqlitePool::from_path(path))
    }

    /// Check if this is a SQLite backend.
    pub fn is_sqlite(&self) -> bool {
        matches!(self, DbPool::Sqlite(_))
    }

    /// Check if this is a PostgreSQL backend.
    #[cfg(feature = "postgres")]
    pub fn is_postgres(&self) -> bool {
        matches!(self, DbPool::Postgres { .. })
    }

    /// The underlying SQLite pool, if this is the SQLite backend.
    pub fn as_sqlite(&self) -> Option<&SqlitePool> {
        match self {
            DbPool::Sqlite(pool) => Some(pool),
            #[cfg(feature = "postgres")]
            DbPool::Postgres { .. } => None,
        }
    }

    /// The database URL for either backend.
    pub fn database_url(&self) -> &str {
        match self {
            DbPool::Sqlite(pool) => pool.database_url(),
            #[cfg(feature = "postgres")]
            DbPool::Postgres { database_url } => database_url,
        }
    }
}
