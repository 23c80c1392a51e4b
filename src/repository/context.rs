//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for database operations. It holds
//! the pool and hands out repositories. Repositories are backed by the SQLite
//! diesel schema; a PostgreSQL context still supports `migrate()` and is
//! otherwise driven through the migration tooling.

use std::path::Path;

use super::outreach::OutreachRepository;
use super::pool::{DbError, DbPool, SqlitePool};
use super::property::PropertyRepository;
use super::util::to_diesel_error;

/// Aggregate record counts for the status display.
#[derive(Debug, Clone, Copy)]
pub struct RegistryStats {
    pub properties: i64,
    pub outreach: i64,
    pub phone_valid: i64,
}

/// Database context that manages the connection pool and provides repository
/// access.
#[derive(Clone)]
pub struct DbContext {
    pool: DbPool,
}

impl DbContext {
    /// Create a context from a database file path (SQLite only).
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: DbPool::sqlite_from_path(db_path),
        }
    }

    /// Create a context from a database URL.
    ///
    /// Supports:
    /// - SQLite: file paths or `sqlite:` URLs
    /// - PostgreSQL: `postgres://` or `postgresql://` URLs (postgres feature)
    pub fn from_url(url: &str) -> Result<Self, DbError> {
        Ok(Self {
            pool: DbPool::from_url(url)?,
        })
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Check if using the SQLite backend.
    pub fn is_sqlite(&self) -> bool {
        self.pool.is_sqlite()
    }

    /// The database URL.
    pub fn database_url(&self) -> &str {
        self.pool.database_url()
    }

    fn sqlite_pool(&self) -> Result<SqlitePool, DbError> {
        self.pool
            .as_sqlite()
            .cloned()
            .ok_or_else(|| to_diesel_error("this operation requires the SQLite backend"))
    }

    /// Get a property repository.
    pub fn properties(&self) -> Result<PropertyRepository, DbError> {
        Ok(PropertyRepository::new(self.sqlite_pool()?))
    }

    /// Get an outreach repository.
    pub fn outreach(&self) -> Result<OutreachRepository, DbError> {
        Ok(OutreachRepository::new(self.sqlite_pool()?))
    }

    /// Run pending migrations for this database.
    pub async fn migrate(&self) -> Result<(), DbError> {
        super::migrations::run_migrations(self.pool.database_url()).await
    }

    /// Whether the registry tables exist yet (SQLite backend).
    pub async fn schema_ready(&self) -> Result<bool, DbError> {
        let repo = self.properties()?;
        Ok(repo.count().await.is_ok())
    }

    /// Record counts across both tables (SQLite backend).
    pub async fn stats(&self) -> Result<RegistryStats, DbError> {
        let properties = self.properties()?;
        let outreach = self.outreach()?;

        Ok(RegistryStats {
            properties: properties.count().await?,
            outreach: outreach.count().await?,
            phone_valid: properties.count_phone_valid().await?,
        })
    }
}
