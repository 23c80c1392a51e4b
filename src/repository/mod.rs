//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking.
//! SQLite is the local backend; PostgreSQL is reachable as a migration
//! target behind the `postgres` feature.

pub mod context;
pub mod migration;
#[cfg(feature = "postgres")]
pub mod migration_postgres;
pub mod migration_sqlite;
pub mod migrations;
pub mod models;
pub mod outreach;
pub mod pool;
pub mod property;
pub mod util;

pub use context::{DbContext, RegistryStats};
pub use migration::{
    DatabaseExporter, DatabaseImporter, PortableOutreach, PortableProperty, ProgressCallback,
};
#[cfg(feature = "postgres")]
pub use migration_postgres::PostgresMigrator;
pub use migration_sqlite::SqliteMigrator;
pub use outreach::OutreachRepository;
pub use pool::{DbError, DbPool, SqlitePool};
pub use property::PropertyRepository;

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Decode a tag column (JSON array of strings on SQLite).
pub fn tags_from_json(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

/// Encode a tag column for storage.
pub fn tags_to_json(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
pub mod test_support {
    //! Shared fixtures for repository tests.

    use tempfile::TempDir;

    use super::migrations::run_migrations;
    use super::pool::SqlitePool;

    /// Create a migrated registry database in a temporary directory.
    pub async fn setup_test_db() -> (SqlitePool, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("registry.db");
        let db_url = db_path.display().to_string();

        run_migrations(&db_url).await.unwrap();

        (SqlitePool::new(&db_url), dir)
    }
}
