//! Migration runner.
//!
//! Embeds migrations at compile time. SQLite runs through the
//! diesel_migrations harness in a blocking task; PostgreSQL statements are
//! applied with tokio-postgres and tracked in `__diesel_schema_migrations`.

use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

use super::pool::DbError;
use super::util::to_diesel_error;

/// SQLite migrations (diesel_migrations harness).
pub const SQLITE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/sqlite");

/// Run pending migrations for a database URL.
pub async fn run_migrations(database_url: &str) -> Result<(), DbError> {
    if super::util::is_postgres_url(database_url) {
        #[cfg(feature = "postgres")]
        {
            run_postgres_migrations(database_url).await
        }
        #[cfg(not(feature = "postgres"))]
        {
            Err(to_diesel_error(
                "PostgreSQL support not compiled. Rebuild with --features postgres",
            ))
        }
    } else {
        run_sqlite_migrations(database_url).await
    }
}

/// Run SQLite migrations in a blocking task.
async fn run_sqlite_migrations(database_url: &str) -> Result<(), DbError> {
    // Strip sqlite: prefix if present - diesel expects just the file path
    let url = database_url
        .strip_prefix("sqlite:")
        .unwrap_or(database_url)
        .to_string();

    tokio::task::spawn_blocking(move || {
        let mut conn = diesel::SqliteConnection::establish(&url).map_err(to_diesel_error)?;

        let migrations = conn
            .run_pending_migrations(SQLITE_MIGRATIONS)
            .map_err(DbError::QueryBuilderError)?;

        for migration in &migrations {
            info!("Applied migration: {}", migration);
        }

        if migrations.is_empty() {
            info!("No pending migrations");
        }

        Ok(())
    })
    .await
    .map_err(|e| DbError::QueryBuilderError(Box::new(e)))?
}

/// PostgreSQL migration definitions (embedded at compile time).
#[cfg(feature = "postgres")]
static POSTGRES_MIGRATION_FILES: &[(&str, &str)] = &[(
    "2025-06-10-000000",
    include_str!("../../migrations/postgres/2025-06-10-000000_initial_schema/up.sql"),
)];

/// Run PostgreSQL migrations via tokio-postgres.
#[cfg(feature = "postgres")]
async fn run_postgres_migrations(database_url: &str) -> Result<(), DbError> {
    use tokio_postgres::NoTls;

    let (client, connection) = tokio_postgres::connect(database_url, NoTls)
        .await
        .map_err(to_diesel_error)?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    client
        .execute(
            "CREATE TABLE IF NOT EXISTS __diesel_schema_migrations (
                version VARCHAR(50) PRIMARY KEY NOT NULL,
                run_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            &[],
        )
        .await
        .map_err(|e| DbError::QueryBuilderError(Box::new(e)))?;

    let rows = client
        .query("SELECT version FROM __diesel_schema_migrations", &[])
        .await
        .map_err(|e| DbError::QueryBuilderError(Box::new(e)))?;

    let applied: std::collections::HashSet<String> =
        rows.iter().map(|row| row.get::<_, String>(0)).collect();

    let mut ran_count = 0;
    for (version, sql) in POSTGRES_MIGRATION_FILES {
        if applied.contains(*version) {
            continue;
        }

        info!("Applying migration: {}", version);

        for stmt in split_sql_statements(sql) {
            let stmt = stmt.trim();
            let is_comment_only = stmt.lines().all(|line| {
                let line = line.trim();
                line.is_empty() || line.starts_with("--")
            });
            if !stmt.is_empty() && !is_comment_only {
                client.execute(stmt, &[]).await.map_err(|e| {
                    tracing::error!("Migration {} failed on:\n{}\nError: {}", version, stmt, e);
                    DbError::QueryBuilderError(Box::new(e))
                })?;
            }
        }

        client
            .execute(
                "INSERT INTO __diesel_schema_migrations (version) VALUES ($1)",
                &[version],
            )
            .await
            .map_err(|e| DbError::QueryBuilderError(Box::new(e)))?;

        ran_count += 1;
    }

    if ran_count == 0 {
        info!("No pending migrations");
    } else {
        info!("Applied {} migration(s)", ran_count);
    }

    Ok(())
}

/// Split SQL statements, handling $$ delimited function bodies.
#[cfg(feature = "postgres")]
fn split_sql_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut current_start = 0;
    let mut in_dollar_quote = false;

    let bytes = sql.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if i + 1 < bytes.len() && bytes[i] == b'$' && bytes[i + 1] == b'$' {
            in_dollar_quote = !in_dollar_quote;
            i += 2;
            continue;
        }

        if bytes[i] == b';' && !in_dollar_quote {
            let stmt = &sql[current_start..i];
            if !stmt.trim().is_empty() {
                statements.push(stmt);
            }
            current_start = i + 1;
        }

        i += 1;
    }

    if current_start < sql.len() {
        let stmt = &sql[current_start..];
        if !stmt.trim().is_empty() {
            statements.push(stmt);
        }
    }

    statements
}
