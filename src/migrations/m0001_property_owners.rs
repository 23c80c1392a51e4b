use cetane::prelude::*;

pub fn migration() -> Migration {
    Migration::new("0001_property_owners")
        .operation(
            RunSql::portable()
                .for_backend(
                    "sqlite",
                    // Tag columns hold JSON arrays of strings on SQLite
                    r#"CREATE TABLE property_owners (
    plotcode TEXT PRIMARY KEY NOT NULL,
    district_names TEXT NOT NULL DEFAULT '[]',
    industrial_areas TEXT NOT NULL DEFAULT '[]',
    plot_number TEXT,
    area_acres REAL,
    allottee_name TEXT,
    allottee_phone TEXT,
    allottee_email TEXT,
    address TEXT,
    nature_of_industry TEXT,
    ulpin TEXT,
    plot_status TEXT,
    phone_valid INTEGER NOT NULL DEFAULT 0,
    email_valid INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
                )
                .for_backend(
                    "postgres",
                    r#"CREATE TABLE IF NOT EXISTS property_owners (
    plotcode TEXT PRIMARY KEY,
    district_names TEXT[] NOT NULL DEFAULT '{}',
    industrial_areas TEXT[] NOT NULL DEFAULT '{}',
    plot_number TEXT,
    area_acres DOUBLE PRECISION,
    allottee_name TEXT,
    allottee_phone TEXT,
    allottee_email TEXT,
    address TEXT,
    nature_of_industry TEXT,
    ulpin TEXT,
    plot_status TEXT,
    phone_valid BOOLEAN NOT NULL DEFAULT FALSE,
    email_valid BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
                ),
        )
        .operation(
            RunSql::portable()
                .for_backend(
                    "sqlite",
                    "CREATE INDEX idx_property_owners_phone_valid ON property_owners(phone_valid)",
                )
                .for_backend(
                    "postgres",
                    "CREATE INDEX IF NOT EXISTS idx_property_owners_phone_valid ON property_owners(phone_valid)",
                ),
        )
        .operation(
            // Inverted membership indexes exist on Postgres only; the SQLite
            // backend answers membership queries by scanning the JSON text.
            RunSql::portable().for_backend("sqlite", "").for_backend(
                "postgres",
                "CREATE INDEX IF NOT EXISTS idx_property_owners_district_names ON property_owners USING GIN (district_names)",
            ),
        )
        .operation(
            RunSql::portable().for_backend("sqlite", "").for_backend(
                "postgres",
                "CREATE INDEX IF NOT EXISTS idx_property_owners_industrial_areas ON property_owners USING GIN (industrial_areas)",
            ),
        )
}
