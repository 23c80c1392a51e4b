use cetane::prelude::*;

pub fn migration() -> Migration {
    Migration::new("0002_outreach_records")
        .depends_on(&["0001_property_owners"])
        .operation(
            RunSql::portable()
                .for_backend(
                    "sqlite",
                    r#"CREATE TABLE outreach_records (
    plotcode TEXT PRIMARY KEY NOT NULL REFERENCES property_owners(plotcode),
    tenant_interested INTEGER,
    power_water_availability TEXT,
    zone TEXT,
    price_per_sqft REAL,
    contact_number TEXT,
    tenants TEXT,
    lease_duration TEXT,
    last_contacted TEXT,
    created_at TEXT NOT NULL
)"#,
                )
                .for_backend(
                    "postgres",
                    r#"CREATE TABLE IF NOT EXISTS outreach_records (
    plotcode TEXT PRIMARY KEY REFERENCES property_owners(plotcode),
    tenant_interested BOOLEAN,
    power_water_availability TEXT,
    zone TEXT,
    price_per_sqft DOUBLE PRECISION,
    contact_number TEXT,
    tenants TEXT,
    lease_duration TEXT,
    last_contacted TEXT,
    created_at TEXT NOT NULL
)"#,
                ),
        )
}
