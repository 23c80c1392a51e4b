//! Migration Parity Tests
//!
//! Verifies that the cetane migrations produce the same schema as the SQL
//! migration files, and that the schema's constraints behave as declared:
//! plotcode uniqueness, the outreach foreign key, and child-before-parent
//! drop ordering.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{Connection, Result as SqliteResult};

const SQLITE_UP: &str =
    include_str!("../migrations/sqlite/2025-06-10-000000_initial_schema/up.sql");
const SQLITE_DOWN: &str =
    include_str!("../migrations/sqlite/2025-06-10-000000_initial_schema/down.sql");

/// Represents a SQLite table schema
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableSchema {
    name: String,
    columns: BTreeMap<String, ColumnInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnInfo {
    name: String,
    col_type: String,
    not_null: bool,
    primary_key: bool,
}

/// Represents a SQLite index
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexInfo {
    name: String,
    table: String,
    columns: Vec<String>,
    unique: bool,
}

/// Extract table schemas from a SQLite connection
fn extract_tables(conn: &Connection) -> SqliteResult<BTreeMap<String, TableSchema>> {
    let mut tables = BTreeMap::new();

    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;

    let table_names: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<SqliteResult<Vec<_>>>()?;

    for table_name in table_names {
        let mut columns = BTreeMap::new();

        let mut pragma = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table_name))?;
        let column_iter = pragma.query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                col_type: row.get::<_, String>(2)?.to_uppercase(),
                not_null: row.get(3)?,
                primary_key: row.get::<_, i32>(5)? > 0,
            })
        })?;

        for col in column_iter {
            let col = col?;
            columns.insert(col.name.clone(), col);
        }

        tables.insert(
            table_name.clone(),
            TableSchema {
                name: table_name,
                columns,
            },
        );
    }

    Ok(tables)
}

/// Extract indexes from a SQLite connection
fn extract_indexes(conn: &Connection) -> SqliteResult<BTreeMap<String, IndexInfo>> {
    let mut indexes = BTreeMap::new();

    let mut stmt = conn.prepare(
        "SELECT name, tbl_name, sql FROM sqlite_master WHERE type='index' AND sql IS NOT NULL ORDER BY name",
    )?;

    let index_iter = stmt.query_map([], |row| {
        let name: String = row.get(0)?;
        let table: String = row.get(1)?;
        let sql: String = row.get(2)?;
        Ok((name, table, sql.to_uppercase().contains("UNIQUE")))
    })?;

    for result in index_iter {
        let (name, table, unique) = result?;

        let mut pragma = conn.prepare(&format!("PRAGMA index_info(\"{}\")", name))?;
        let columns: Vec<String> = pragma
            .query_map([], |row| {
                row.get::<_, Option<String>>(2)
                    .map(|opt| opt.unwrap_or_else(|| "<expr>".to_string()))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        indexes.insert(
            name.clone(),
            IndexInfo {
                name,
                table,
                columns,
                unique,
            },
        );
    }

    Ok(indexes)
}

/// Run the SQL migration files
fn run_sql_migrations(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(SQLITE_UP)
}

/// Run cetane migrations (generates SQL for the SQLite backend)
fn run_cetane_migrations(conn: &Connection) -> SqliteResult<()> {
    use cetane::backend::Sqlite;

    let registry = plotledger::migrations::registry();
    let backend = Sqlite;

    let ordered_names = registry
        .resolve_order()
        .expect("Failed to resolve migration order");

    for name in ordered_names {
        let migration = registry
            .get(name)
            .expect("Migration not found after resolve");
        let statements = migration.forward_sql(&backend);
        for stmt in statements {
            if stmt.trim().is_empty() {
                continue;
            }
            conn.execute_batch(&stmt)?;
        }
    }

    Ok(())
}

/// Normalize type names for comparison (SQLite is flexible with types)
fn normalize_type(t: &str) -> String {
    let t = t.to_uppercase();
    if t.contains("INT") {
        return "INTEGER".to_string();
    }
    if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
        return "TEXT".to_string();
    }
    if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") {
        return "REAL".to_string();
    }
    t
}

/// Compare two schemas and return differences
fn compare_schemas(
    original: &BTreeMap<String, TableSchema>,
    cetane: &BTreeMap<String, TableSchema>,
) -> Vec<String> {
    let mut diffs = Vec::new();

    for name in original.keys() {
        if !cetane.contains_key(name) {
            diffs.push(format!("Missing table in cetane: {}", name));
        }
    }
    for name in cetane.keys() {
        if !original.contains_key(name) {
            diffs.push(format!("Extra table in cetane: {}", name));
        }
    }

    for (name, orig_table) in original {
        if let Some(cetane_table) = cetane.get(name) {
            for (col_name, orig_col) in &orig_table.columns {
                if let Some(cetane_col) = cetane_table.columns.get(col_name) {
                    let orig_type = normalize_type(&orig_col.col_type);
                    let cetane_type = normalize_type(&cetane_col.col_type);
                    if orig_type != cetane_type {
                        diffs.push(format!(
                            "Type mismatch in {}.{}: sql={}, cetane={}",
                            name, col_name, orig_col.col_type, cetane_col.col_type
                        ));
                    }

                    if orig_col.not_null != cetane_col.not_null {
                        diffs.push(format!(
                            "NOT NULL mismatch in {}.{}: sql={}, cetane={}",
                            name, col_name, orig_col.not_null, cetane_col.not_null
                        ));
                    }

                    if orig_col.primary_key != cetane_col.primary_key {
                        diffs.push(format!(
                            "PRIMARY KEY mismatch in {}.{}: sql={}, cetane={}",
                            name, col_name, orig_col.primary_key, cetane_col.primary_key
                        ));
                    }
                } else {
                    diffs.push(format!("Missing column in cetane: {}.{}", name, col_name));
                }
            }

            for col_name in cetane_table.columns.keys() {
                if !orig_table.columns.contains_key(col_name) {
                    diffs.push(format!("Extra column in cetane: {}.{}", name, col_name));
                }
            }
        }
    }

    diffs
}

/// Compare indexes between the SQL and cetane schemas
fn compare_indexes(
    original: &BTreeMap<String, IndexInfo>,
    cetane: &BTreeMap<String, IndexInfo>,
) -> Vec<String> {
    let mut diffs = Vec::new();

    // Index names may differ but the actual index should be equivalent
    let orig_semantic: BTreeSet<_> = original
        .values()
        .map(|idx| (&idx.table, &idx.columns, idx.unique))
        .collect();

    let cetane_semantic: BTreeSet<_> = cetane
        .values()
        .map(|idx| (&idx.table, &idx.columns, idx.unique))
        .collect();

    for (table, cols, unique) in &orig_semantic {
        if !cetane_semantic.contains(&(*table, *cols, *unique)) {
            diffs.push(format!(
                "Missing index in cetane: table={}, columns={:?}, unique={}",
                table, cols, unique
            ));
        }
    }

    for (table, cols, unique) in &cetane_semantic {
        if !orig_semantic.contains(&(*table, *cols, *unique)) {
            diffs.push(format!(
                "Extra index in cetane: table={}, columns={:?}, unique={}",
                table, cols, unique
            ));
        }
    }

    diffs
}

#[test]
fn test_schema_parity() {
    let sql_conn = Connection::open_in_memory().expect("Failed to open SQL DB");
    let cetane_conn = Connection::open_in_memory().expect("Failed to open cetane DB");

    run_sql_migrations(&sql_conn).expect("Failed to run SQL migrations");
    run_cetane_migrations(&cetane_conn).expect("Failed to run cetane migrations");

    let sql_tables = extract_tables(&sql_conn).expect("Failed to extract SQL tables");
    let cetane_tables = extract_tables(&cetane_conn).expect("Failed to extract cetane tables");

    let table_diffs = compare_schemas(&sql_tables, &cetane_tables);
    for diff in &table_diffs {
        eprintln!("  - {}", diff);
    }

    let sql_indexes = extract_indexes(&sql_conn).expect("Failed to extract SQL indexes");
    let cetane_indexes = extract_indexes(&cetane_conn).expect("Failed to extract cetane indexes");

    let index_diffs = compare_indexes(&sql_indexes, &cetane_indexes);
    for diff in &index_diffs {
        eprintln!("  - {}", diff);
    }

    let total_diffs = table_diffs.len() + index_diffs.len();
    assert_eq!(
        total_diffs, 0,
        "Schema parity test failed with {} differences",
        total_diffs
    );

    // Both registry tables plus the phone-validity index must exist.
    assert!(sql_tables.contains_key("property_owners"));
    assert!(sql_tables.contains_key("outreach_records"));
    assert!(sql_indexes
        .values()
        .any(|idx| idx.table == "property_owners" && idx.columns == vec!["phone_valid"]));
}

#[test]
fn test_plotcode_keys_both_tables() {
    let conn = Connection::open_in_memory().expect("Failed to open DB");
    run_sql_migrations(&conn).expect("Failed to run SQL migrations");

    let tables = extract_tables(&conn).expect("Failed to extract tables");
    for table in ["property_owners", "outreach_records"] {
        let schema = tables.get(table).expect(table);
        let plotcode = schema.columns.get("plotcode").expect("plotcode column");
        assert!(plotcode.primary_key, "{table}.plotcode must be the key");
        assert!(plotcode.not_null, "{table}.plotcode must be non-null");
    }
}

#[test]
fn test_foreign_key_and_one_to_one() {
    let conn = Connection::open_in_memory().expect("Failed to open DB");
    conn.execute_batch("PRAGMA foreign_keys = ON")
        .expect("pragma");
    run_sql_migrations(&conn).expect("Failed to run SQL migrations");

    // Outreach data cannot exist without a corresponding property.
    let orphan = conn.execute(
        "INSERT INTO outreach_records (plotcode, created_at) VALUES ('MISSING', '2025-06-10T00:00:00Z')",
        [],
    );
    assert!(orphan.is_err(), "orphan outreach row must be rejected");

    conn.execute(
        "INSERT INTO property_owners (plotcode, created_at, updated_at)
         VALUES ('P-1', '2025-06-10T00:00:00Z', '2025-06-10T00:00:00Z')",
        [],
    )
    .expect("insert property");

    // Duplicate plotcode violates the parent key.
    let dup = conn.execute(
        "INSERT INTO property_owners (plotcode, created_at, updated_at)
         VALUES ('P-1', '2025-06-10T00:00:00Z', '2025-06-10T00:00:00Z')",
        [],
    );
    assert!(dup.is_err(), "duplicate plotcode must be rejected");

    conn.execute(
        "INSERT INTO outreach_records (plotcode, created_at) VALUES ('P-1', '2025-06-10T00:00:00Z')",
        [],
    )
    .expect("insert outreach");

    // At most one outreach row per property.
    let second = conn.execute(
        "INSERT INTO outreach_records (plotcode, created_at) VALUES ('P-1', '2025-06-10T00:00:00Z')",
        [],
    );
    assert!(second.is_err(), "second outreach row must be rejected");
}

#[test]
fn test_down_migration_drops_child_first() {
    let conn = Connection::open_in_memory().expect("Failed to open DB");
    conn.execute_batch("PRAGMA foreign_keys = ON")
        .expect("pragma");
    run_sql_migrations(&conn).expect("Failed to run SQL migrations");

    conn.execute(
        "INSERT INTO property_owners (plotcode, created_at, updated_at)
         VALUES ('P-1', '2025-06-10T00:00:00Z', '2025-06-10T00:00:00Z')",
        [],
    )
    .expect("insert property");
    conn.execute(
        "INSERT INTO outreach_records (plotcode, created_at) VALUES ('P-1', '2025-06-10T00:00:00Z')",
        [],
    )
    .expect("insert outreach");

    // Dropping the parent while a child row references it fails.
    assert!(conn.execute_batch("DROP TABLE property_owners").is_err());

    // The down migration's ordering works.
    conn.execute_batch(SQLITE_DOWN).expect("down migration");
    let tables = extract_tables(&conn).expect("extract");
    assert!(tables.is_empty());
}

#[test]
fn test_individual_migrations_generate_valid_sql() {
    use cetane::backend::Sqlite;

    let registry = plotledger::migrations::registry();
    let backend = Sqlite;

    let ordered_names = registry
        .resolve_order()
        .expect("Failed to resolve migration order");

    for (i, name) in ordered_names.iter().enumerate() {
        let conn = Connection::open_in_memory().expect("Failed to open DB");

        for prior_name in &ordered_names[..=i] {
            let migration = registry.get(prior_name).expect("Migration not found");
            let statements = migration.forward_sql(&backend);
            for stmt in &statements {
                if stmt.trim().is_empty() {
                    continue;
                }
                conn.execute_batch(stmt).unwrap_or_else(|e| {
                    panic!("Migration {} failed: {}\nSQL: {}", migration.name, e, stmt)
                });
            }
        }

        let migration = registry.get(name).expect("Migration not found");
        println!(
            "Migration {} generates valid SQL ({} statements)",
            migration.name,
            migration.forward_sql(&backend).len()
        );
    }
}

#[test]
fn test_postgres_sql_generation() {
    use cetane::backend::Postgres;

    let registry = plotledger::migrations::registry();
    let backend = Postgres;

    let ordered_names = registry
        .resolve_order()
        .expect("Failed to resolve migration order");

    let mut all_sql = String::new();
    for name in ordered_names {
        let migration = registry.get(name).expect("Migration not found");
        for stmt in migration.forward_sql(&backend) {
            // Should use SERIAL/identity forms, never SQLite AUTOINCREMENT
            assert!(
                !stmt.contains("AUTOINCREMENT"),
                "Migration {} uses AUTOINCREMENT in Postgres SQL",
                migration.name
            );
            all_sql.push_str(&stmt);
            all_sql.push('\n');
        }
    }

    // The tag columns are native arrays with inverted membership indexes.
    assert!(all_sql.contains("TEXT[]"), "tag columns must be TEXT[]");
    assert_eq!(
        all_sql.matches("USING GIN").count(),
        2,
        "both tag columns need a GIN index"
    );
    assert!(all_sql.contains("idx_property_owners_phone_valid"));
    assert!(all_sql.contains("REFERENCES property_owners(plotcode)"));
}

#[test]
fn test_postgres_sql_files_match_cetane_indexes() {
    // The include_str-embedded Postgres migration must declare the same
    // indexes the cetane registry generates.
    let pg_up = include_str!("../migrations/postgres/2025-06-10-000000_initial_schema/up.sql");

    for needle in [
        "idx_property_owners_phone_valid",
        "idx_property_owners_district_names",
        "idx_property_owners_industrial_areas",
    ] {
        assert!(pg_up.contains(needle), "missing index in postgres up.sql: {needle}");
    }
    assert_eq!(pg_up.matches("USING GIN").count(), 2);

    let pg_down = include_str!("../migrations/postgres/2025-06-10-000000_initial_schema/down.sql");
    let outreach_pos = pg_down.find("outreach_records").expect("drops outreach");
    let property_pos = pg_down.find("property_owners").expect("drops property");
    assert!(
        outreach_pos < property_pos,
        "down migration must drop the child table first"
    );
}
