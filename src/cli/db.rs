//! Database management commands.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::models::Property;
use crate::repository::util::{is_postgres_url, redact_url_password, validate_database_url};
use crate::repository::{
    migrations, DatabaseExporter, DatabaseImporter, PortableOutreach, PortableProperty,
    ProgressCallback, SqliteMigrator, SqlitePool,
};

/// One line of a registry dump file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "table", content = "record")]
enum DumpRow {
    #[serde(rename = "property_owners")]
    Property(PortableProperty),
    #[serde(rename = "outreach_records")]
    Outreach(PortableOutreach),
}

/// Run database migrations.
pub async fn cmd_migrate(settings: &Settings, check: bool, force: bool) -> anyhow::Result<()> {
    println!("{} Database migration", style("→").cyan());
    println!(
        "  Database: {}",
        redact_url_password(&settings.database_url())
    );

    let ctx = settings.create_db_context()?;

    let schema_exists = if ctx.is_sqlite() {
        ctx.schema_ready().await.unwrap_or(false)
    } else {
        // Postgres migrations are tracked server-side and idempotent.
        false
    };

    if check {
        if schema_exists {
            println!("\n{} Schema is initialized.", style("✓").green());
        } else {
            println!(
                "\n{} Database not initialized. Run 'plots db migrate' to initialize.",
                style("!").yellow()
            );
        }
        return Ok(());
    }

    if schema_exists && !force {
        println!(
            "\n{} Schema is already initialized. Use --force to re-run.",
            style("✓").green()
        );
        return Ok(());
    }

    println!("\n{} Running migrations...", style("→").cyan());
    match ctx.migrate().await {
        Ok(()) => {
            println!("{} Migration complete!", style("✓").green());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Migration failed: {}", style("✗").red(), e);
            Err(anyhow::anyhow!("Migration failed: {}", e))
        }
    }
}

/// Export the registry to a JSONL dump file.
pub async fn cmd_export(settings: &Settings, output: &Path) -> anyhow::Result<()> {
    let url = settings.database_url();
    let exporter = exporter_for(&url)?;

    println!("{} Exporting registry", style("→").cyan());
    println!("  Source: {}", redact_url_password(&url));

    let properties = exporter
        .export_properties()
        .await
        .map_err(|e| anyhow::anyhow!("export failed: {}", e))?;
    let outreach = exporter
        .export_outreach()
        .await
        .map_err(|e| anyhow::anyhow!("export failed: {}", e))?;

    let mut writer = BufWriter::new(File::create(output)?);
    for p in properties.iter().cloned() {
        serde_json::to_writer(&mut writer, &DumpRow::Property(p))?;
        writer.write_all(b"\n")?;
    }
    for o in outreach.iter().cloned() {
        serde_json::to_writer(&mut writer, &DumpRow::Outreach(o))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    println!(
        "{} Wrote {} properties and {} outreach records to {}",
        style("✓").green(),
        properties.len(),
        outreach.len(),
        output.display()
    );
    Ok(())
}

/// Import a JSONL dump into the registry.
pub async fn cmd_import(
    settings: &Settings,
    input: &Path,
    merge: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let (properties, outreach) = read_dump(input)?;

    println!("{} Importing registry dump", style("→").cyan());
    println!("  Source: {}", input.display());
    println!(
        "  {} properties, {} outreach records",
        properties.len(),
        outreach.len()
    );

    if dry_run {
        println!("{} Dry run - nothing written.", style("!").yellow());
        return Ok(());
    }

    let url = settings.database_url();
    let ctx = settings.create_db_context()?;

    if merge {
        // Merge semantics need the repositories, which ride the SQLite backend.
        let repo = ctx
            .properties()
            .map_err(|_| anyhow::anyhow!("--merge requires a SQLite database"))?;

        let pb = progress_bar(properties.len(), "merging properties");
        for (i, portable) in properties.iter().enumerate() {
            let incoming = Property::from(portable.clone());
            let record = match repo
                .get(&incoming.plotcode)
                .await
                .map_err(|e| anyhow::anyhow!("lookup failed: {}", e))?
            {
                Some(mut existing) => {
                    existing.merge(&incoming);
                    existing
                }
                None => incoming,
            };
            repo.save(&record)
                .await
                .map_err(|e| anyhow::anyhow!("save failed: {}", e))?;
            pb.set_position(i as u64 + 1);
        }
        pb.finish();
    } else {
        let importer = importer_for(&url)?;
        let pb = progress_bar(properties.len(), "importing properties");
        let cb: ProgressCallback = {
            let pb = pb.clone();
            Arc::new(move |n| pb.set_position(n as u64))
        };
        importer
            .import_properties(&properties, Some(cb))
            .await
            .map_err(|e| anyhow::anyhow!("import failed: {}", e))?;
        pb.finish();
    }

    let importer = importer_for(&url)?;

    // Every property gets its one-to-one outreach row up front.
    let plotcodes: Vec<String> = properties.iter().map(|p| p.plotcode.clone()).collect();
    let seeded = importer
        .seed_outreach(&plotcodes)
        .await
        .map_err(|e| anyhow::anyhow!("seeding outreach failed: {}", e))?;

    let pb = progress_bar(outreach.len(), "importing outreach");
    let cb: ProgressCallback = {
        let pb = pb.clone();
        Arc::new(move |n| pb.set_position(n as u64))
    };
    let imported = importer
        .import_outreach(&outreach, Some(cb))
        .await
        .map_err(|e| anyhow::anyhow!("import failed: {}", e))?;
    pb.finish();

    println!(
        "{} Imported {} properties ({} outreach rows seeded, {} updated)",
        style("✓").green(),
        properties.len(),
        seeded,
        imported
    );
    Ok(())
}

/// Copy the registry into another database.
pub async fn cmd_copy(
    settings: &Settings,
    to: &str,
    clear: bool,
    batch_size: usize,
    use_copy: bool,
) -> anyhow::Result<()> {
    validate_database_url(to).map_err(|e| anyhow::anyhow!(e))?;

    let source_url = settings.database_url();
    println!("{} Copying registry", style("→").cyan());
    println!("  Source: {}", redact_url_password(&source_url));
    println!("  Target: {}", redact_url_password(to));

    let exporter = exporter_for(&source_url)?;

    // Target schema first.
    migrations::run_migrations(to)
        .await
        .map_err(|e| anyhow::anyhow!("target migration failed: {}", e))?;

    let importer = importer_for(to)?;
    if clear {
        println!("  Clearing target tables...");
        importer
            .clear_all()
            .await
            .map_err(|e| anyhow::anyhow!("clear failed: {}", e))?;
    }

    let properties = exporter
        .export_properties()
        .await
        .map_err(|e| anyhow::anyhow!("export failed: {}", e))?;
    let outreach = exporter
        .export_outreach()
        .await
        .map_err(|e| anyhow::anyhow!("export failed: {}", e))?;

    let pb = progress_bar(properties.len(), "copying properties");
    let cb: ProgressCallback = {
        let pb = pb.clone();
        Arc::new(move |n| pb.set_position(n as u64))
    };

    if use_copy && is_postgres_url(to) {
        copy_via_copy_protocol(to, &properties, batch_size, cb).await?;
    } else {
        importer
            .import_properties(&properties, Some(cb))
            .await
            .map_err(|e| anyhow::anyhow!("import failed: {}", e))?;
    }
    pb.finish();

    let pb = progress_bar(outreach.len(), "copying outreach");
    let cb: ProgressCallback = {
        let pb = pb.clone();
        Arc::new(move |n| pb.set_position(n as u64))
    };
    importer
        .import_outreach(&outreach, Some(cb))
        .await
        .map_err(|e| anyhow::anyhow!("import failed: {}", e))?;
    pb.finish();

    println!(
        "{} Copied {} properties and {} outreach records",
        style("✓").green(),
        properties.len(),
        outreach.len()
    );
    Ok(())
}

#[cfg(feature = "postgres")]
async fn copy_via_copy_protocol(
    url: &str,
    properties: &[PortableProperty],
    batch_size: usize,
    progress: ProgressCallback,
) -> anyhow::Result<()> {
    let mut migrator = crate::repository::PostgresMigrator::new(url);
    migrator.set_batch_size(batch_size);
    migrator
        .copy_properties(properties, Some(progress))
        .await
        .map_err(|e| anyhow::anyhow!("COPY failed: {}", e))?;
    Ok(())
}

#[cfg(not(feature = "postgres"))]
async fn copy_via_copy_protocol(
    _url: &str,
    _properties: &[PortableProperty],
    _batch_size: usize,
    _progress: ProgressCallback,
) -> anyhow::Result<()> {
    anyhow::bail!("PostgreSQL support not compiled. Rebuild with --features postgres")
}

fn read_dump(input: &Path) -> anyhow::Result<(Vec<PortableProperty>, Vec<PortableOutreach>)> {
    let reader = BufReader::new(File::open(input)?);
    let mut properties = Vec::new();
    let mut outreach = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: DumpRow = serde_json::from_str(&line)
            .map_err(|e| anyhow::anyhow!("bad dump line {}: {}", lineno + 1, e))?;
        match row {
            DumpRow::Property(p) => properties.push(p),
            DumpRow::Outreach(o) => outreach.push(o),
        }
    }

    Ok((properties, outreach))
}

fn exporter_for(url: &str) -> anyhow::Result<Box<dyn DatabaseExporter>> {
    if is_postgres_url(url) {
        #[cfg(feature = "postgres")]
        {
            return Ok(Box::new(crate::repository::PostgresMigrator::new(url)));
        }
        #[cfg(not(feature = "postgres"))]
        anyhow::bail!("PostgreSQL support not compiled. Rebuild with --features postgres");
    }
    Ok(Box::new(SqliteMigrator::new(SqlitePool::new(url))))
}

fn importer_for(url: &str) -> anyhow::Result<Box<dyn DatabaseImporter>> {
    if is_postgres_url(url) {
        #[cfg(feature = "postgres")]
        {
            return Ok(Box::new(crate::repository::PostgresMigrator::new(url)));
        }
        #[cfg(not(feature = "postgres"))]
        anyhow::bail!("PostgreSQL support not compiled. Rebuild with --features postgres");
    }
    Ok(Box::new(SqliteMigrator::new(SqlitePool::new(url))))
}

fn progress_bar(len: usize, msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("  {msg} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(msg);
    pb
}
