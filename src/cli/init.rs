//! `plots init` - create the data directory and database.

use console::style;

use crate::config::Settings;
use crate::repository::util::redact_url_password;

pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    println!("{} Initializing plot registry", style("→").cyan());
    println!("  Data directory: {}", settings.data_dir.display());
    println!(
        "  Database: {}",
        redact_url_password(&settings.database_url())
    );

    if !settings.is_postgres() {
        settings.ensure_data_dir()?;
    }

    let ctx = settings.create_db_context()?;
    ctx.migrate()
        .await
        .map_err(|e| anyhow::anyhow!("migration failed: {}", e))?;

    println!("{} Registry initialized", style("✓").green());
    Ok(())
}
