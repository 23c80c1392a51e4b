//! CLI argument definitions and dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "plots")]
#[command(about = "Industrial plot ownership registry and outreach enrichment store")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Database URL (sqlite path or postgres:// URL)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Show registry status
    Status,

    /// Show one plot's ownership and outreach records
    Show {
        /// Plot code to look up
        plotcode: String,
    },

    /// List properties
    Ls {
        /// Filter by district membership
        #[arg(short, long)]
        district: Option<String>,

        /// Filter by industrial-area membership
        #[arg(short, long)]
        area: Option<String>,

        /// Only properties whose phone passed validation
        #[arg(long)]
        valid_phone: bool,

        /// Limit number of results
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Output format (table, json, plotcodes)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Manage the database
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Run database migrations
    Migrate {
        /// Only report whether migrations are needed
        #[arg(long)]
        check: bool,
        /// Re-run even if the schema looks current
        #[arg(long)]
        force: bool,
    },

    /// Export registry contents to a JSONL dump
    Export {
        /// Output file
        output: PathBuf,
    },

    /// Import registry contents from a JSONL dump
    Import {
        /// Input file
        input: PathBuf,
        /// Merge repeat plotcodes into existing records instead of replacing
        #[arg(long)]
        merge: bool,
        /// Show what would be imported without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy registry contents to another database
    Copy {
        /// Target database URL
        #[arg(long)]
        to: String,
        /// Clear the target before copying
        #[arg(long)]
        clear: bool,
        /// Rows per COPY chunk
        #[arg(long, default_value = "1000")]
        batch_size: usize,
        /// Use the COPY protocol for the property table (Postgres targets)
        #[arg(long)]
        use_copy: bool,
    },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.data_dir, cli.database_url)?;

    match cli.command {
        Commands::Init => super::init::cmd_init(&settings).await,
        Commands::Status => super::ls::cmd_status(&settings).await,
        Commands::Show { plotcode } => super::ls::cmd_show(&settings, &plotcode).await,
        Commands::Ls {
            district,
            area,
            valid_phone,
            limit,
            format,
        } => {
            super::ls::cmd_ls(
                &settings,
                district.as_deref(),
                area.as_deref(),
                valid_phone,
                limit,
                &format,
            )
            .await
        }
        Commands::Db { command } => match command {
            DbCommands::Migrate { check, force } => {
                super::db::cmd_migrate(&settings, check, force).await
            }
            DbCommands::Export { output } => super::db::cmd_export(&settings, &output).await,
            DbCommands::Import {
                input,
                merge,
                dry_run,
            } => super::db::cmd_import(&settings, &input, merge, dry_run).await,
            DbCommands::Copy {
                to,
                clear,
                batch_size,
                use_copy,
            } => super::db::cmd_copy(&settings, &to, clear, batch_size, use_copy).await,
        },
    }
}
