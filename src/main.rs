//! plotledger - industrial plot ownership registry.
//!
//! A tool for maintaining the relational registry of industrial plot
//! ownership records and the enrichment data gathered by outreach.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plotledger::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "plotledger=info"
    } else {
        "plotledger=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
