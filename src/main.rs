//! Paddock CLI entry point.

use anyhow::Result;
use clap::Parser;
use paddock::cli::{commands, Cli, Commands};
use paddock::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("paddock={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Ingest { urls, fresh } => {
            commands::run_ingest(urls, *fresh, settings).await?;
        }

        Commands::Search { query, limit } => {
            commands::run_search(query, *limit, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.as_deref(), *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
