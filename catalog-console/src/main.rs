//! catalog-console - admin console for the product catalog
//!
//! Runs one subcommand against the catalog service: listings, category and
//! size maintenance, product creation, per-product sizes, or an interactive
//! debounced search.

mod cli;
mod commands;
mod config;
mod interactive;
mod logger;

use std::process::ExitCode;

use catalog_client::CatalogStore;
use clap::Parser;

use cli::Cli;
use config::ConsoleConfig;

/// Exit status when the session cookie has to be renewed
const EXIT_SIGN_IN: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if commands::is_session_expired(&err) => {
            tracing::warn!("session expired, stopping");
            eprintln!(
                "Session expired. Sign in again and pass the new session cookie \
                 with --session-cookie or CATALOG_SESSION_COOKIE."
            );
            ExitCode::from(EXIT_SIGN_IN)
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConsoleConfig::resolve(&cli.config)?;
    logger::init_logger(config.log_dir.as_deref());

    tracing::info!(api_url = %config.api_url, "starting catalog console");

    let client_config = config.client_config();
    let client = client_config.build_http_client()?;
    let mut store = CatalogStore::new(client);

    commands::run(&mut store, cli.command, client_config.search_delay).await
}
