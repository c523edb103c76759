mod config;
mod error;
mod http_server;
mod sanitize;
mod types;
mod validation;
mod work_items;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{Cli, Config};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use validation::ReleaseDateValidator;
use work_items::AdoClient;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = Config::try_from(&cli).map_err(|e| anyhow!(e))?;
    if config.access_token.as_deref().map_or(true, |t| t.trim().is_empty()) {
        tracing::warn!("no access token configured; outbound calls will be refused");
    }

    let client = AdoClient::new(&config).context("failed to build HTTP client")?;
    let validator = Arc::new(ReleaseDateValidator::new(&config, Arc::new(client)));

    http_server::run(cli.bind, validator)
        .await
        .map_err(|e| anyhow!(e))
}
