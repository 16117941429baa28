//! Coach CLI - Smart Financial Coach client
//!
//! Usage:
//!   coach dashboard                         Show insights
//!   coach add -a 12.50 -c Groceries         Add a transaction
//!   coach goal -a 5000 -d 2025-12-31        Set a savings goal
//!   coach status                            Check configuration and server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use coach_core::ClientConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load client config")?;
    if let Some(ref url) = cli.api_url {
        config.set_base_url(url);
    }

    match cli.command {
        Commands::Dashboard { json } => commands::cmd_dashboard(&config, json).await,
        Commands::Add {
            amount,
            category,
            description,
        } => commands::cmd_add(&config, &amount, &category, &description).await,
        Commands::Goal { amount, date } => commands::cmd_goal(&config, amount, &date).await,
        Commands::Transactions { limit } => commands::cmd_transactions(&config, limit).await,
        Commands::Forecast {
            goal_amount,
            months,
        } => commands::cmd_forecast(&config, goal_amount, months).await,
        Commands::Status => commands::cmd_status(&config, cli.config.as_deref()).await,
    }
}
