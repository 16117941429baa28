//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Coach - Personal finance insights from your coaching server
#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Client for the Smart Financial Coach insights API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Insights API base URL (overrides config file and COACH_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (defaults to ~/.local/share/coach/config/client.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show spending insights, subscriptions, anomalies and tips
    Dashboard {
        /// Print the raw insights snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a transaction, then show the refreshed dashboard
    Add {
        /// Amount (e.g. 12.50; negative for refunds)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,

        /// Category (e.g. "Food & Drink")
        #[arg(short, long)]
        category: String,

        /// Optional description, stored as the merchant
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Set a savings goal and show the recommendation
    Goal {
        /// Amount to save
        #[arg(short, long)]
        amount: f64,

        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
    },

    /// List transactions stored on the server
    Transactions {
        /// Maximum number of rows to show (most recent last)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Project how many months a goal takes at the current surplus
    Forecast {
        /// Goal amount
        #[arg(short, long, default_value = "3000")]
        goal_amount: f64,

        /// Horizon in months
        #[arg(short, long, default_value = "10")]
        months: u32,
    },

    /// Show resolved configuration and check the server is reachable
    Status,
}
