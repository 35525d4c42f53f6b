mod commands;
mod logging;
mod render;

use anyhow::{Context, Result};
use calui_core::config::CalUiConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "calui")]
#[command(about = "Drive shared calendar UI state: selected days and modal visibility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply JSON-lines commands from stdin and print the state as it changes
    Watch {
        /// Minimum interval between renders (defaults to throttle_ms from config)
        #[arg(long)]
        throttle_ms: Option<u64>,

        /// Human-readable output instead of JSON lines
        #[arg(long)]
        pretty: bool,
    },
    /// Show the config path and effective settings
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CalUiConfig::load().context("Failed to load configuration")?;
    logging::init(&config.log_level)?;

    match cli.command {
        Commands::Watch {
            throttle_ms,
            pretty,
        } => commands::watch::run(throttle_ms.unwrap_or(config.throttle_ms), pretty).await,
        Commands::Config { init } => commands::config::run(&config, init),
    }
}
