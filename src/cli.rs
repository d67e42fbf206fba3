// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trend-monitor")]
#[command(about = "Multi-timeframe crypto trend monitor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Instrument to monitor (e.g., "BTC-USDT"), overriding the settings
    #[arg(short, long)]
    pub symbol: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the monitor on its configured cadences until interrupted
    Run,

    /// Run a single trend cycle and print the report
    Once {
        /// Print the raw report as JSON instead of the rendered alert
        #[arg(long)]
        json: bool,
    },
}
