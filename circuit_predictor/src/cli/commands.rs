use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Estimate the chance that a stock hits its upper or lower circuit today"
)]
pub struct Cli {
    /// TOML config file; falls back to $CIRCUIT_CONFIG, then built-in defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the circuit threshold, in percent
    #[arg(long, global = true)]
    pub threshold: Option<f64>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast a single stock
    #[command(group(ArgGroup::new("target").args(["symbol", "name"])))]
    Predict {
        /// Ticker symbol (e.g. "RELIANCE.NS")
        #[arg(long)]
        symbol: Option<String>,

        /// Display name from the watchlist (e.g. "Reliance Industries")
        #[arg(long)]
        name: Option<String>,
    },

    /// Forecast every watchlist stock and rank by circuit probability
    Scan {
        /// Number of stocks to show; defaults to scan.top_n
        #[arg(long)]
        top: Option<usize>,
    },

    /// List the configured watchlist
    Watchlist,
}
