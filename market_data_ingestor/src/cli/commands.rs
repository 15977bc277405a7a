use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(author, version, about = "Fetch OHLCV bars and quotes from the configured market data provider")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// One entry of a batch request file.
///
/// Either `days` or both `start` and `end` must be given.
#[derive(Serialize, Deserialize)]
pub struct BatchParamItem {
    pub symbols: String,
    pub amount: u32,
    pub unit: String,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BatchSource {
    File,
    Stdin,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a single data fetch request
    Single {
        /// Comma-separated list of symbols (e.g. "RELIANCE.NS,TCS.NS")
        #[arg(long)]
        symbols: String,

        /// Timeframe amount (numeric value)
        #[arg(long, default_value = "5")]
        amount: u32,

        /// Timeframe unit: m (minute), h (hour), d (day), w (week), mo (month)
        #[arg(long, default_value = "m")]
        unit: String,

        /// Number of trailing trading days; ignored when --start/--end are given
        #[arg(long, default_value = "5")]
        days: u32,

        /// Start datetime in ISO8601 format (e.g. "2025-01-01T03:45:00Z")
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// End datetime in ISO8601 format (e.g. "2025-01-30T10:00:00Z")
        #[arg(short, long, requires = "start")]
        end: Option<String>,
    },

    /// Print the latest traded price of a symbol
    Quote {
        #[arg(long)]
        symbol: String,
    },

    /// Execute batch data fetch requests; failed items are reported and skipped
    Batch {
        /// Source of batch parameters
        #[arg(long, value_enum, default_value = "stdin")]
        source: BatchSource,

        /// Path to JSON file (when source=file) or inline JSON string (when source=json)
        #[arg(long)]
        input: Option<String>,
    },
}
