use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{Context, Result};
use circuit_predictor::{
    cli::{
        commands::{Cli, Commands, OutputFormat},
        target::resolve_target,
    },
    config::PredictorConfig,
    pipeline::forecast_symbol,
    render::{render_forecast, render_scan, render_watchlist},
    scanner::scan,
};
use clap::Parser;
use market_data_ingestor::providers::{
    DataProvider,
    yahoo_chart::{YahooOptions, YahooProvider},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = PredictorConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(threshold) = cli.threshold {
        config.model.threshold_pct = threshold;
        config.validate().context("invalid --threshold")?;
    }

    match cli.command {
        Commands::Watchlist => match cli.format {
            OutputFormat::Text => print!("{}", render_watchlist(&config.watchlist)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config.watchlist)?),
        },

        Commands::Predict { symbol, name } => {
            let target = resolve_target(symbol.as_deref(), name.as_deref(), &config.watchlist)?;
            let provider = build_provider(&config)?;
            let forecast = forecast_symbol(provider.as_ref(), &target.symbol, &config).await?;

            match cli.format {
                OutputFormat::Text => println!(
                    "{}",
                    render_forecast(&forecast, target.name.as_deref(), config.model.threshold_pct)
                ),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&forecast)?),
            }
        }

        Commands::Scan { top } => {
            let provider = build_provider(&config)?;
            let symbols = config.watchlist.symbols();
            let top_n = top.unwrap_or(config.scan.top_n);
            let config = Arc::new(config);
            let report = scan(provider, &symbols, Arc::clone(&config), top_n).await;

            match cli.format {
                OutputFormat::Text => println!("{}", render_scan(&report, &config.watchlist)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
    }

    Ok(())
}

fn build_provider(config: &PredictorConfig) -> Result<Arc<dyn DataProvider>> {
    let requests_per_second = NonZeroU32::new(config.data.requests_per_second)
        .context("data.requests_per_second must be at least 1")?;
    let provider = YahooProvider::with_options(YahooOptions {
        request_timeout: config.data.request_timeout(),
        requests_per_second,
    })
    .context("failed to create Yahoo provider")?;
    Ok(Arc::new(provider))
}
