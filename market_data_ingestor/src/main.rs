use anyhow::{Context, Result, anyhow};
use clap::Parser;
use market_data_ingestor::{
    cli::{
        commands::{BatchSource, Cli, Commands},
        params::{
            parse_batch_params_from_file, parse_batch_params_from_json_string,
            parse_batch_params_from_stdin, parse_span, parse_timeframe, split_symbols,
        },
    },
    models::request_params::{BarsRequestParams, ProviderParams},
    providers::{DataProvider, yahoo_chart::YahooProvider},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let provider = YahooProvider::new().context("failed to create Yahoo provider")?;

    match cli.command {
        Commands::Single {
            symbols,
            amount,
            unit,
            days,
            start,
            end,
        } => {
            let symbols = split_symbols(&symbols);
            if symbols.is_empty() {
                return Err(anyhow!("no symbols given"));
            }
            let params = BarsRequestParams {
                symbols,
                timeframe: parse_timeframe(amount, &unit)?,
                span: parse_span(Some(days), start.as_deref(), end.as_deref())
                    .map_err(|e| anyhow!("{e}"))?,
                provider_specific: ProviderParams::None,
            };
            let series = provider.fetch_bars(params).await?;
            println!("{}", serde_json::to_string_pretty(&series)?);
        }

        Commands::Quote { symbol } => match provider.fetch_latest_quote(&symbol).await? {
            Some(quote) => println!("{}", serde_json::to_string(&quote)?),
            None => return Err(anyhow!("no live price available for {symbol}")),
        },

        Commands::Batch { source, input } => {
            let params_list = match source {
                BatchSource::File => {
                    let path = input.as_deref().context("File path required for source=file")?;
                    parse_batch_params_from_file(path)
                }
                BatchSource::Stdin => parse_batch_params_from_stdin(),
                BatchSource::Json => {
                    let json = input.as_deref().context("JSON string required for source=json")?;
                    parse_batch_params_from_json_string(json)
                }
            }
            .map_err(|e| anyhow!("{e}"))?;

            let mut success_count = 0;
            let mut error_count = 0;

            for params in params_list {
                let label = params.symbols.join(",");
                match provider.fetch_bars(params).await {
                    Ok(series) => {
                        println!("{}", serde_json::to_string(&series)?);
                        success_count += 1;
                    }
                    Err(e) => {
                        eprintln!("ERROR: {} - {}", label, e);
                        error_count += 1;
                    }
                }
            }

            // Summary goes to stderr so it doesn't interfere with machine parsing of stdout
            eprintln!("SUMMARY: {} succeeded, {} failed", success_count, error_count);
        }
    }

    Ok(())
}
