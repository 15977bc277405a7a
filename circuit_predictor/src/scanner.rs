//! Watchlist scan: the single-symbol pipeline fanned out over many tickers.

use std::collections::HashSet;
use std::sync::Arc;

use market_data_ingestor::providers::DataProvider;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::PredictorConfig;
use crate::errors::PipelineError;
use crate::pipeline::{SymbolForecast, forecast_symbol};

/// A symbol that produced no forecast, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Highest circuit probability first, at most `top_n` entries.
    pub ranked: Vec<SymbolForecast>,
    pub skipped: Vec<SkippedSymbol>,
    /// Symbols that produced a forecast, before truncation.
    pub succeeded: usize,
}

/// Forecasts every symbol with at most `scan.concurrency` in flight.
///
/// A failing symbol never aborts the scan; it is logged and listed in
/// [`ScanReport::skipped`].
pub async fn scan(
    provider: Arc<dyn DataProvider>,
    symbols: &[String],
    config: Arc<PredictorConfig>,
    top_n: usize,
) -> ScanReport {
    let permits = Arc::new(Semaphore::new(config.scan.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for symbol in symbols {
        let symbol = symbol.clone();
        let provider = Arc::clone(&provider);
        let config = Arc::clone(&config);
        let permits = Arc::clone(&permits);

        tasks.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => forecast_symbol(provider.as_ref(), &symbol, &config).await,
                Err(e) => Err(PipelineError::Task {
                    symbol: symbol.clone(),
                    message: e.to_string(),
                }),
            };
            (symbol, result)
        });
    }

    let mut ranked = Vec::new();
    let mut skipped = Vec::new();
    let mut finished = HashSet::new();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((symbol, Ok(forecast))) => {
                finished.insert(symbol);
                ranked.push(forecast);
            }
            Ok((symbol, Err(err))) => {
                if err.is_data_gap() {
                    tracing::warn!(%symbol, "skipping: {err}");
                } else {
                    tracing::warn!(%symbol, error = %err, "skipping after failure");
                }
                finished.insert(symbol.clone());
                skipped.push(SkippedSymbol {
                    symbol,
                    reason: err.to_string(),
                });
            }
            Err(e) => tracing::error!("scan task failed: {e}"),
        }
    }

    // Tasks that panicked never reported their symbol.
    for symbol in symbols {
        if !finished.contains(symbol) {
            skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: "analysis task aborted".to_string(),
            });
        }
    }

    let succeeded = ranked.len();
    rank(&mut ranked);
    ranked.truncate(top_n);
    skipped.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    tracing::info!(
        scanned = symbols.len(),
        succeeded,
        skipped = skipped.len(),
        "scan complete"
    );

    ScanReport {
        ranked,
        skipped,
        succeeded,
    }
}

/// Orders by `max(upper, lower)` descending, then by symbol.
pub fn rank(forecasts: &mut [SymbolForecast]) {
    forecasts.sort_by(|a, b| {
        b.probabilities
            .max_circuit()
            .total_cmp(&a.probabilities.max_circuit())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

