//! Single-symbol forecast: fetch, build features, label, train, predict.

use chrono::{DateTime, Utc};
use market_data_ingestor::models::bar::BarSeries;
use market_data_ingestor::models::request_params::BarsRequestParams;
use market_data_ingestor::models::timeframe::TimeFrame;
use market_data_ingestor::providers::DataProvider;
use serde::Serialize;
use shared_utils::config::ConfigError;

use crate::config::{ModelConfig, PredictorConfig};
use crate::errors::PipelineError;
use crate::features::{FeatureRow, build_features};
use crate::labeling::{CircuitClass, LabelSummary, label_rows};
use crate::model::random_forest::ForestConfig;
use crate::model::{CircuitProbabilities, ProbabilisticClassifier, train_circuit_model};

/// Everything the dashboard shows for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolForecast {
    pub symbol: String,
    pub live_price: f64,
    pub price_as_of: DateTime<Utc>,
    pub probabilities: CircuitProbabilities,
    /// Classes present in the training rows, ascending.
    pub trained_classes: Vec<CircuitClass>,
    pub label_summary: LabelSummary,
    /// The feature row the prediction was made from.
    pub latest: FeatureRow,
    /// Close prices of the history window, oldest first.
    pub closes: Vec<(DateTime<Utc>, f64)>,
}

/// Model output for a bar series, independent of where the bars came from.
#[derive(Debug, Clone)]
pub struct SeriesAnalysis {
    pub probabilities: CircuitProbabilities,
    pub trained_classes: Vec<CircuitClass>,
    pub label_summary: LabelSummary,
    pub latest: FeatureRow,
}

/// Runs the whole single-symbol path against `provider`.
///
/// The live price and the intraday history are fetched once each. Model fitting
/// runs on the blocking pool.
pub async fn forecast_symbol(
    provider: &dyn DataProvider,
    symbol: &str,
    config: &PredictorConfig,
) -> Result<SymbolForecast, PipelineError> {
    let quote = provider
        .fetch_latest_quote(symbol)
        .await
        .map_err(|source| PipelineError::Provider {
            symbol: symbol.to_string(),
            source,
        })?
        .ok_or_else(|| PipelineError::DataUnavailable {
            symbol: symbol.to_string(),
            what: "live price",
        })?;

    let timeframe = TimeFrame::minutes(config.data.interval_minutes)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let params = BarsRequestParams::trailing(symbol, timeframe, config.data.history_days);
    let series = provider
        .fetch_bars(params)
        .await
        .map_err(|source| PipelineError::Provider {
            symbol: symbol.to_string(),
            source,
        })?
        .into_iter()
        .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::DataUnavailable {
            symbol: symbol.to_string(),
            what: "intraday history",
        })?;

    tracing::debug!(symbol, bars = series.len(), price = quote.price, "fetched market data");

    let closes = series
        .bars
        .iter()
        .filter(|b| b.close.is_finite())
        .map(|b| (b.timestamp, b.close))
        .collect();

    let model = config.model.clone();
    let forest = config.forest.clone();
    let task_symbol = symbol.to_string();
    let analysis = tokio::task::spawn_blocking(move || analyze_series(&series, &model, &forest))
        .await
        .map_err(|e| PipelineError::Task {
            symbol: task_symbol,
            message: e.to_string(),
        })??;

    tracing::info!(
        symbol,
        upper = analysis.probabilities.upper,
        lower = analysis.probabilities.lower,
        "forecast ready"
    );

    Ok(SymbolForecast {
        symbol: symbol.to_string(),
        live_price: quote.price,
        price_as_of: quote.as_of,
        probabilities: analysis.probabilities,
        trained_classes: analysis.trained_classes,
        label_summary: analysis.label_summary,
        latest: analysis.latest,
        closes,
    })
}

/// Feature building, labeling, training and prediction on the most recent row.
pub fn analyze_series(
    series: &BarSeries,
    model: &ModelConfig,
    forest: &ForestConfig,
) -> Result<SeriesAnalysis, PipelineError> {
    let rows = build_features(series, model.windows());
    if rows.len() < model.min_rows {
        return Err(PipelineError::InsufficientData {
            symbol: series.symbol.clone(),
            rows: rows.len(),
            required: model.min_rows,
        });
    }

    let Some(latest) = rows.last().cloned() else {
        return Err(PipelineError::InsufficientData {
            symbol: series.symbol.clone(),
            rows: 0,
            required: model.min_rows,
        });
    };

    let labeled = label_rows(rows, model.threshold_pct);
    let label_summary = LabelSummary::from_rows(&labeled);
    let classifier = train_circuit_model(&labeled, model.test_fraction, forest)?;
    let probabilities = CircuitProbabilities::predict(&classifier, &latest.vector());

    Ok(SeriesAnalysis {
        probabilities,
        trained_classes: classifier.classes().to_vec(),
        label_summary,
        latest,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use market_data_ingestor::models::bar::Bar;

    use super::*;

    fn series(n: usize) -> BarSeries {
        let mut s = BarSeries::empty("T.NS", TimeFrame::minutes(5).unwrap(), chrono_tz::Asia::Kolkata);
        let open = Utc.with_ymd_and_hms(2024, 6, 3, 3, 45, 0).unwrap();
        for i in 0..n {
            let close = 100.0 + (i as f64 * 0.4).sin();
            s.bars.push(Bar::new(
                open + Duration::minutes(5 * i as i64),
                close,
                close,
                close,
                close,
                1000.0 + (i % 5) as f64 * 100.0,
            ));
        }
        s
    }

    fn quick_forest() -> ForestConfig {
        ForestConfig {
            n_trees: 10,
            ..Default::default()
        }
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let err = analyze_series(&series(40), &ModelConfig::default(), &quick_forest()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InsufficientData { rows: 31, required: 50, .. }
        ));
        assert!(err.is_data_gap());
    }

    #[test]
    fn flat_history_predicts_no_circuit() {
        let analysis = analyze_series(&series(75), &ModelConfig::default(), &quick_forest()).unwrap();
        assert_eq!(analysis.trained_classes, vec![CircuitClass::None]);
        assert_eq!(analysis.probabilities.none, 1.0);
        assert_eq!(analysis.probabilities.max_circuit(), 0.0);
        assert_eq!(analysis.label_summary.rows, 66);
    }
}
