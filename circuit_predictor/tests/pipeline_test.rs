mod common;

use circuit_predictor::errors::PipelineError;
use circuit_predictor::labeling::CircuitClass;
use circuit_predictor::pipeline::forecast_symbol;
use common::{BARS_PER_DAY, MockProvider, fast_config, sessions};

#[tokio::test]
async fn forecast_carries_price_classes_and_chart() {
    let bars = sessions(&[0.0, 12.0, 0.0, 0.0, 12.0]);
    let last_close = bars.last().unwrap().close;
    let provider = MockProvider::default().with("UP.NS", bars);

    let forecast = forecast_symbol(&provider, "UP.NS", &fast_config()).await.unwrap();

    assert_eq!(forecast.live_price, last_close);
    assert_eq!(forecast.closes.len(), 5 * BARS_PER_DAY as usize);
    assert_eq!(
        forecast.trained_classes,
        vec![CircuitClass::None, CircuitClass::Upper]
    );
    assert_eq!(forecast.label_summary.trading_days, 5);
    assert_eq!(forecast.probabilities.lower, 0.0);
    let p = forecast.probabilities;
    assert!((p.lower + p.none + p.upper - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn short_history_is_insufficient() {
    let mut bars = sessions(&[1.0]);
    bars.truncate(40);
    let provider = MockProvider::default().with("THIN.NS", bars);

    let err = forecast_symbol(&provider, "THIN.NS", &fast_config()).await.unwrap_err();
    assert!(matches!(err, PipelineError::InsufficientData { required: 50, .. }));
}

#[tokio::test]
async fn empty_history_is_unavailable() {
    let provider = MockProvider::default().with("EMPTY.NS", Vec::new());
    let err = forecast_symbol(&provider, "EMPTY.NS", &fast_config()).await.unwrap_err();
    assert!(matches!(err, PipelineError::DataUnavailable { .. }));
    assert!(err.is_data_gap());
}

#[tokio::test]
async fn threshold_override_changes_labels() {
    let provider = MockProvider::default().with("UP.NS", sessions(&[0.0, 6.0, 0.0, 0.0, 6.0]));
    let mut config = fast_config();

    let strict = forecast_symbol(&provider, "UP.NS", &config).await.unwrap();
    assert_eq!(strict.trained_classes, vec![CircuitClass::None]);

    config.model.threshold_pct = 5.0;
    let loose = forecast_symbol(&provider, "UP.NS", &config).await.unwrap();
    assert!(loose.trained_classes.contains(&CircuitClass::Upper));
}
