#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use circuit_predictor::config::PredictorConfig;
use market_data_ingestor::models::bar::{Bar, BarSeries};
use market_data_ingestor::models::request_params::BarsRequestParams;
use market_data_ingestor::providers::{ApiSnafu, DataProvider, ProviderError};

pub const BARS_PER_DAY: i64 = 75;

/// In-memory provider. Symbols without canned bars fail with an API error.
#[derive(Default)]
pub struct MockProvider {
    bars: HashMap<String, Vec<Bar>>,
}

impl MockProvider {
    pub fn with(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }
}

#[async_trait]
impl DataProvider for MockProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        let mut out = Vec::new();
        for symbol in params.symbols {
            let Some(bars) = self.bars.get(&symbol) else {
                return ApiSnafu {
                    message: format!("no such symbol {symbol}"),
                }
                .fail();
            };
            out.push(BarSeries {
                symbol,
                timeframe: params.timeframe,
                timezone: chrono_tz::Asia::Kolkata,
                bars: bars.clone(),
            });
        }
        Ok(out)
    }
}

/// Five sessions of five-minute bars. `day_moves[d]` is that day's
/// open-to-close move in percent.
pub fn sessions(day_moves: &[f64]) -> Vec<Bar> {
    let mut bars = Vec::new();
    let mut price = 100.0;
    for (d, &mv) in day_moves.iter().enumerate() {
        let open_ts = Utc.with_ymd_and_hms(2024, 6, 3 + d as u32, 3, 45, 0).unwrap();
        let day_open = price;
        for i in 0..BARS_PER_DAY {
            let progress = i as f64 / (BARS_PER_DAY - 1) as f64;
            let wiggle = if i % 2 == 0 { 0.02 } else { -0.02 };
            price = day_open * (1.0 + mv / 100.0 * progress) + wiggle;
            let volume = 10_000.0 + ((i * 37) % 11) as f64 * 500.0;
            bars.push(Bar::new(
                open_ts + Duration::minutes(5 * i),
                price,
                price,
                price,
                price,
                volume,
            ));
        }
    }
    bars
}

pub fn fast_config() -> PredictorConfig {
    let mut config = PredictorConfig::default();
    config.forest.n_trees = 25;
    config
}
