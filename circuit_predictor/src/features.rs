//! Per-bar feature derivation.
//!
//! Turns a raw [`BarSeries`] into [`FeatureRow`]s carrying the four model inputs:
//! bar-over-bar percent change, volume spike against a trailing mean, distance
//! from the intraday VWAP and short-window volatility of the percent change.
//!
//! Percent change, volume spike and volatility run over the whole series and do
//! not reset at day boundaries. VWAP accumulates per trading day, where a trading
//! day is the calendar date in the series' exchange time zone.

use chrono::NaiveDate;
use market_data_ingestor::models::bar::{Bar, BarSeries};
use serde::{Deserialize, Serialize};

/// Column order of [`FeatureRow::vector`].
pub const FEATURE_NAMES: [&str; 4] = ["pct_change", "volume_spike", "vwap_dist", "volatility"];

/// Trailing window lengths, in bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureWindows {
    pub volume_window: usize,
    pub volatility_window: usize,
}

impl Default for FeatureWindows {
    fn default() -> Self {
        Self {
            volume_window: 10,
            volatility_window: 6,
        }
    }
}

impl FeatureWindows {
    pub fn validate(&self) -> Result<(), String> {
        if self.volume_window == 0 {
            return Err("volume_window must be at least 1".to_string());
        }
        if self.volatility_window < 2 {
            return Err("volatility_window must be at least 2".to_string());
        }
        Ok(())
    }
}

/// A bar together with its derived features. Every numeric field is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub bar: Bar,
    pub trading_day: NaiveDate,
    pub pct_change: f64,
    pub volume_spike: f64,
    pub vwap: f64,
    pub vwap_dist: f64,
    pub volatility: f64,
}

impl FeatureRow {
    /// Model input in [`FEATURE_NAMES`] order.
    pub fn vector(&self) -> [f64; 4] {
        [
            self.pct_change,
            self.volume_spike,
            self.vwap_dist,
            self.volatility,
        ]
    }
}

/// Derives features for every bar and keeps only fully defined rows.
///
/// Bars with non-finite OHLCV values are ignored up front. A series with no more
/// than `volume_window` usable bars yields an empty table. Zero volumes or zero
/// prices produce infinities or NaNs that simply cause the affected rows to be
/// dropped.
pub fn build_features(series: &BarSeries, windows: FeatureWindows) -> Vec<FeatureRow> {
    let volume_window = windows.volume_window.max(1);
    let volatility_window = windows.volatility_window.max(2);

    let bars: Vec<&Bar> = series.bars.iter().filter(|b| b.is_complete()).collect();
    if bars.len() <= volume_window {
        return Vec::new();
    }

    let days: Vec<NaiveDate> = bars.iter().map(|b| b.local_date(series.timezone)).collect();
    let pct = pct_changes(&bars);
    let spikes = volume_spikes(&bars, volume_window);
    let vwaps = daily_vwap(&bars, &days);
    let vols = rolling_std(&pct, volatility_window);

    let mut rows = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        let (Some(pct_change), Some(volume_spike), Some(volatility)) = (pct[i], spikes[i], vols[i])
        else {
            continue;
        };
        let vwap = vwaps[i];
        let vwap_dist = (bars[i].close - vwap) / vwap;

        if [pct_change, volume_spike, vwap_dist, volatility]
            .iter()
            .all(|v| v.is_finite())
        {
            rows.push(FeatureRow {
                bar: bars[i].clone(),
                trading_day: days[i],
                pct_change,
                volume_spike,
                vwap,
                vwap_dist,
                volatility,
            });
        }
    }

    tracing::debug!(
        symbol = %series.symbol,
        bars = bars.len(),
        rows = rows.len(),
        "built feature table"
    );
    rows
}

fn pct_changes(bars: &[&Bar]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(bars.len());
    out.push(None);
    for pair in bars.windows(2) {
        out.push(Some((pair[1].close / pair[0].close - 1.0) * 100.0));
    }
    out.truncate(bars.len());
    out
}

fn volume_spikes(bars: &[&Bar], window: usize) -> Vec<Option<f64>> {
    (0..bars.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let mean = bars[i + 1 - window..=i].iter().map(|b| b.volume).sum::<f64>() / window as f64;
            Some(bars[i].volume / mean)
        })
        .collect()
}

fn daily_vwap(bars: &[&Bar], days: &[NaiveDate]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    let mut current_day = None;
    let (mut cum_pv, mut cum_v) = (0.0, 0.0);

    for (bar, day) in bars.iter().zip(days) {
        if current_day != Some(*day) {
            current_day = Some(*day);
            cum_pv = 0.0;
            cum_v = 0.0;
        }
        cum_pv += bar.close * bar.volume;
        cum_v += bar.volume;
        out.push(cum_pv / cum_v);
    }
    out
}

/// Sample standard deviation (n - 1) over a trailing window. Undefined if any
/// value in the window is missing or non-finite.
fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice: Option<Vec<f64>> = values[i + 1 - window..=i]
                .iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect();
            let slice = slice?;
            let mean = slice.iter().sum::<f64>() / window as f64;
            let var = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
            Some(var.sqrt())
        })
        .collect()
}
