use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    models::{
        bar::{Bar, BarSeries},
        timeframe::TimeFrame,
    },
    providers::{ApiSnafu, DecodeSnafu, ProviderError},
};

/// Error code the chart endpoint uses for unknown or delisted symbols.
const NOT_FOUND: &str = "Not Found";

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Deserialize, Debug)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub exchange_timezone_name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV; cells are `null` where the vendor has no print.
#[derive(Deserialize, Debug, Default)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Parses a chart response body into a [`BarSeries`].
///
/// A `Not Found` error from the vendor becomes an empty series so that illiquid or
/// delisted symbols read as "no data" instead of failing the caller.
pub fn parse_chart_body(
    symbol: &str,
    timeframe: TimeFrame,
    body: &str,
) -> Result<BarSeries, ProviderError> {
    let envelope: ChartEnvelope = serde_json::from_str(body).context(DecodeSnafu)?;

    if let Some(err) = envelope.chart.error {
        if err.code == NOT_FOUND {
            debug!(symbol, description = %err.description, "chart has no data");
            return Ok(BarSeries::empty(symbol, timeframe, chrono_tz::UTC));
        }
        return ApiSnafu {
            message: format!("{}: {}", err.code, err.description),
        }
        .fail();
    }

    match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => Ok(result.into_bar_series(symbol, timeframe)),
        None => Ok(BarSeries::empty(symbol, timeframe, chrono_tz::UTC)),
    }
}

impl ChartResult {
    /// Zips the timestamp and quote columns into bars.
    ///
    /// Rows with any missing OHLCV cell are skipped, bars are returned oldest first,
    /// and a repeated timestamp keeps the later (more up to date) row.
    pub fn into_bar_series(self, symbol: &str, timeframe: TimeFrame) -> BarSeries {
        let timezone = self.timezone();
        let columns = self.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars: Vec<Bar> = Vec::with_capacity(self.timestamp.len());
        let mut skipped = 0usize;
        for (i, &ts) in self.timestamp.iter().enumerate() {
            let cell = |col: &Vec<Option<f64>>| col.get(i).copied().flatten();
            let (Some(open), Some(high), Some(low), Some(close), Some(volume), Some(timestamp)) = (
                cell(&columns.open),
                cell(&columns.high),
                cell(&columns.low),
                cell(&columns.close),
                cell(&columns.volume),
                DateTime::<Utc>::from_timestamp(ts, 0),
            ) else {
                skipped += 1;
                continue;
            };
            bars.push(Bar::new(timestamp, open, high, low, close, volume));
        }

        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.timestamp == bar.timestamp => *prev = bar,
                _ => deduped.push(bar),
            }
        }

        if skipped > 0 {
            debug!(symbol, skipped, "dropped chart rows with missing cells");
        }

        BarSeries {
            symbol: symbol.to_string(),
            timeframe,
            timezone,
            bars: deduped,
        }
    }

    fn timezone(&self) -> Tz {
        match self.meta.exchange_timezone_name.as_deref() {
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(symbol = %self.meta.symbol, tz = name, "unknown exchange time zone, using UTC");
                chrono_tz::UTC
            }),
            None => chrono_tz::UTC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "currency": "INR",
                    "symbol": "SBIN.NS",
                    "exchangeTimezoneName": "Asia/Kolkata",
                    "regularMarketPrice": 771.5
                },
                "timestamp": [1714974300, 1714974600, 1714974900, 1714974900],
                "indicators": {
                    "quote": [{
                        "open":   [770.0, 771.0, null, 772.0],
                        "high":   [771.5, 772.0, 773.0, 773.5],
                        "low":    [769.5, 770.5, 771.0, 771.5],
                        "close":  [771.0, 771.8, 772.2, 771.5],
                        "volume": [120000, 98000, 50000, 51000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_bars_and_timezone() {
        let tf = TimeFrame::minutes(5).unwrap();
        let series = parse_chart_body("SBIN.NS", tf, BODY).unwrap();

        assert_eq!(series.symbol, "SBIN.NS");
        assert_eq!(series.timezone, chrono_tz::Asia::Kolkata);
        // row 3 has a null open; row 4 shares its timestamp and survives
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars[0].close, 771.0);
        assert_eq!(series.bars[2].open, 772.0);
        assert_eq!(series.bars[2].volume, 51000.0);
        assert!(series.bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn not_found_is_empty_series() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let series = parse_chart_body("GONE.NS", TimeFrame::minutes(5).unwrap(), body).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.symbol, "GONE.NS");
    }

    #[test]
    fn other_vendor_errors_surface() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=7m is not supported"}}}"#;
        let err = parse_chart_body("X", TimeFrame::minutes(5).unwrap(), body).unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }));
        assert!(err.to_string().contains("Bad Request"));
    }

    #[test]
    fn result_without_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"ILLQ.NS"},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let series = parse_chart_body("ILLQ.NS", TimeFrame::minutes(5).unwrap(), body).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = parse_chart_body("X", TimeFrame::minutes(5).unwrap(), "<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }
}
