use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{models::timeframe::TimeFrame, providers::yahoo_chart::YahooChartParams};

/// Universal parameters for requesting time-series bar data from any market data provider.
///
/// This struct is designed to be vendor-agnostic. It is intended as the standard input
/// for all [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// List of symbols to request (e.g., `["RELIANCE.NS"]`, `["AAPL"]`).
    pub symbols: Vec<String>,

    /// The time interval for each bar (e.g., 5 minutes, 1 day).
    ///
    /// **Validation of allowed values is performed by each data provider
    /// implementation, according to their own API rules.**
    pub timeframe: TimeFrame,

    /// Which stretch of history to return.
    pub span: HistorySpan,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

impl BarsRequestParams {
    /// Request for the trailing `days` trading days of a single symbol.
    pub fn trailing(symbol: impl Into<String>, timeframe: TimeFrame, days: u32) -> Self {
        Self {
            symbols: vec![symbol.into()],
            timeframe,
            span: HistorySpan::TrailingDays(days),
            provider_specific: ProviderParams::None,
        }
    }
}

/// The window of history a request covers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySpan {
    /// The most recent `n` trading sessions, as counted by the vendor.
    TrailingDays(u32),
    /// Explicit bounds. `start` is inclusive, `end` exclusive.
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// An enum to hold provider-specific request parameters.
///
/// This allows callers to specify detailed, per-request options for a
/// particular provider without cluttering the universal `BarsRequestParams`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Yahoo(YahooChartParams),
}
