use serde::{Deserialize, Serialize};

use crate::{
    models::{
        request_params::{BarsRequestParams, HistorySpan, ProviderParams},
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{ProviderError, ValidationSnafu},
};

/// Yahoo-specific parameters for a chart request.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct YahooChartParams {
    /// Include pre- and post-market bars. Off by default; NSE has no extended session anyway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_pre_post: Option<bool>,
}

/// Maps a [`TimeFrame`] onto one of the interval strings the chart endpoint accepts.
pub fn validate_timeframe(timeframe: &TimeFrame) -> Result<&'static str, ProviderError> {
    let interval = match (timeframe.unit, timeframe.amount) {
        (TimeFrameUnit::Minute, 1) => "1m",
        (TimeFrameUnit::Minute, 2) => "2m",
        (TimeFrameUnit::Minute, 5) => "5m",
        (TimeFrameUnit::Minute, 15) => "15m",
        (TimeFrameUnit::Minute, 30) => "30m",
        (TimeFrameUnit::Hour, 1) => "60m",
        (TimeFrameUnit::Day, 1) => "1d",
        (TimeFrameUnit::Week, 1) => "1wk",
        (TimeFrameUnit::Month, 1) => "1mo",
        (TimeFrameUnit::Month, 3) => "3mo",
        _ => {
            return ValidationSnafu {
                message: format!("Yahoo chart does not support a {timeframe} interval"),
            }
            .fail();
        }
    };
    Ok(interval)
}

/// Builds the query string for one chart request.
pub fn construct_params(params: &BarsRequestParams) -> Result<Vec<(String, String)>, ProviderError> {
    let interval = validate_timeframe(&params.timeframe)?;
    let mut query = vec![("interval".to_string(), interval.to_string())];

    match &params.span {
        HistorySpan::TrailingDays(0) => {
            return ValidationSnafu {
                message: "trailing span must cover at least one day",
            }
            .fail();
        }
        HistorySpan::TrailingDays(days) => {
            query.push(("range".to_string(), format!("{days}d")));
        }
        HistorySpan::Between { start, end } => {
            if start >= end {
                return ValidationSnafu {
                    message: format!("start {start} must be before end {end}"),
                }
                .fail();
            }
            query.push(("period1".to_string(), start.timestamp().to_string()));
            query.push(("period2".to_string(), end.timestamp().to_string()));
        }
    }

    if let ProviderParams::Yahoo(yahoo) = &params.provider_specific {
        if let Some(pre_post) = yahoo.include_pre_post {
            query.push(("includePrePost".to_string(), pre_post.to_string()));
        }
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn five_minute_trailing_request() {
        let params = BarsRequestParams::trailing("RELIANCE.NS", TimeFrame::minutes(5).unwrap(), 5);
        let query = construct_params(&params).unwrap();
        assert_eq!(
            query,
            vec![
                ("interval".to_string(), "5m".to_string()),
                ("range".to_string(), "5d".to_string()),
            ]
        );
    }

    #[test]
    fn explicit_bounds_and_pre_post() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let params = BarsRequestParams {
            symbols: vec!["AAPL".into()],
            timeframe: TimeFrame::day(),
            span: HistorySpan::Between { start, end },
            provider_specific: ProviderParams::Yahoo(YahooChartParams {
                include_pre_post: Some(true),
            }),
        };
        let query = construct_params(&params).unwrap();
        assert!(query.contains(&("period1".to_string(), "1704067200".to_string())));
        assert!(query.contains(&("period2".to_string(), "1704153600".to_string())));
        assert!(query.contains(&("includePrePost".to_string(), "true".to_string())));
    }

    #[test]
    fn unsupported_interval_rejected() {
        let tf = TimeFrame::minutes(7).unwrap();
        let err = validate_timeframe(&tf).unwrap_err();
        assert!(err.to_string().contains("7m"));
    }

    #[test]
    fn empty_span_rejected() {
        let params = BarsRequestParams::trailing("X", TimeFrame::minutes(5).unwrap(), 0);
        assert!(matches!(
            construct_params(&params),
            Err(ProviderError::Validation { .. })
        ));
    }
}
