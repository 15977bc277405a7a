use std::io::Read;
use std::{error::Error, fs, io};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{
    request_params::{BarsRequestParams, HistorySpan, ProviderParams},
    timeframe::{TimeFrame, TimeFrameError, TimeFrameUnit},
};

use super::commands::BatchParamItem;

pub fn parse_timeframe(amount: u32, unit: &str) -> Result<TimeFrame, TimeFrameError> {
    // "M" is month; everything else is case-insensitive.
    if unit.trim() == "M" {
        return TimeFrame::new(amount, TimeFrameUnit::Month);
    }
    let unit = match unit.trim().to_lowercase().as_str() {
        "m" | "min" | "minute" => TimeFrameUnit::Minute,
        "h" | "hr" | "hour" => TimeFrameUnit::Hour,
        "d" | "day" => TimeFrameUnit::Day,
        "w" | "wk" | "week" => TimeFrameUnit::Week,
        "mo" | "month" => TimeFrameUnit::Month,
        _ => {
            return Err(TimeFrameError::InvalidInput {
                message: format!("Invalid timeframe unit: {}", unit),
            });
        }
    };
    TimeFrame::new(amount, unit)
}

/// Builds the history span from either explicit bounds or a trailing day count.
pub fn parse_span(
    days: Option<u32>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<HistorySpan, Box<dyn Error>> {
    match (start, end, days) {
        (Some(start), Some(end), _) => Ok(HistorySpan::Between {
            start: start.parse::<DateTime<Utc>>()?,
            end: end.parse::<DateTime<Utc>>()?,
        }),
        (None, None, Some(days)) => Ok(HistorySpan::TrailingDays(days)),
        _ => Err("either `days` or both `start` and `end` are required".into()),
    }
}

pub fn split_symbols(symbols: &str) -> Vec<String> {
    symbols
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn parse_batch_params_from_stdin() -> Result<Vec<BarsRequestParams>, Box<dyn Error>> {
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;

    match serde_json::from_slice::<Value>(&buffer) {
        Ok(value) => parse_batch_params_from_json_value(value),
        Err(e) => Err(format!("Failed to parse stdin data: {}", e).into()),
    }
}

pub fn parse_batch_params_from_json_string(
    json_str: &str,
) -> Result<Vec<BarsRequestParams>, Box<dyn Error>> {
    let json_value: Value = serde_json::from_str(json_str)?;
    parse_batch_params_from_json_value(json_value)
}

pub fn parse_batch_params_from_json_value(
    json_value: Value,
) -> Result<Vec<BarsRequestParams>, Box<dyn Error>> {
    let items: Vec<BatchParamItem> = serde_json::from_value(json_value)?;

    let mut params_list = Vec::with_capacity(items.len());

    for item in items {
        let symbols = split_symbols(&item.symbols);
        if symbols.is_empty() {
            return Err("batch item has no symbols".into());
        }
        let timeframe = parse_timeframe(item.amount, &item.unit)?;
        let span = parse_span(item.days, item.start.as_deref(), item.end.as_deref())?;

        params_list.push(BarsRequestParams {
            symbols,
            timeframe,
            span,
            provider_specific: ProviderParams::None,
        });
    }

    Ok(params_list)
}

pub fn parse_batch_params_from_file(
    file_path: &str,
) -> Result<Vec<BarsRequestParams>, Box<dyn Error>> {
    let content = fs::read_to_string(file_path)?;
    let json_value = serde_json::from_str(&content)?;
    parse_batch_params_from_json_value(json_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeframe::TimeFrameUnit;

    #[test]
    fn test_parse_timeframe() {
        let minute_tf = parse_timeframe(5, "m").unwrap();
        assert!(matches!(
            minute_tf,
            TimeFrame {
                amount: 5,
                unit: TimeFrameUnit::Minute
            }
        ));

        let hour_tf = parse_timeframe(2, "h").unwrap();
        assert!(matches!(
            hour_tf,
            TimeFrame {
                amount: 2,
                unit: TimeFrameUnit::Hour
            }
        ));

        let month_tf = parse_timeframe(3, "M").unwrap();
        assert!(matches!(month_tf.unit, TimeFrameUnit::Month));

        // Test error cases
        assert!(parse_timeframe(2, "d").is_err()); // Day only supports amount=1
        assert!(parse_timeframe(60, "m").is_err()); // Minutes only up to 59
        assert!(parse_timeframe(5, "invalid").is_err()); // Invalid unit
    }

    #[test]
    fn test_parse_batch_params_from_json_string() {
        let json_str = r#"[
            {
                "symbols": "RELIANCE.NS",
                "amount": 5,
                "unit": "m",
                "days": 5
            },
            {
                "symbols": "TCS.NS, INFY.NS",
                "amount": 1,
                "unit": "d",
                "start": "2023-01-01T00:00:00Z",
                "end": "2023-01-31T00:00:00Z"
            }
        ]"#;

        let params_list = parse_batch_params_from_json_string(json_str).unwrap();

        assert_eq!(params_list.len(), 2);
        assert_eq!(params_list[0].symbols, vec!["RELIANCE.NS"]);
        assert_eq!(params_list[0].span, HistorySpan::TrailingDays(5));
        assert_eq!(params_list[1].symbols, vec!["TCS.NS", "INFY.NS"]);
        assert!(matches!(params_list[1].span, HistorySpan::Between { .. }));
    }

    #[test]
    fn test_batch_item_without_span_rejected() {
        let json_str = r#"[{ "symbols": "SBIN.NS", "amount": 5, "unit": "m" }]"#;
        assert!(parse_batch_params_from_json_string(json_str).is_err());
    }

    #[test]
    fn test_split_symbols_drops_blanks() {
        assert_eq!(split_symbols(" A.NS, ,B.NS,"), vec!["A.NS", "B.NS"]);
    }
}
