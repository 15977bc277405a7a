//! Plain-text views for the dashboard binary.

use std::fmt::Write;

use crate::config::Watchlist;
use crate::pipeline::SymbolForecast;
use crate::scanner::ScanReport;

pub const DISCLAIMER: &str = "Educational purpose only. Not financial advice.";

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 60;

fn percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

/// One-line chart of `values`, bucketed down to `width` characters.
///
/// Each character shows the last value of its bucket. A flat series renders at
/// mid height.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let buckets = values.len().min(width);
    let sampled: Vec<f64> = (0..buckets)
        .map(|b| values[((b + 1) * values.len()).div_ceil(buckets) - 1])
        .collect();

    let lo = sampled.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = sampled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let top = (SPARK_LEVELS.len() - 1) as f64;

    sampled
        .iter()
        .map(|v| {
            if hi - lo <= f64::EPSILON {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                SPARK_LEVELS[(((v - lo) / (hi - lo)) * top).round() as usize]
            }
        })
        .collect()
}

pub fn render_forecast(forecast: &SymbolForecast, name: Option<&str>, threshold_pct: f64) -> String {
    let mut out = String::new();
    let p = &forecast.probabilities;

    let title = match name {
        Some(name) => format!("{name} ({})", forecast.symbol),
        None => forecast.symbol.clone(),
    };
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
    let _ = writeln!(
        out,
        "Live price: {:.2}  (as of {})",
        forecast.live_price,
        forecast.price_as_of.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  Upper circuit (+{threshold_pct}%)  {:>8}", percent(p.upper));
    let _ = writeln!(out, "  Lower circuit (-{threshold_pct}%)  {:>8}", percent(p.lower));
    let _ = writeln!(out, "  No circuit             {:>8}", percent(p.none));
    let _ = writeln!(out);

    let classes: Vec<String> = forecast.trained_classes.iter().map(|c| c.to_string()).collect();
    let summary = &forecast.label_summary;
    let _ = writeln!(
        out,
        "Trained on classes [{}] from {} rows over {} trading days",
        classes.join(", "),
        summary.rows,
        summary.trading_days
    );

    let closes: Vec<f64> = forecast.closes.iter().map(|(_, c)| *c).collect();
    if let (Some((first_ts, _)), Some((last_ts, _))) = (forecast.closes.first(), forecast.closes.last()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Price  {}", sparkline(&closes, SPARK_WIDTH));
        let _ = writeln!(
            out,
            "       {} .. {}",
            first_ts.format("%Y-%m-%d %H:%M"),
            last_ts.format("%Y-%m-%d %H:%M")
        );
    }

    let _ = writeln!(out);
    let _ = write!(out, "{DISCLAIMER}");
    out
}

pub fn render_scan(report: &ScanReport, watchlist: &Watchlist) -> String {
    let mut out = String::new();
    let rows: Vec<[String; 6]> = report
        .ranked
        .iter()
        .enumerate()
        .map(|(i, f)| {
            [
                (i + 1).to_string(),
                watchlist.name_for(&f.symbol).unwrap_or("-").to_string(),
                f.symbol.clone(),
                percent(f.probabilities.lower),
                percent(f.probabilities.upper),
                percent(f.probabilities.max_circuit()),
            ]
        })
        .collect();

    let header = ["#", "Name", "Symbol", "Lower", "Upper", "Max"];
    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 6]| {
        let mut s = String::new();
        for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
            let pad = w - cell.chars().count();
            // Text columns left-aligned, numbers right-aligned.
            if i == 1 || i == 2 {
                s.push_str(cell);
                s.push_str(&" ".repeat(pad));
            } else {
                s.push_str(&" ".repeat(pad));
                s.push_str(cell);
            }
            if i + 1 < cells.len() {
                s.push_str("  ");
            }
        }
        s
    };

    if rows.is_empty() {
        let _ = writeln!(out, "No stock produced a forecast.");
    } else {
        let rule = widths.map(|w| "-".repeat(w));
        let _ = writeln!(out, "{}", line(header));
        let _ = writeln!(out, "{}", line(rule.each_ref().map(String::as_str)));
        for row in &rows {
            let _ = writeln!(out, "{}", line(row.each_ref().map(String::as_str)));
        }
    }

    let _ = writeln!(
        out,
        "\n{} of {} stocks forecast, {} skipped",
        report.succeeded,
        report.succeeded + report.skipped.len(),
        report.skipped.len()
    );
    for skip in &report.skipped {
        let _ = writeln!(out, "  warning: {} skipped: {}", skip.symbol, skip.reason);
    }

    let _ = writeln!(out);
    let _ = write!(out, "{DISCLAIMER}");
    out
}

pub fn render_watchlist(watchlist: &Watchlist) -> String {
    let width = watchlist.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, symbol) in watchlist.iter() {
        let _ = writeln!(out, "{name:<width$}  {symbol}");
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use market_data_ingestor::models::bar::Bar;

    use super::*;
    use crate::features::FeatureRow;
    use crate::labeling::{CircuitClass, LabelSummary};
    use crate::model::CircuitProbabilities;
    use crate::scanner::SkippedSymbol;

    fn forecast(symbol: &str, upper: f64, lower: f64) -> SymbolForecast {
        let ts = Utc.with_ymd_and_hms(2024, 6, 3, 9, 55, 0).unwrap();
        SymbolForecast {
            symbol: symbol.to_string(),
            live_price: 2871.35,
            price_as_of: ts,
            probabilities: CircuitProbabilities {
                lower,
                none: 1.0 - upper - lower,
                upper,
            },
            trained_classes: vec![CircuitClass::None, CircuitClass::Upper],
            label_summary: LabelSummary {
                rows: 300,
                trading_days: 5,
                lower: 0,
                none: 240,
                upper: 60,
            },
            latest: FeatureRow {
                bar: Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0),
                trading_day: ts.date_naive(),
                pct_change: 0.0,
                volume_spike: 1.0,
                vwap: 1.0,
                vwap_dist: 0.0,
                volatility: 0.0,
            },
            closes: (0..5)
                .map(|i| (ts + Duration::minutes(5 * i), 100.0 + i as f64))
                .collect(),
        }
    }

    #[test]
    fn sparkline_spans_lowest_to_highest() {
        assert_eq!(sparkline(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 8), "▁▂▃▄▅▆▇█");
        assert_eq!(sparkline(&[5.0, 5.0, 5.0], 10), "▅▅▅");
        assert_eq!(sparkline(&[], 10), "");
    }

    #[test]
    fn sparkline_downsamples_to_width() {
        let values: Vec<f64> = (0..300).map(f64::from).collect();
        let line = sparkline(&values, 60);
        assert_eq!(line.chars().count(), 60);
        assert!(line.ends_with('█'));
    }

    #[test]
    fn forecast_view_shows_percentages_and_footer() {
        let text = render_forecast(&forecast("TCS.NS", 0.1234, 0.0), Some("TCS"), 10.0);
        assert!(text.starts_with("TCS (TCS.NS)\n"));
        assert!(text.contains("Live price: 2871.35"));
        assert!(text.contains("Upper circuit (+10%)"));
        assert!(text.contains("12.34%"));
        assert!(text.contains("Trained on classes [0, 1]"));
        assert!(text.ends_with(DISCLAIMER));
    }

    #[test]
    fn scan_view_lists_ranks_and_skips() {
        let report = ScanReport {
            ranked: vec![forecast("SBIN.NS", 0.5, 0.1), forecast("TCS.NS", 0.0, 0.2)],
            skipped: vec![SkippedSymbol {
                symbol: "NAVA.NS".to_string(),
                reason: "no intraday history available for NAVA.NS".to_string(),
            }],
            succeeded: 2,
        };
        let text = render_scan(&report, &Watchlist::default());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("#  Name"));
        assert!(lines[2].contains("SBI") && lines[2].contains("50.00%"));
        assert!(lines[3].contains("TCS.NS") && lines[3].contains("20.00%"));
        assert!(text.contains("2 of 3 stocks forecast, 1 skipped"));
        assert!(text.contains("warning: NAVA.NS skipped"));
    }

    #[test]
    fn watchlist_view_keeps_order() {
        let text = render_watchlist(&Watchlist::default());
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("Reliance Industries"));
        assert!(first.ends_with("RELIANCE.NS"));
    }
}
