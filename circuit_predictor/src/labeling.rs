//! Per-day circuit labels.
//!
//! Every row of a trading day gets the same label, derived from that day's
//! open-to-close return. The label therefore looks ahead: early bars of a day
//! are labeled with information from its final bar, and today's rows use a
//! provisional return up to the most recent bar. This leakage is a known
//! limitation of the model and is kept as-is.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::features::FeatureRow;

/// Which circuit, if any, a day ended at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum CircuitClass {
    Lower = -1,
    None = 0,
    Upper = 1,
}

impl CircuitClass {
    pub const ALL: [CircuitClass; 3] = [CircuitClass::Lower, CircuitClass::None, CircuitClass::Upper];

    pub fn value(self) -> i8 {
        self as i8
    }

    /// `Upper` at or above `threshold`, `Lower` at or below `-threshold`. NaN is `None`.
    pub fn classify(day_return: f64, threshold: f64) -> Self {
        if day_return >= threshold {
            CircuitClass::Upper
        } else if day_return <= -threshold {
            CircuitClass::Lower
        } else {
            CircuitClass::None
        }
    }
}

impl From<CircuitClass> for i8 {
    fn from(class: CircuitClass) -> Self {
        class.value()
    }
}

impl TryFrom<i8> for CircuitClass {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(CircuitClass::Lower),
            0 => Ok(CircuitClass::None),
            1 => Ok(CircuitClass::Upper),
            other => Err(format!("{other} is not a circuit class")),
        }
    }
}

impl fmt::Display for CircuitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRow {
    #[serde(flatten)]
    pub features: FeatureRow,
    /// Percent return from the day's first to last remaining close.
    pub day_return: f64,
    pub circuit_target: CircuitClass,
}

/// Attaches `day_return` and `circuit_target` to every row.
///
/// Days are taken from [`FeatureRow::trading_day`]; the first and last rows
/// present for a day define its return, so bars dropped by the feature builder
/// do not count.
pub fn label_rows(rows: Vec<FeatureRow>, threshold: f64) -> Vec<LabeledRow> {
    let mut day_bounds: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for row in &rows {
        day_bounds
            .entry(row.trading_day)
            .and_modify(|(_, last)| *last = row.bar.close)
            .or_insert((row.bar.close, row.bar.close));
    }

    rows.into_iter()
        .map(|features| {
            let day_return = day_bounds
                .get(&features.trading_day)
                .map(|&(first, last)| (last - first) / first * 100.0)
                .unwrap_or(f64::NAN);
            LabeledRow {
                circuit_target: CircuitClass::classify(day_return, threshold),
                day_return,
                features,
            }
        })
        .collect()
}

/// Class histogram of a labeled table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelSummary {
    pub rows: usize,
    pub trading_days: usize,
    pub lower: usize,
    pub none: usize,
    pub upper: usize,
}

impl LabelSummary {
    pub fn from_rows(rows: &[LabeledRow]) -> Self {
        let mut summary = Self {
            rows: rows.len(),
            ..Default::default()
        };
        let mut days: Vec<NaiveDate> = rows.iter().map(|r| r.features.trading_day).collect();
        days.dedup();
        summary.trading_days = days.len();

        for row in rows {
            match row.circuit_target {
                CircuitClass::Lower => summary.lower += 1,
                CircuitClass::None => summary.none += 1,
                CircuitClass::Upper => summary.upper += 1,
            }
        }
        summary
    }

    /// Classes with at least one row, ascending.
    pub fn observed_classes(&self) -> Vec<CircuitClass> {
        [
            (CircuitClass::Lower, self.lower),
            (CircuitClass::None, self.none),
            (CircuitClass::Upper, self.upper),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(c, _)| c)
        .collect()
    }
}
