use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeFrameError {
    #[error("Invalid amount for {:?}: {}", unit, message)]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {}", message)]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        Self::validate(amount, unit)?;
        Ok(Self { amount, unit })
    }

    pub fn minutes(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Minute)
    }

    pub fn hours(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Hour)
    }

    pub fn day() -> Self {
        Self {
            amount: 1,
            unit: TimeFrameUnit::Day,
        }
    }

    fn validate(amount: u32, unit: TimeFrameUnit) -> Result<(), TimeFrameError> {
        match unit {
            TimeFrameUnit::Minute if !(1..=59).contains(&amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Minute units can only be used with amounts between 1-59.".into(),
                })
            }
            TimeFrameUnit::Hour if !(1..=23).contains(&amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Hour units can only be used with amounts 1-23".into(),
                })
            }
            TimeFrameUnit::Day | TimeFrameUnit::Week if amount != 1 => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Day and Week units can only be used with amount 1".into(),
                })
            }
            TimeFrameUnit::Month if ![1, 2, 3, 6, 12].contains(&amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Month units can only be used with amount 1, 2, 3, 6 and 12".into(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Compact form used in logs and CLI output (`5m`, `1h`, `1D`).
impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = match self.unit {
            TimeFrameUnit::Minute => "m",
            TimeFrameUnit::Hour => "h",
            TimeFrameUnit::Day => "D",
            TimeFrameUnit::Week => "W",
            TimeFrameUnit::Month => "M",
        };
        write!(f, "{}{}", self.amount, u)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    mod timeframe_creation_tests {
        use super::*;

        #[test]
        fn test_valid_minute_timeframe() {
            let tf = TimeFrame::new(5, TimeFrameUnit::Minute);
            assert!(tf.is_ok());
            let tf = tf.unwrap();
            assert_eq!(tf.amount, 5);
            assert!(matches!(tf.unit, TimeFrameUnit::Minute));
        }

        #[test]
        fn test_valid_hour_timeframe() {
            let tf = TimeFrame::hours(6).unwrap();
            assert_eq!(tf.amount, 6);
            assert!(matches!(tf.unit, TimeFrameUnit::Hour));
        }

        #[test]
        fn test_valid_month_timeframes() {
            for amount in [1, 2, 3, 6, 12] {
                let tf = TimeFrame::new(amount, TimeFrameUnit::Month);
                assert!(tf.is_ok(), "Month with amount {} should be valid", amount);
            }
        }

        #[test]
        fn test_invalid_minute_timeframe() {
            assert!(TimeFrame::minutes(0).is_err());
            assert!(TimeFrame::minutes(60).is_err());
        }

        #[test]
        fn test_invalid_day_and_week_timeframe() {
            assert!(TimeFrame::new(2, TimeFrameUnit::Day).is_err());
            assert!(TimeFrame::new(2, TimeFrameUnit::Week).is_err());
        }

        #[test]
        fn test_error_messages() {
            match TimeFrame::new(60, TimeFrameUnit::Minute) {
                Err(TimeFrameError::InvalidAmount { unit, message }) => {
                    assert!(matches!(unit, TimeFrameUnit::Minute));
                    assert!(message.contains("Minute units"));
                }
                _ => panic!("Expected InvalidAmount error"),
            }
        }

        #[test]
        fn test_display() {
            assert_eq!(TimeFrame::minutes(5).unwrap().to_string(), "5m");
            assert_eq!(TimeFrame::day().to_string(), "1D");
        }
    }
}
