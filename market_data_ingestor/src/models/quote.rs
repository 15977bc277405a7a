use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most recent traded price for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    /// Timestamp of the bar the price was taken from.
    pub as_of: DateTime<Utc>,
}
