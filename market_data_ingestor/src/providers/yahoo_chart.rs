//! Yahoo Finance chart endpoint (`/v8/finance/chart/{symbol}`).
//!
//! No credentials are needed. NSE symbols carry the `.NS` suffix
//! (`RELIANCE.NS`), BSE symbols `.BO`.

pub mod params;
pub mod provider;
pub mod response;

pub use params::YahooChartParams;
pub use provider::{YahooOptions, YahooProvider};
