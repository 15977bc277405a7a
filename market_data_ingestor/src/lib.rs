//! Vendor-agnostic market data models and providers.
//!
//! Bars come back as [`models::bar::BarSeries`] regardless of which
//! [`providers::DataProvider`] produced them.

#[cfg(feature = "cli")]
pub mod cli;
pub mod models;
pub mod providers;
