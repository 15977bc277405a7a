//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching time-series bar data from any market data vendor (e.g., Yahoo Finance).
//!
//! Each concrete provider implementation should implement [`DataProvider`] to handle
//! vendor-specific API logic and validation.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     bar::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<BarSeries>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```
//!

pub mod yahoo_chart;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{
    bar::BarSeries,
    quote::Quote,
    request_params::BarsRequestParams,
    timeframe::{TimeFrame, TimeFrameUnit},
};

/// Trait for fetching time-series bar data from a market data provider.
///
/// Implement this trait for each concrete data vendor.
/// The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
/// for runtime selection of providers.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches time-series bar data for the given request parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameters specifying symbols, timeframe, and history span.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BarSeries>)` - A vector of bar series, one per symbol. A symbol the
    ///   vendor has no data for comes back as an empty series rather than an error.
    /// * `Err(ProviderError)` - If the request fails.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError>;

    /// Latest traded price for `symbol`.
    ///
    /// The default implementation takes the close of the last one-minute bar of the
    /// current session. Returns `Ok(None)` when the vendor has nothing for today.
    async fn fetch_latest_quote(&self, symbol: &str) -> Result<Option<Quote>, ProviderError> {
        let one_minute = TimeFrame {
            amount: 1,
            unit: TimeFrameUnit::Minute,
        };
        let series = self
            .fetch_bars(BarsRequestParams::trailing(symbol, one_minute, 1))
            .await?;

        Ok(series
            .into_iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
            .and_then(|s| s.bars.into_iter().rev().find(|b| b.close.is_finite()))
            .map(|bar| Quote {
                symbol: symbol.to_string(),
                price: bar.close,
                as_of: bar.timestamp,
            }))
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// A default header value contains invalid characters.
    #[snafu(display("Invalid header value: {source}"))]
    InvalidHeader {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message.
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The response body could not be decoded.
    #[snafu(display("Malformed response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::models::bar::Bar;

    use super::*;

    struct CannedProvider {
        bars: Vec<Bar>,
    }

    #[async_trait]
    impl DataProvider for CannedProvider {
        async fn fetch_bars(
            &self,
            params: BarsRequestParams,
        ) -> Result<Vec<BarSeries>, ProviderError> {
            Ok(params
                .symbols
                .into_iter()
                .map(|symbol| BarSeries {
                    symbol,
                    timeframe: params.timeframe,
                    timezone: chrono_tz::UTC,
                    bars: self.bars.clone(),
                })
                .collect())
        }
    }

    // This function decides AT RUNTIME which provider to give back.
    fn get_provider(bars: Vec<Bar>) -> Box<dyn DataProvider> {
        Box::new(CannedProvider { bars })
    }

    #[tokio::test]
    async fn default_quote_uses_last_finite_close() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 6, 4, 0, 0).unwrap();
        let last = Bar::new(t0 + chrono::Duration::minutes(2), 1.0, 1.0, 1.0, f64::NAN, 5.0);
        let provider = get_provider(vec![
            Bar::new(t0, 100.0, 101.0, 99.0, 100.5, 10.0),
            Bar::new(t0 + chrono::Duration::minutes(1), 100.5, 102.0, 100.0, 101.25, 12.0),
            last,
        ]);

        let quote = provider.fetch_latest_quote("ABC").await.unwrap().unwrap();
        assert_eq!(quote.symbol, "ABC");
        assert_eq!(quote.price, 101.25);
        assert_eq!(quote.as_of, t0 + chrono::Duration::minutes(1));
    }

    #[tokio::test]
    async fn default_quote_is_none_without_bars() {
        let provider = get_provider(vec![]);
        let quote = provider.fetch_latest_quote("ABC").await.unwrap();
        assert!(quote.is_none());
    }
}
