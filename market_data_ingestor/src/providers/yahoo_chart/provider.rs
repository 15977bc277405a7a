use std::{num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, StatusCode, Url, header};
use shared_utils::env::get_env_var_opt;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{bar::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidHeaderSnafu, ProviderError,
        ProviderInitError, ReqwestSnafu, ValidationSnafu,
        yahoo_chart::{params::construct_params, response::parse_chart_body},
    },
};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Overrides [`BASE_URL`], e.g. to point at a recorded-response server.
const BASE_URL_ENV: &str = "YAHOO_CHART_BASE_URL";

/// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) market_data_ingestor";

/// Client-side knobs for [`YahooProvider`].
#[derive(Debug, Clone)]
pub struct YahooOptions {
    pub request_timeout: Duration,
    /// Upper bound on chart requests per second across all callers of one provider.
    pub requests_per_second: NonZeroU32,
}

impl Default for YahooOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
            requests_per_second: nonzero!(4u32),
        }
    }
}

pub struct YahooProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl YahooProvider {
    /// Creates a provider with default options.
    ///
    /// Honours `YAHOO_CHART_BASE_URL` when it is set.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_options(YahooOptions::default())
    }

    pub fn with_options(options: YahooOptions) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(USER_AGENT).context(InvalidHeaderSnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.request_timeout)
            .build()
            .context(ClientBuildSnafu)?;

        let base_url = get_env_var_opt(BASE_URL_ENV).unwrap_or_else(|| BASE_URL.to_string());

        Ok(Self {
            client,
            base_url,
            limiter: RateLimiter::direct(Quota::per_second(options.requests_per_second)),
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let invalid = || ValidationSnafu {
            message: format!("cannot build chart URL for {symbol:?} from {}", self.base_url),
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid().build())?;
        url.path_segments_mut()
            .map_err(|_| invalid().build())?
            .pop_if_empty()
            .push(symbol);
        Ok(url)
    }

    async fn fetch_one(
        &self,
        symbol: &str,
        params: &BarsRequestParams,
        query: &[(String, String)],
    ) -> Result<BarSeries, ProviderError> {
        self.limiter.until_ready().await;

        let url = self.chart_url(symbol)?;
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;

        // 404 still carries a chart envelope with the "Not Found" code.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return ApiSnafu {
                message: format!("{status} for {symbol}: {}", truncate(&body, 200)),
            }
            .fail();
        }

        let series = parse_chart_body(symbol, params.timeframe, &body)?;
        debug!(symbol, bars = series.len(), timeframe = %params.timeframe, "fetched chart");
        Ok(series)
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        // Validate the interval and span once before touching the network.
        let query = construct_params(&params)?;

        let mut result = Vec::with_capacity(params.symbols.len());
        for symbol in &params.symbols {
            result.push(self.fetch_one(symbol, &params, &query).await?);
        }
        Ok(result)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_url_appends_symbol_segment() {
        let provider = YahooProvider::new().unwrap();
        let url = provider.chart_url("RELIANCE.NS").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/RELIANCE.NS");

        // a slash in the symbol must not create a new path segment
        let url = provider.chart_url("A/B").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/A%2FB");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
