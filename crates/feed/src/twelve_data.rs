use crate::http_client;
use async_trait::async_trait;
use dipwatch_core::market::error::MarketError;
use dipwatch_core::market::port::MarketDataProvider;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";

/// # Summary
/// Daily closing prices from the Twelve Data `time_series` endpoint.
///
/// # Invariants
/// - One request per call; retries belong to the caller.
/// - The API key is sent as a query parameter and never logged.
#[derive(Clone)]
pub struct TwelveDataProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TwelveDataProvider {
    /// # Summary
    /// Creates a provider against the public Twelve Data API.
    ///
    /// # Arguments
    /// * `api_key`: Twelve Data API key.
    ///
    /// # Returns
    /// The provider, or `MarketError::Network` if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, MarketError> {
        Ok(Self {
            client: http_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Points the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Body of a `time_series` answer. Errors arrive with HTTP 200 and `status = "error"`.
#[derive(Deserialize, Debug)]
struct TimeSeriesResponse {
    status: Option<String>,
    code: Option<u16>,
    message: Option<String>,
    /// Newest first
    #[serde(default)]
    values: Vec<TimeSeriesValue>,
}

#[derive(Deserialize, Debug)]
struct TimeSeriesValue {
    datetime: String,
    close: String,
}

#[async_trait]
impl MarketDataProvider for TwelveDataProvider {
    /// # Summary
    /// Fetches `window_days` daily closes for `symbol`.
    ///
    /// # Logic
    /// 1. `GET /time_series` with `interval=1day` and `outputsize=window_days`.
    /// 2. Non-2xx status is a network failure.
    /// 3. An error body with code 400 or 404 (unknown symbol, no data) is an empty
    ///    series; any other code (rate limit, bad key) is an upstream failure.
    /// 4. Closes are parsed as decimals and reversed to oldest first.
    async fn get_closes(
        &self,
        symbol: &str,
        window_days: usize,
    ) -> Result<Vec<Decimal>, MarketError> {
        let url = format!("{}/time_series", self.base_url);
        let outputsize = window_days.to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", "1day"),
                ("outputsize", outputsize.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let body: TimeSeriesResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.without_url().to_string()))?;

        if body.status.as_deref() == Some("error") {
            let message = body.message.unwrap_or_default();
            return match body.code {
                Some(400) | Some(404) => {
                    debug!(symbol, message = %message, "No time series available");
                    Ok(Vec::new())
                }
                code => Err(MarketError::Upstream(format!(
                    "code {}: {}",
                    code.map_or_else(|| "?".to_string(), |c| c.to_string()),
                    message
                ))),
            };
        }

        let mut closes = body
            .values
            .iter()
            .map(|v| {
                v.close.trim().parse::<Decimal>().map_err(|e| {
                    MarketError::Parse(format!("close {:?} on {}: {}", v.close, v.datetime, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        closes.reverse();

        debug!(symbol, window_days, samples = closes.len(), "Fetched closes");
        Ok(closes)
    }
}
