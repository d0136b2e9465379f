//! HTTP adapters for the market data ports.

pub mod fred;
pub mod twelve_data;

use dipwatch_core::market::error::MarketError;
use reqwest::Client;
use std::time::Duration;

// Per-request ceiling; the scanner's retry policy handles the rest
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// # Summary
/// Builds the shared reqwest client used by both providers.
///
/// # Logic
/// 1. Installs the rustls crypto provider (reqwest is built without one).
/// 2. Applies the request timeout and a descriptive User-Agent.
pub(crate) fn http_client() -> Result<Client, MarketError> {
    dipwatch_core::tls::install_crypto_provider();
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("dipwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| MarketError::Network(format!("Failed to build HTTP client: {}", e)))
}
