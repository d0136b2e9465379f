use crate::market::entity::VolatilitySnapshot;
use crate::market::error::MarketError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// # Summary
/// Source of daily closing prices.
///
/// # Invariants
/// - Results are ordered oldest first.
/// - "No data" is `Ok(vec![])`, never an error; errors mean the request itself failed.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// Fetches up to `window_days` daily closes for `symbol`.
    ///
    /// # Arguments
    /// * `symbol`: ticker, e.g. `SPY`.
    /// * `window_days`: number of daily samples requested.
    ///
    /// # Returns
    /// Closing prices oldest first, possibly empty, or `MarketError` on transport/upstream failure.
    async fn get_closes(&self, symbol: &str, window_days: usize)
    -> Result<Vec<Decimal>, MarketError>;
}

/// # Summary
/// Source of the latest volatility index reading.
///
/// # Invariants
/// - `Ok(None)` means the provider answered without a usable observation.
#[async_trait]
pub trait VolatilityProvider: Send + Sync {
    /// # Summary
    /// Fetches the most recent volatility snapshot.
    ///
    /// # Returns
    /// The snapshot, `None` when unavailable, or `MarketError` on failure.
    async fn latest_volatility(&self) -> Result<Option<VolatilitySnapshot>, MarketError>;
}
