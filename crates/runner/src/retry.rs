use backon::{ExponentialBuilder, Retryable};
use dipwatch_core::config::RetryConfig;
use dipwatch_core::market::error::MarketError;
use dipwatch_core::market::port::MarketDataProvider;
use dipwatch_core::notify::error::NotifyError;
use dipwatch_core::notify::port::Notifier;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::warn;

/// # Summary
/// Bounded exponential backoff applied at the provider and notifier boundaries.
///
/// # Invariants
/// - `max_attempts` counts the first call; 1 means no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay.max(self.min_delay))
            .with_max_times(self.max_attempts.saturating_sub(1))
            .with_jitter()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

/// # Summary
/// Fetches closes, retrying transport and upstream failures.
///
/// # Logic
/// Data problems (`InsufficientData`, `InvalidData`, `Parse`) are returned at once.
pub async fn fetch_closes(
    market: &dyn MarketDataProvider,
    symbol: &str,
    window_days: usize,
    policy: &RetryPolicy,
) -> Result<Vec<Decimal>, MarketError> {
    (|| async move { market.get_closes(symbol, window_days).await })
        .retry(policy.backoff())
        .when(MarketError::is_transient)
        .notify(|err: &MarketError, after: Duration| {
            warn!(symbol, window_days, error = %err, ?after, "Price fetch failed, retrying");
        })
        .await
}

/// # Summary
/// Sends one notification, retrying network failures only.
pub async fn notify(
    notifier: &dyn Notifier,
    subject: &str,
    content: &str,
    policy: &RetryPolicy,
) -> Result<(), NotifyError> {
    (|| async move { notifier.notify(subject, content).await })
        .retry(policy.backoff())
        .when(NotifyError::is_transient)
        .notify(|err: &NotifyError, after: Duration| {
            warn!(error = %err, ?after, "Notification failed, retrying");
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config_never_drops_below_one_attempt() {
        let config = RetryConfig {
            max_attempts: 0,
            min_delay_ms: 250,
            max_delay_ms: 1_000,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.min_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_default_policy_matches_config_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.min_delay, Duration::from_millis(500));
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
