//! In-memory collaborators for tests of the scan loop and the binary wiring.

use crate::market::entity::VolatilitySnapshot;
use crate::market::error::MarketError;
use crate::market::port::{MarketDataProvider, VolatilityProvider};
use crate::notify::error::NotifyError;
use crate::notify::port::Notifier;
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

/// Scripted answer for one `(symbol, window_days)` request.
#[derive(Debug, Clone)]
enum Scripted {
    Closes(Vec<Decimal>),
    /// Network error with this message
    Failure(String),
    /// Fails with a network error `remaining` more times, then answers
    Flaky { remaining: usize, closes: Vec<Decimal> },
}

/// # Summary
/// Market data provider answering from a table keyed by `(symbol, window_days)`.
///
/// # Invariants
/// - Unknown keys answer `Ok(vec![])`, the provider's "no data" signal.
/// - Every call is recorded in order.
#[derive(Default)]
pub struct StaticMarketData {
    script: DashMap<(String, usize), Scripted>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(self, symbol: &str, window_days: usize, closes: Vec<Decimal>) -> Self {
        self.script
            .insert((symbol.to_string(), window_days), Scripted::Closes(closes));
        self
    }

    pub fn with_failure(self, symbol: &str, window_days: usize, message: &str) -> Self {
        self.script.insert(
            (symbol.to_string(), window_days),
            Scripted::Failure(message.to_string()),
        );
        self
    }

    pub fn with_flaky(
        self,
        symbol: &str,
        window_days: usize,
        failures: usize,
        closes: Vec<Decimal>,
    ) -> Self {
        self.script.insert(
            (symbol.to_string(), window_days),
            Scripted::Flaky {
                remaining: failures,
                closes,
            },
        );
        self
    }

    /// Requests received so far, in order.
    pub async fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn get_closes(
        &self,
        symbol: &str,
        window_days: usize,
    ) -> Result<Vec<Decimal>, MarketError> {
        self.calls
            .lock()
            .await
            .push((symbol.to_string(), window_days));

        let Some(mut entry) = self.script.get_mut(&(symbol.to_string(), window_days)) else {
            return Ok(Vec::new());
        };

        match entry.value_mut() {
            Scripted::Closes(closes) => Ok(closes.clone()),
            Scripted::Failure(message) => Err(MarketError::Network(message.clone())),
            Scripted::Flaky { remaining, closes } => {
                if *remaining > 0 {
                    *remaining -= 1;
                    Err(MarketError::Network("connection reset".to_string()))
                } else {
                    Ok(closes.clone())
                }
            }
        }
    }
}

/// # Summary
/// Volatility provider returning a fixed snapshot, or failing.
pub struct StaticVolatility {
    snapshot: Option<VolatilitySnapshot>,
    fail: bool,
}

impl StaticVolatility {
    pub fn new(snapshot: Option<VolatilitySnapshot>) -> Self {
        Self {
            snapshot,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            snapshot: None,
            fail: true,
        }
    }
}

#[async_trait]
impl VolatilityProvider for StaticVolatility {
    async fn latest_volatility(&self) -> Result<Option<VolatilitySnapshot>, MarketError> {
        if self.fail {
            return Err(MarketError::Upstream("volatility feed offline".to_string()));
        }
        Ok(self.snapshot.clone())
    }
}

/// # Summary
/// Notifier that records every message, optionally failing a number of times first.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    attempts: Mutex<usize>,
    failures: usize,
    permanent_failure: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with a network error on the first `failures` attempts.
    pub fn flaky(failures: usize) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }

    /// Rejects every message with a platform error.
    pub fn rejecting() -> Self {
        Self {
            permanent_failure: true,
            ..Self::default()
        }
    }

    /// Delivered `(subject, content)` pairs.
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    /// Number of `notify` calls, successful or not.
    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let attempt = {
            let mut attempts = self.attempts.lock().await;
            *attempts += 1;
            *attempts
        };

        if self.permanent_failure {
            return Err(NotifyError::Platform("mailbox unavailable".to_string()));
        }
        if attempt <= self.failures {
            return Err(NotifyError::Network("connection refused".to_string()));
        }

        self.sent
            .lock()
            .await
            .push((subject.to_string(), content.to_string()));
        Ok(())
    }
}
