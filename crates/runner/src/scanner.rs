use crate::retry::{self, RetryPolicy};
use dipwatch_core::common::Window;
use dipwatch_core::common::time::{SystemClock, TimeProvider};
use dipwatch_core::config::AppConfig;
use dipwatch_core::market::entity::{PriceSeries, VolatilitySnapshot};
use dipwatch_core::market::error::MarketError;
use dipwatch_core::market::port::{MarketDataProvider, VolatilityProvider};
use dipwatch_core::notify::port::Notifier;
use dipwatch_core::signal::entity::DipThresholds;
use dipwatch_signal::assess::{SymbolAssessment, SymbolOutcome};
use dipwatch_signal::format::fixed;
use dipwatch_signal::report::{ReportBuilder, RunReport};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// # Summary
/// Settings of one scan, resolved from configuration.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Processed strictly in this order
    pub symbols: Vec<String>,
    pub thresholds: DipThresholds,
    /// Pause between two symbols
    pub throttle: Duration,
    pub retry: RetryPolicy,
}

impl ScanSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            symbols: config.symbols(),
            thresholds: config.thresholds,
            throttle: Duration::from_secs(config.scan.throttle_secs),
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

/// Why one window of a symbol could not be evaluated.
#[derive(Error, Debug)]
#[error("{window} window: {source}")]
pub struct WindowFetchError {
    pub window: Window,
    #[source]
    pub source: MarketError,
}

/// # Summary
/// Result of [`DipScanner::run`].
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    /// Whether the notifier accepted the report
    pub delivered: bool,
}

/// # Summary
/// Runs one dip scan over the configured symbols.
///
/// # Invariants
/// - Symbols are processed one at a time in configured order, never concurrently.
/// - The throttle is awaited between two symbols, not before the first.
/// - No per-symbol failure stops the loop; only cancellation does.
/// - The notifier is called once per run, after the loop.
pub struct DipScanner {
    market: Arc<dyn MarketDataProvider>,
    volatility: Option<Arc<dyn VolatilityProvider>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn TimeProvider>,
    settings: ScanSettings,
}

impl DipScanner {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            market,
            volatility: None,
            notifier,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_volatility(mut self, volatility: Arc<dyn VolatilityProvider>) -> Self {
        self.volatility = Some(volatility);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    /// # Summary
    /// Evaluates every symbol and delivers the report.
    ///
    /// # Logic
    /// 1. [`DipScanner::evaluate_run`].
    /// 2. One notification with the report subject and body; failure is logged only.
    pub async fn run(&self, cancel: &CancellationToken) -> RunOutcome {
        let report = self.evaluate_run(cancel).await;
        let delivered = self.deliver(&report).await;
        RunOutcome { report, delivered }
    }

    /// # Summary
    /// Builds the run report without delivering it.
    ///
    /// # Logic
    /// 1. Fetches the volatility snapshot; absence is tolerated.
    /// 2. For each symbol: throttle (after the first), fetch Short then Long, assess.
    /// 3. A cancelled token stops new symbols from starting; those left are listed
    ///    in the report as not evaluated.
    pub async fn evaluate_run(&self, cancel: &CancellationToken) -> RunReport {
        let snapshot = self.fetch_volatility().await;
        let mut builder = ReportBuilder::new(snapshot.as_ref());
        let symbols = &self.settings.symbols;

        info!(symbols = symbols.len(), "Starting dip scan");

        for (index, symbol) in symbols.iter().enumerate() {
            let proceed = if index == 0 {
                !cancel.is_cancelled()
            } else {
                self.throttle(cancel).await
            };
            if !proceed {
                let remaining = symbols[index..].to_vec();
                warn!(remaining = remaining.len(), "Scan cancelled, sending partial report");
                builder = builder.interrupted(remaining);
                break;
            }

            builder = builder.push(self.assess_symbol(symbol).await);
        }

        let report = builder.finish(self.clock.today());
        info!(
            dip_candidates = report.dip_candidates().len(),
            short_watch = report.short_watchlist().len(),
            long_watch = report.long_watchlist().len(),
            skipped = report.skipped().len(),
            "Dip scan finished"
        );
        report
    }

    async fn fetch_volatility(&self) -> Option<VolatilitySnapshot> {
        let provider = self.volatility.as_ref()?;
        match provider.latest_volatility().await {
            Ok(Some(snapshot)) => {
                info!(vix = %snapshot.value, as_of = %snapshot.as_of, "Volatility snapshot");
                Some(snapshot)
            }
            Ok(None) => {
                warn!("Volatility provider returned no observation");
                None
            }
            Err(e) => {
                warn!(error = %e, "Volatility snapshot unavailable");
                None
            }
        }
    }

    /// Waits out the inter-symbol delay; `false` when cancelled first.
    async fn throttle(&self, cancel: &CancellationToken) -> bool {
        if self.settings.throttle.is_zero() {
            return !cancel.is_cancelled();
        }
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.settings.throttle) => true,
        }
    }

    async fn assess_symbol(&self, symbol: &str) -> SymbolOutcome {
        match self.load_windows(symbol).await {
            Ok((short, long)) => {
                let assessment =
                    SymbolAssessment::new(symbol, &short, &long, &self.settings.thresholds);
                info!(
                    symbol,
                    latest = %assessment.short.latest,
                    drop30 = %fixed(assessment.short.drop_percent, 2),
                    rsi14 = %fixed(assessment.short.indicator, 1),
                    drop90 = %fixed(assessment.long.drop_percent, 2),
                    rsi60 = %fixed(assessment.long.indicator, 1),
                    alert = ?assessment.alert().map(|e| (e.window, e.classification)),
                    "Symbol evaluated"
                );
                SymbolOutcome::Assessed(assessment)
            }
            Err(e) => {
                warn!(symbol, error = %e, "Insufficient data, skipping symbol");
                SymbolOutcome::Skipped {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn load_windows(
        &self,
        symbol: &str,
    ) -> Result<(PriceSeries, PriceSeries), WindowFetchError> {
        let short = self.fetch_series(symbol, Window::Short).await?;
        let long = self.fetch_series(symbol, Window::Long).await?;
        Ok((short, long))
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        window: Window,
    ) -> Result<PriceSeries, WindowFetchError> {
        retry::fetch_closes(
            self.market.as_ref(),
            symbol,
            window.lookback_days(),
            &self.settings.retry,
        )
        .await
        .and_then(PriceSeries::new)
        .map_err(|source| WindowFetchError { window, source })
    }

    async fn deliver(&self, report: &RunReport) -> bool {
        let subject = report.subject();
        match retry::notify(
            self.notifier.as_ref(),
            &subject,
            report.body(),
            &self.settings.retry,
        )
        .await
        {
            Ok(()) => {
                info!(subject = %subject, "Report delivered");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to deliver report");
                false
            }
        }
    }
}
