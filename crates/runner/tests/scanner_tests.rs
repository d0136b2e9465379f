use chrono::{NaiveDate, TimeZone, Utc};
use dipwatch_core::common::time::FixedClock;
use dipwatch_core::market::entity::VolatilitySnapshot;
use dipwatch_core::signal::entity::DipThresholds;
use dipwatch_core::test_utils::{RecordingNotifier, StaticMarketData, StaticVolatility};
use dipwatch_runner::retry::RetryPolicy;
use dipwatch_runner::scanner::{DipScanner, ScanSettings};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 15 closes from 100 down to 90 with gains 7.5 / losses 17.5 over 14 deltas: RSI 30.
fn dipping_series() -> Vec<Decimal> {
    vec![
        dec!(100),
        dec!(97.5),
        dec!(95),
        dec!(92.5),
        dec!(90),
        dec!(91.5),
        dec!(93),
        dec!(94.5),
        dec!(96),
        dec!(97.5),
        dec!(95),
        dec!(92.5),
        dec!(90),
        dec!(90),
        dec!(90),
    ]
}

fn quiet_series() -> Vec<Decimal> {
    vec![dec!(100), dec!(99.5), dec!(99)]
}

fn settings(symbols: &[&str]) -> ScanSettings {
    ScanSettings {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        thresholds: DipThresholds::default(),
        throttle: Duration::ZERO,
        retry: RetryPolicy::none(),
    }
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 8, 5, 21, 0, 0).unwrap(),
    ))
}

fn scanner(
    market: Arc<StaticMarketData>,
    notifier: Arc<RecordingNotifier>,
    settings: ScanSettings,
) -> DipScanner {
    DipScanner::new(market, notifier, settings).with_clock(clock())
}

/// # Summary
/// AAA drops 10% with RSI 30 on the short window, BBB only 1%.
///
/// # Logic
/// AAA must be the only dip candidate; BBB only shows up in the drop summaries.
#[tokio::test]
async fn test_end_to_end_two_symbols() {
    let market = Arc::new(
        StaticMarketData::new()
            .with_closes("AAA", 30, dipping_series())
            .with_closes("AAA", 90, dipping_series())
            .with_closes("BBB", 30, quiet_series())
            .with_closes("BBB", 90, quiet_series()),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    let outcome = scanner(market, notifier.clone(), settings(&["AAA", "BBB"]))
        .run(&CancellationToken::new())
        .await;

    assert!(outcome.delivered);
    let report = &outcome.report;
    assert_eq!(report.dip_candidate_symbols(), vec!["AAA"]);
    assert!(report.watchlist_symbols().is_empty());
    assert_eq!(report.drop_summaries().len(), 2);
    assert_eq!(report.drop_summaries()[1], "BBB: 30d 1.00%, 90d 1.00%");

    let sent = notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "ETF dip report 2024-08-05 | dip candidates: AAA");
    assert_eq!(sent[0].1, report.body());
    assert!(sent[0].1.contains("👀 No short-term watch alerts"));
    assert!(sent[0].1.contains("⚠️ VIX data unavailable"));
}

#[tokio::test]
async fn test_both_windows_firing_reports_short_only() {
    // Both windows drop 10%; the long window on its own would be a watch
    let market = Arc::new(
        StaticMarketData::new()
            .with_closes("SMH", 30, vec![dec!(100), dec!(90)])
            .with_closes("SMH", 90, vec![dec!(100), dec!(95), dec!(90)]),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    let report = scanner(market, notifier, settings(&["SMH"]))
        .evaluate_run(&CancellationToken::new())
        .await;

    // Two samples for a 14-period RSI: neutral 50, so a watch rather than a dip
    assert_eq!(report.short_watchlist().len(), 1);
    assert!(report.long_watchlist().is_empty());
    assert!(report.dip_candidates().is_empty());
    assert!(!report.body().contains("LONG-TERM"));
}

#[tokio::test]
async fn test_empty_series_is_skipped_and_run_continues() {
    let market = Arc::new(
        StaticMarketData::new()
            .with_closes("EMPTY", 30, Vec::new())
            .with_closes("SPY", 30, dipping_series())
            .with_closes("SPY", 90, dipping_series()),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    let report = scanner(market.clone(), notifier.clone(), settings(&["EMPTY", "SPY"]))
        .evaluate_run(&CancellationToken::new())
        .await;

    assert_eq!(report.skipped(), &["EMPTY".to_string()]);
    assert_eq!(report.dip_candidate_symbols(), vec!["SPY"]);
    assert_eq!(report.drop_summaries().len(), 1);
    assert!(report.body().contains("EMPTY: Insufficient data (30d window: Insufficient data)"));

    // The long window is not requested once the short one is unusable
    let calls = market.calls().await;
    assert_eq!(
        calls,
        vec![
            ("EMPTY".to_string(), 30),
            ("SPY".to_string(), 30),
            ("SPY".to_string(), 90)
        ]
    );
}

#[tokio::test]
async fn test_transport_error_is_treated_as_missing_data() {
    let market = Arc::new(
        StaticMarketData::new()
            .with_closes("VOO", 30, quiet_series())
            .with_failure("VOO", 90, "timed out")
            .with_closes("VTI", 30, quiet_series())
            .with_closes("VTI", 90, quiet_series()),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    let outcome = scanner(market, notifier.clone(), settings(&["VOO", "VTI"]))
        .run(&CancellationToken::new())
        .await;

    assert_eq!(outcome.report.skipped(), &["VOO".to_string()]);
    assert!(
        outcome
            .report
            .body()
            .contains("VOO: Insufficient data (90d window: Network error: timed out)")
    );
    assert!(outcome.report.drop_summaries()[0].starts_with("VTI:"));
    assert_eq!(notifier.sent().await.len(), 1);
}

#[tokio::test]
async fn test_non_positive_price_skips_symbol() {
    let market = Arc::new(
        StaticMarketData::new()
            .with_closes("BAD", 30, vec![dec!(10), dec!(0)])
            .with_closes("BAD", 90, vec![dec!(10)]),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    let report = scanner(market, notifier, settings(&["BAD"]))
        .evaluate_run(&CancellationToken::new())
        .await;

    assert_eq!(report.skipped(), &["BAD".to_string()]);
    assert!(report.body().contains("📊 No drop data"));
}

#[tokio::test(start_paused = true)]
async fn test_transient_fetch_failures_are_retried() {
    let market = Arc::new(
        StaticMarketData::new()
            .with_flaky("SPY", 30, 2, dipping_series())
            .with_closes("SPY", 90, dipping_series()),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let mut settings = settings(&["SPY"]);
    settings.retry = RetryPolicy {
        max_attempts: 3,
        min_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(1),
    };

    let report = scanner(market.clone(), notifier, settings)
        .evaluate_run(&CancellationToken::new())
        .await;

    assert_eq!(report.dip_candidate_symbols(), vec!["SPY"]);
    assert_eq!(market.calls().await.len(), 4);
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_run() {
    let market = Arc::new(
        StaticMarketData::new()
            .with_closes("SPY", 30, quiet_series())
            .with_closes("SPY", 90, quiet_series()),
    );
    let notifier = Arc::new(RecordingNotifier::rejecting());
    let mut settings = settings(&["SPY"]);
    settings.retry = RetryPolicy {
        max_attempts: 3,
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    };

    let outcome = scanner(market, notifier.clone(), settings)
        .run(&CancellationToken::new())
        .await;

    assert!(!outcome.delivered);
    assert_eq!(outcome.report.drop_summaries().len(), 1);
    // Platform errors are not retried
    assert_eq!(notifier.attempts().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_notifier_network_errors_are_retried() {
    let market = Arc::new(StaticMarketData::new());
    let notifier = Arc::new(RecordingNotifier::flaky(2));
    let mut settings = settings(&["SPY"]);
    settings.retry = RetryPolicy {
        max_attempts: 3,
        min_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(1),
    };

    let outcome = scanner(market, notifier.clone(), settings)
        .run(&CancellationToken::new())
        .await;

    assert!(outcome.delivered);
    assert_eq!(notifier.attempts().await, 3);
    assert_eq!(notifier.sent().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_throttle_between_symbols_only() {
    let market = Arc::new(StaticMarketData::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut settings = settings(&["SPY", "VOO", "VTI"]);
    settings.throttle = Duration::from_secs(15);

    let started = tokio::time::Instant::now();
    let report = scanner(market.clone(), notifier, settings)
        .evaluate_run(&CancellationToken::new())
        .await;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(30));
    assert!(elapsed < Duration::from_secs(31));
    assert_eq!(report.skipped().len(), 3);
    assert_eq!(market.calls().await.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_sends_partial_report() {
    let market = Arc::new(
        StaticMarketData::new()
            .with_closes("SPY", 30, quiet_series())
            .with_closes("SPY", 90, quiet_series())
            .with_closes("VOO", 30, quiet_series())
            .with_closes("VOO", 90, quiet_series()),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let mut settings = settings(&["SPY", "VOO", "VTI", "SMH"]);
    settings.throttle = Duration::from_secs(15);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(20)).await;
        trigger.cancel();
    });

    let outcome = scanner(market.clone(), notifier.clone(), settings)
        .run(&cancel)
        .await;

    assert!(outcome.report.is_partial());
    assert_eq!(
        outcome.report.unprocessed(),
        &["VTI".to_string(), "SMH".to_string()]
    );
    assert_eq!(outcome.report.drop_summaries().len(), 2);
    assert!(
        outcome
            .report
            .body()
            .contains("⏹ Run interrupted, not evaluated: VTI, SMH")
    );
    assert_eq!(notifier.sent().await.len(), 1);
    assert!(market.calls().await.iter().all(|(s, _)| s != "VTI"));
}

#[tokio::test]
async fn test_cancelled_before_start_evaluates_nothing() {
    let market = Arc::new(StaticMarketData::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = scanner(market.clone(), notifier.clone(), settings(&["SPY", "VOO"]))
        .run(&cancel)
        .await;

    assert_eq!(outcome.report.unprocessed().len(), 2);
    assert!(market.calls().await.is_empty());
    assert_eq!(notifier.sent().await.len(), 1);
}

#[tokio::test]
async fn test_volatility_snapshot_in_report() {
    let snapshot = VolatilitySnapshot {
        value: dec!(16.2),
        as_of: NaiveDate::from_ymd_opt(2024, 8, 2).unwrap(),
        change: Some(dec!(2.25)),
    };
    let market = Arc::new(StaticMarketData::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let report = scanner(market.clone(), notifier.clone(), settings(&["SPY"]))
        .with_volatility(Arc::new(StaticVolatility::new(Some(snapshot))))
        .evaluate_run(&CancellationToken::new())
        .await;
    assert_eq!(
        report.volatility_line(),
        "📈 VIX as of 2024-08-02: 16.20 (Stable), VIX rising, 7-day change: +2.25"
    );

    let report = scanner(market, notifier, settings(&["SPY"]))
        .with_volatility(Arc::new(StaticVolatility::failing()))
        .evaluate_run(&CancellationToken::new())
        .await;
    assert_eq!(report.volatility_line(), "⚠️ VIX data unavailable");
}
