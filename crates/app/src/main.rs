mod settings;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use dipwatch_core::config::{AppConfig, EmailConfig, ProviderKeys};
use dipwatch_core::notify::port::Notifier;
use dipwatch_core::tls::install_crypto_provider;
use dipwatch_feed::fred::FredVixProvider;
use dipwatch_feed::twelve_data::TwelveDataProvider;
use dipwatch_notify::console::ConsoleNotifier;
use dipwatch_notify::email::EmailNotifier;
use dipwatch_runner::scanner::{DipScanner, ScanSettings};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// # Summary
/// Binary entry point: one scan per invocation.
///
/// # Logic
/// 1. Loads `.env`, then the layered configuration.
/// 2. Initialises logging.
/// 3. Checks both provider keys before any network traffic; a missing key exits non-zero.
/// 4. Wires the providers, the notifier and the cancellation watcher into the scanner.
/// 5. Runs the scan. Delivery failure is logged but does not change the exit code.
#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    let config = match settings::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("dipwatch: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match telemetry::init(&config.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("dipwatch: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = dotenv {
        debug!(error = %e, "No .env file loaded");
    }

    let keys = match config.validate() {
        Ok(keys) => keys,
        Err(e) => {
            error!(error = %e, "Startup check failed");
            eprintln!("dipwatch: {}", e);
            return ExitCode::FAILURE;
        }
    };

    install_crypto_provider();

    match run(&config, keys).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Scan could not start");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig, keys: ProviderKeys) -> Result<(), Box<dyn std::error::Error>> {
    let market = Arc::new(TwelveDataProvider::new(keys.twelve_data)?);
    let volatility = Arc::new(FredVixProvider::new(keys.fred)?);
    let notifier = build_notifier(&config.email);

    let scanner = DipScanner::new(market, notifier, ScanSettings::from_config(config))
        .with_volatility(volatility);

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(watch_for_cancel(
        cancel.clone(),
        config.scan.run_timeout_secs.map(Duration::from_secs),
    ));

    let outcome = scanner.run(&cancel).await;

    // Stops the watcher if nothing fired
    cancel.cancel();
    if let Err(e) = watcher.await {
        warn!(error = %e, "Cancellation watcher failed");
    }

    info!(
        dip_candidates = ?outcome.report.dip_candidate_symbols(),
        watchlist = ?outcome.report.watchlist_symbols(),
        partial = outcome.report.is_partial(),
        delivered = outcome.delivered,
        "Run complete"
    );
    Ok(())
}

/// # Summary
/// Picks the delivery channel.
///
/// # Logic
/// Email when the SMTP settings are complete and valid, otherwise the report is
/// printed to stdout with a warning naming what is missing.
fn build_notifier(email: &EmailConfig) -> Arc<dyn Notifier> {
    let Some(smtp) = email.smtp() else {
        warn!(
            missing = ?email.missing_fields(),
            "Email settings incomplete, printing report to console"
        );
        return Arc::new(ConsoleNotifier::stdout());
    };

    match EmailNotifier::new(&smtp) {
        Ok(notifier) => {
            info!(host = %smtp.host, port = smtp.port, "Email delivery enabled");
            Arc::new(notifier)
        }
        Err(e) => {
            warn!(error = %e, "Invalid email settings, printing report to console");
            Arc::new(ConsoleNotifier::stdout())
        }
    }
}

/// # Summary
/// Cancels the scan on Ctrl-C or once the optional run timeout elapses.
///
/// # Logic
/// Returns without cancelling when the scan finishes first (the token is
/// cancelled by the caller in that case).
async fn watch_for_cancel(cancel: CancellationToken, timeout: Option<Duration>) {
    let deadline = async {
        match timeout {
            Some(t) => tokio::time::sleep(t).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => {}
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => warn!("Interrupt received, stopping after the current symbol"),
                Err(e) => {
                    warn!(error = %e, "Cannot listen for Ctrl-C");
                    return;
                }
            }
            cancel.cancel();
        }
        _ = deadline => {
            warn!(timeout = ?timeout, "Run timeout reached, stopping after the current symbol");
            cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_cancels_token() {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(watch_for_cancel(cancel.clone(), Some(Duration::from_secs(60))));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(cancel.is_cancelled());
        watcher.await.unwrap();
    }

    #[tokio::test]
    async fn test_watcher_exits_when_scan_finishes() {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(watch_for_cancel(cancel.clone(), None));
        cancel.cancel();
        watcher.await.unwrap();
    }

    #[tokio::test]
    async fn test_incomplete_email_falls_back_to_console() {
        let notifier = build_notifier(&EmailConfig::default());
        assert!(notifier.notify("dipwatch test", "body").await.is_ok());
    }
}
