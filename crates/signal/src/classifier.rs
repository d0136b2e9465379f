use crate::format::{fixed, price};
use dipwatch_core::common::Window;
use dipwatch_core::signal::entity::{Classification, DipThresholds};
use rust_decimal::Decimal;

/// # Summary
/// Classification plus the operator-facing alert text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub classification: Classification,
    pub message: String,
}

/// # Summary
/// Percentage decline of `latest` from `high`.
///
/// # Logic
/// `(1 - latest / high) * 100`; a non-positive `high` is a caller bug and yields zero.
pub fn drop_percent(latest: Decimal, high: Decimal) -> Decimal {
    if high <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    latest
        .checked_div(high)
        .map(|ratio| (Decimal::ONE - ratio) * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// # Summary
/// Two-stage dip gate for one window.
///
/// # Invariants
/// - Total over its inputs and depends on nothing else.
/// - `DipCandidate` is only reachable through the watch drop bound.
///
/// # Logic
/// 1. `drop_percent` not above the window's watch threshold: `NoAlert`.
/// 2. Indicator below the window's confirm threshold: `DipCandidate`.
/// 3. Otherwise `Watch`.
pub fn classification(
    window: Window,
    drop_percent: Decimal,
    indicator: Decimal,
    thresholds: &DipThresholds,
) -> Classification {
    let bounds = thresholds.for_window(window);
    if drop_percent <= bounds.drop_watch {
        Classification::NoAlert
    } else if indicator < bounds.indicator_confirm {
        Classification::DipCandidate
    } else {
        Classification::Watch
    }
}

fn headline(window: Window, classification: Classification) -> &'static str {
    match (window, classification) {
        (_, Classification::NoAlert) => "No alert",
        (Window::Short, Classification::Watch) => "⚠️ DROP ALERT",
        (Window::Short, Classification::DipCandidate) => "✅ DIP CANDIDATE",
        (Window::Long, Classification::Watch) => "🔍 LONG-TERM DROP",
        (Window::Long, Classification::DipCandidate) => "✅ LONG-TERM DIP",
    }
}

/// # Summary
/// Classifies one window of one symbol and renders the alert message.
///
/// # Logic
/// 1. Derives the drop percent from `latest` and `high`.
/// 2. Applies [`classification`].
/// 3. Renders headline, drop, price/high and RSI with an oversold qualifier.
///
/// # Returns
/// A [`Verdict`]; its message is `No alert` when nothing fired.
pub fn classify(
    symbol: &str,
    window: Window,
    latest: Decimal,
    high: Decimal,
    indicator: Decimal,
    thresholds: &DipThresholds,
) -> Verdict {
    let drop = drop_percent(latest, high);
    let classification = classification(window, drop, indicator, thresholds);

    if !classification.is_alert() {
        return Verdict {
            classification,
            message: "No alert".to_string(),
        };
    }

    let qualifier = if classification == Classification::DipCandidate {
        "(RSI confirms oversold)"
    } else {
        "(RSI not oversold)"
    };

    let message = format!(
        "{}: {}\n{} has dropped {}% from {} high.\nPrice: {}, High: {}\nRSI: {} {}",
        headline(window, classification),
        symbol,
        symbol,
        fixed(drop, 2),
        window.span(),
        price(latest),
        price(high),
        fixed(indicator, 1),
        qualifier,
    );

    Verdict {
        classification,
        message,
    }
}
