use crate::classifier::{classify, drop_percent};
use crate::format::{fixed, price};
use crate::indicator::compute_indicator;
use dipwatch_core::common::Window;
use dipwatch_core::market::entity::PriceSeries;
use dipwatch_core::signal::entity::{DipThresholds, Evaluation};
use tracing::debug;

/// # Summary
/// Evaluates one symbol over one window.
///
/// # Logic
/// 1. `latest` and `high` come from the series.
/// 2. RSI uses the window's indicator period.
/// 3. Classification and message come from [`classify`].
pub fn evaluate(
    symbol: &str,
    window: Window,
    series: &PriceSeries,
    thresholds: &DipThresholds,
) -> Evaluation {
    let latest = series.latest();
    let high = series.high();
    let indicator = compute_indicator(series.closes(), window.indicator_period());
    let verdict = classify(symbol, window, latest, high, indicator, thresholds);

    Evaluation {
        symbol: symbol.to_string(),
        window,
        latest,
        high,
        drop_percent: drop_percent(latest, high),
        indicator,
        classification: verdict.classification,
        message: verdict.message,
    }
}

/// # Summary
/// Both window evaluations of one symbol.
///
/// # Invariants
/// - `short.window == Window::Short` and `long.window == Window::Long`.
/// - At most one window contributes to the run lists, see [`SymbolAssessment::alert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolAssessment {
    pub symbol: String,
    pub short: Evaluation,
    pub long: Evaluation,
}

impl SymbolAssessment {
    /// Evaluates `symbol` over both windows.
    pub fn new(
        symbol: &str,
        short: &PriceSeries,
        long: &PriceSeries,
        thresholds: &DipThresholds,
    ) -> Self {
        let assessment = Self {
            symbol: symbol.to_string(),
            short: evaluate(symbol, Window::Short, short, thresholds),
            long: evaluate(symbol, Window::Long, long, thresholds),
        };
        debug!(
            symbol,
            short = ?assessment.short.classification,
            long = ?assessment.long.classification,
            "Symbol assessed"
        );
        assessment
    }

    /// # Summary
    /// The window that drives this symbol's watchlist / dip-candidate entry.
    ///
    /// # Logic
    /// Short is checked first; Long is only consulted when Short did not fire.
    pub fn alert(&self) -> Option<&Evaluation> {
        [&self.short, &self.long]
            .into_iter()
            .find(|e| e.classification.is_alert())
    }

    /// Compact `SYM: 30d x.xx%, 90d y.yy%` entry.
    pub fn drop_summary(&self) -> String {
        format!(
            "{}: {} {}%, {} {}%",
            self.symbol,
            self.short.window.label(),
            fixed(self.short.drop_percent, 2),
            self.long.window.label(),
            fixed(self.long.drop_percent, 2),
        )
    }

    /// One detail line per window.
    pub fn summary_lines(&self) -> [String; 2] {
        [summary_line(&self.short), summary_line(&self.long)]
    }
}

fn summary_line(e: &Evaluation) -> String {
    let name = match e.window {
        Window::Short => e.symbol.clone(),
        Window::Long => format!("{} (3m)", e.symbol),
    };
    format!(
        "{}: ${} | {} high ${} | Drop {}% | RSI: {}",
        name,
        price(e.latest),
        e.window.label(),
        price(e.high),
        fixed(e.drop_percent, 2),
        fixed(e.indicator, 1),
    )
}

/// # Summary
/// What happened to one symbol during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    Assessed(SymbolAssessment),
    /// No usable series; the reason is shown in the report body
    Skipped { symbol: String, reason: String },
}

impl SymbolOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            SymbolOutcome::Assessed(a) => &a.symbol,
            SymbolOutcome::Skipped { symbol, .. } => symbol,
        }
    }
}
