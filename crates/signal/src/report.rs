use crate::assess::{SymbolAssessment, SymbolOutcome};
use crate::format::{fixed, signed};
use chrono::NaiveDate;
use dipwatch_core::common::Window;
use dipwatch_core::market::entity::VolatilitySnapshot;
use dipwatch_core::signal::entity::{Classification, Evaluation};
use rust_decimal::Decimal;

/// # Summary
/// Renders the volatility header line.
///
/// # Logic
/// Missing snapshot renders the "unavailable" placeholder; trend and change are
/// appended only when the provider returned more than one observation.
pub fn volatility_line(snapshot: Option<&VolatilitySnapshot>) -> String {
    let Some(snap) = snapshot else {
        return "⚠️ VIX data unavailable".to_string();
    };

    let mut line = format!(
        "📈 VIX as of {}: {} ({})",
        snap.as_of,
        fixed(snap.value, 2),
        snap.regime()
    );
    if let (Some(trend), Some(change)) = (snap.trend(), snap.change) {
        line.push_str(&format!(", {}, 7-day change: {}", trend, signed(change, 2)));
    }
    line
}

/// # Summary
/// One symbol placed on a dip-candidate list or a watchlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub symbol: String,
    pub window: Window,
    pub drop_percent: Decimal,
    pub indicator: Decimal,
}

impl Listing {
    fn from_evaluation(e: &Evaluation) -> Self {
        Self {
            symbol: e.symbol.clone(),
            window: e.window,
            drop_percent: e.drop_percent,
            indicator: e.indicator,
        }
    }
}

/// # Summary
/// Accumulator threaded through the scan loop and finished into a [`RunReport`].
///
/// # Invariants
/// - Outcomes keep the order in which symbols were processed.
/// - Consumed by [`ReportBuilder::finish`]; nothing else holds it.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    volatility_line: String,
    outcomes: Vec<SymbolOutcome>,
    unprocessed: Vec<String>,
}

impl ReportBuilder {
    pub fn new(volatility: Option<&VolatilitySnapshot>) -> Self {
        Self {
            volatility_line: volatility_line(volatility),
            outcomes: Vec::new(),
            unprocessed: Vec::new(),
        }
    }

    /// Appends the outcome of the next symbol.
    pub fn push(mut self, outcome: SymbolOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    /// Marks the run as cut short; `remaining` were never started.
    pub fn interrupted(mut self, remaining: Vec<String>) -> Self {
        self.unprocessed = remaining;
        self
    }

    /// # Summary
    /// Freezes the accumulated outcomes into the final report.
    ///
    /// # Logic
    /// 1. Every assessed symbol contributes a drop summary.
    /// 2. The alerting window (Short first) decides the list: a confirmed dip goes to
    ///    the dip candidates, a plain watch to that window's watchlist.
    /// 3. The header and per-symbol detail body are rendered once.
    pub fn finish(self, date: NaiveDate) -> RunReport {
        let mut dip_candidates = Vec::new();
        let mut short_watchlist = Vec::new();
        let mut long_watchlist = Vec::new();
        let mut drop_summaries = Vec::new();
        let mut skipped = Vec::new();
        let mut details = String::new();

        for outcome in &self.outcomes {
            match outcome {
                SymbolOutcome::Assessed(assessment) => {
                    drop_summaries.push(assessment.drop_summary());
                    if let Some(alert) = assessment.alert() {
                        let listing = Listing::from_evaluation(alert);
                        match (alert.window, alert.classification) {
                            (_, Classification::DipCandidate) => dip_candidates.push(listing),
                            (Window::Short, _) => short_watchlist.push(listing),
                            (Window::Long, _) => long_watchlist.push(listing),
                        }
                    }
                    details.push_str(&detail_block(assessment));
                }
                SymbolOutcome::Skipped { symbol, reason } => {
                    skipped.push(symbol.clone());
                    details.push_str(&format!("{}: Insufficient data ({})\n\n", symbol, reason));
                }
            }
        }

        let mut report = RunReport {
            date,
            volatility_line: self.volatility_line,
            outcomes: self.outcomes,
            dip_candidates,
            short_watchlist,
            long_watchlist,
            drop_summaries,
            skipped,
            unprocessed: self.unprocessed,
            body: String::new(),
        };
        report.body = report.render(&details);
        report
    }
}

fn detail_block(assessment: &SymbolAssessment) -> String {
    let [short, long] = assessment.summary_lines();
    let mut block = format!("{}\n{}\n", short, long);
    if let Some(alert) = assessment.alert() {
        block.push_str(&alert.message);
        block.push('\n');
    }
    block.push('\n');
    block
}

/// # Summary
/// Immutable result of one run, ready for the notifier.
///
/// # Invariants
/// - A symbol appears in at most one of `dip_candidates`, `short_watchlist`, `long_watchlist`.
/// - Every assessed symbol has exactly one drop summary; skipped symbols have none.
#[derive(Debug, Clone)]
pub struct RunReport {
    date: NaiveDate,
    volatility_line: String,
    outcomes: Vec<SymbolOutcome>,
    dip_candidates: Vec<Listing>,
    short_watchlist: Vec<Listing>,
    long_watchlist: Vec<Listing>,
    drop_summaries: Vec<String>,
    skipped: Vec<String>,
    unprocessed: Vec<String>,
    body: String,
}

impl RunReport {
    /// Builds a report straight from outcomes, without a scan loop.
    pub fn from_outcomes(
        volatility: Option<&VolatilitySnapshot>,
        outcomes: impl IntoIterator<Item = SymbolOutcome>,
        date: NaiveDate,
    ) -> Self {
        outcomes
            .into_iter()
            .fold(ReportBuilder::new(volatility), ReportBuilder::push)
            .finish(date)
    }

    pub fn subject(&self) -> String {
        let mut subject = format!("ETF dip report {}", self.date);
        if !self.dip_candidates.is_empty() {
            subject.push_str(" | dip candidates: ");
            subject.push_str(&symbols(&self.dip_candidates).join(", "));
        }
        subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn volatility_line(&self) -> &str {
        &self.volatility_line
    }

    pub fn outcomes(&self) -> &[SymbolOutcome] {
        &self.outcomes
    }

    pub fn dip_candidates(&self) -> &[Listing] {
        &self.dip_candidates
    }

    pub fn short_watchlist(&self) -> &[Listing] {
        &self.short_watchlist
    }

    pub fn long_watchlist(&self) -> &[Listing] {
        &self.long_watchlist
    }

    pub fn drop_summaries(&self) -> &[String] {
        &self.drop_summaries
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn unprocessed(&self) -> &[String] {
        &self.unprocessed
    }

    /// Symbols on the dip-candidate list, in processing order.
    pub fn dip_candidate_symbols(&self) -> Vec<&str> {
        symbols(&self.dip_candidates)
    }

    /// Symbols on either watchlist, Short first.
    pub fn watchlist_symbols(&self) -> Vec<&str> {
        symbols(&self.short_watchlist)
            .into_iter()
            .chain(symbols(&self.long_watchlist))
            .collect()
    }

    /// `true` when cancellation stopped the run before every symbol was started.
    pub fn is_partial(&self) -> bool {
        !self.unprocessed.is_empty()
    }

    fn render(&self, details: &str) -> String {
        let mut lines = vec![self.volatility_line.clone()];

        lines.push(if self.dip_candidates.is_empty() {
            "📭 No current dip candidates".to_string()
        } else {
            let entries: Vec<String> = self
                .dip_candidates
                .iter()
                .map(|l| {
                    format!(
                        "{} ({} drop {}%, RSI {})",
                        l.symbol,
                        l.window.label(),
                        fixed(l.drop_percent, 2),
                        fixed(l.indicator, 1)
                    )
                })
                .collect();
            format!("✅ Dip candidates: {}", entries.join(", "))
        });

        lines.push(watchlist_line(
            "⚠️ Short-term watchlist",
            "No short-term watch alerts",
            &self.short_watchlist,
        ));
        lines.push(watchlist_line(
            "🔍 Long-term watchlist",
            "No long-term watch alerts",
            &self.long_watchlist,
        ));

        lines.push(if self.drop_summaries.is_empty() {
            "📊 No drop data".to_string()
        } else {
            format!("📊 Drops: {}", self.drop_summaries.join(" | "))
        });

        if self.is_partial() {
            lines.push(format!(
                "⏹ Run interrupted, not evaluated: {}",
                self.unprocessed.join(", ")
            ));
        }

        format!("{}\n\n{}", lines.join("\n"), details)
    }
}

fn symbols(listings: &[Listing]) -> Vec<&str> {
    listings.iter().map(|l| l.symbol.as_str()).collect()
}

fn watchlist_line(title: &str, placeholder: &str, listings: &[Listing]) -> String {
    if listings.is_empty() {
        return format!("👀 {}", placeholder);
    }
    let entries: Vec<String> = listings
        .iter()
        .map(|l| format!("{} ({}%)", l.symbol, fixed(l.drop_percent, 2)))
        .collect();
    format!("{}: {}", title, entries.join(", "))
}
