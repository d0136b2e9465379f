use crate::common::Window;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// Outcome of one window's dip check.
///
/// # Invariants
/// - `DipCandidate` implies the drop already satisfied the `Watch` bound for the same window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Classification {
    NoAlert,
    /// Drop alone crossed the watch threshold
    Watch,
    /// Drop crossed the watch threshold and the indicator confirms oversold
    DipCandidate,
}

impl Classification {
    /// `true` for `Watch` and `DipCandidate`.
    pub fn is_alert(self) -> bool {
        !matches!(self, Classification::NoAlert)
    }
}

/// # Summary
/// Drop and indicator cutoffs for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowThresholds {
    /// Drop percent strictly above this fires a watch
    pub drop_watch: Decimal,
    /// Indicator strictly below this confirms a dip
    pub indicator_confirm: Decimal,
}

/// # Summary
/// The four named cutoffs of the two-stage dip gate.
///
/// # Invariants
/// - Values are percentages / RSI points; nothing enforces ordering between windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DipThresholds {
    pub short_drop_watch: Decimal,
    pub short_indicator_confirm: Decimal,
    pub long_drop_watch: Decimal,
    pub long_indicator_confirm: Decimal,
}

impl DipThresholds {
    pub fn for_window(&self, window: Window) -> WindowThresholds {
        match window {
            Window::Short => WindowThresholds {
                drop_watch: self.short_drop_watch,
                indicator_confirm: self.short_indicator_confirm,
            },
            Window::Long => WindowThresholds {
                drop_watch: self.long_drop_watch,
                indicator_confirm: self.long_indicator_confirm,
            },
        }
    }
}

impl Default for DipThresholds {
    fn default() -> Self {
        Self {
            short_drop_watch: Decimal::from(4),
            short_indicator_confirm: Decimal::from(42),
            long_drop_watch: Decimal::from(7),
            long_indicator_confirm: Decimal::from(44),
        }
    }
}

/// # Summary
/// Result of evaluating one symbol over one window in a single run.
///
/// # Invariants
/// - `high` is the window maximum and `latest` its last sample.
/// - `drop_percent == (1 - latest / high) * 100`.
/// - `classification` depends only on `drop_percent` and `indicator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub symbol: String,
    pub window: Window,
    pub latest: Decimal,
    pub high: Decimal,
    pub drop_percent: Decimal,
    pub indicator: Decimal,
    pub classification: Classification,
    /// Operator-facing alert text, "No alert" when nothing fired
    pub message: String,
}
