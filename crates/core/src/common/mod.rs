use serde::{Deserialize, Serialize};

pub mod time;

/// # Summary
/// Lookback scope of one evaluation, each with its own sample count and RSI period.
///
/// # Invariants
/// - `Short` always comes before `Long` when windows are checked in priority order.
/// - The lookback and the indicator period are fixed; only the thresholds are configurable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Window {
    /// 30 daily samples, 14-period RSI
    Short,
    /// 90 daily samples, 60-period RSI
    Long,
}

impl Window {
    /// Number of daily closes requested from the market data provider.
    pub fn lookback_days(self) -> usize {
        match self {
            Window::Short => 30,
            Window::Long => 90,
        }
    }

    /// Period fed to the indicator engine.
    pub fn indicator_period(self) -> usize {
        match self {
            Window::Short => 14,
            Window::Long => 60,
        }
    }

    /// Compact label used in summaries, e.g. `30d`.
    pub fn label(self) -> &'static str {
        match self {
            Window::Short => "30d",
            Window::Long => "90d",
        }
    }

    /// Prose label used in alert messages, e.g. `30-day`.
    pub fn span(self) -> &'static str {
        match self {
            Window::Short => "30-day",
            Window::Long => "90-day",
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_constants() {
        assert_eq!(Window::Short.lookback_days(), 30);
        assert_eq!(Window::Short.indicator_period(), 14);
        assert_eq!(Window::Long.lookback_days(), 90);
        assert_eq!(Window::Long.indicator_period(), 60);
    }

    #[test]
    fn test_window_labels() {
        assert_eq!(Window::Short.to_string(), "30d");
        assert_eq!(Window::Long.to_string(), "90d");
        assert_eq!(Window::Long.span(), "90-day");
    }
}
