use crate::market::error::MarketError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// One symbol's closing prices over a lookback window, oldest first.
///
/// # Invariants
/// - At least one sample.
/// - Every sample is strictly positive, so `high() > 0`.
/// - Immutable after construction; `latest` and `high` are computed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSeries {
    /// Closing prices, oldest first
    closes: Vec<Decimal>,
    /// Last element of `closes`
    latest: Decimal,
    /// Maximum of `closes`
    high: Decimal,
}

impl PriceSeries {
    /// # Summary
    /// Validates raw closes and builds a series.
    ///
    /// # Logic
    /// 1. Rejects an empty sequence with `InsufficientData`.
    /// 2. Rejects zero or negative prices with `InvalidData`.
    /// 3. Caches the latest sample and the rolling high.
    ///
    /// # Arguments
    /// * `closes`: closing prices ordered oldest to newest.
    ///
    /// # Returns
    /// The validated series, or `MarketError`.
    pub fn new(closes: Vec<Decimal>) -> Result<Self, MarketError> {
        if let Some(bad) = closes.iter().find(|c| **c <= Decimal::ZERO) {
            return Err(MarketError::InvalidData(format!(
                "non-positive closing price {}",
                bad
            )));
        }

        let (Some(&latest), Some(&high)) = (closes.last(), closes.iter().max()) else {
            return Err(MarketError::InsufficientData);
        };

        Ok(Self {
            closes,
            latest,
            high,
        })
    }

    pub fn closes(&self) -> &[Decimal] {
        &self.closes
    }

    /// Most recent sample.
    pub fn latest(&self) -> Decimal {
        self.latest
    }

    /// Highest close inside the window.
    pub fn high(&self) -> Decimal {
        self.high
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

impl TryFrom<Vec<Decimal>> for PriceSeries {
    type Error = MarketError;

    fn try_from(closes: Vec<Decimal>) -> Result<Self, Self::Error> {
        Self::new(closes)
    }
}

/// # Summary
/// Latest reading of the CBOE volatility index.
///
/// # Invariants
/// - `as_of` is the observation date reported by the provider, not the fetch date.
/// - `change` is latest minus oldest over the fetched observations, when more than one was valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilitySnapshot {
    /// Index level
    pub value: Decimal,
    /// Observation date
    pub as_of: NaiveDate,
    /// Change across the fetched observations
    pub change: Option<Decimal>,
}

impl VolatilitySnapshot {
    /// # Summary
    /// Coarse market-fear bucket for the index level.
    ///
    /// # Logic
    /// Below 15 is low volatility, below 20 stable, below 30 elevated fear, anything higher panic.
    pub fn regime(&self) -> &'static str {
        if self.value < Decimal::from(15) {
            "Low volatility"
        } else if self.value < Decimal::from(20) {
            "Stable"
        } else if self.value < Decimal::from(30) {
            "Elevated fear"
        } else {
            "Panic level"
        }
    }

    /// Direction of the index over the fetched observations, if known.
    pub fn trend(&self) -> Option<&'static str> {
        self.change.map(|c| {
            if c > Decimal::ZERO {
                "VIX rising"
            } else {
                "VIX falling"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_series_latest_and_high() {
        let series = PriceSeries::new(vec![dec!(100), dec!(104.5), dec!(99)]).unwrap();
        assert_eq!(series.latest(), dec!(99));
        assert_eq!(series.high(), dec!(104.5));
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
    }

    #[test]
    fn test_series_rejects_empty() {
        let err = PriceSeries::new(Vec::new()).unwrap_err();
        assert!(matches!(err, MarketError::InsufficientData));
    }

    #[test]
    fn test_series_rejects_non_positive() {
        let err = PriceSeries::try_from(vec![dec!(10), dec!(0), dec!(11)]).unwrap_err();
        assert!(matches!(err, MarketError::InvalidData(_)));
    }

    #[test]
    fn test_volatility_regimes() {
        let mut snap = VolatilitySnapshot {
            value: dec!(14.99),
            as_of: NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
            change: None,
        };
        assert_eq!(snap.regime(), "Low volatility");
        assert_eq!(snap.trend(), None);

        snap.value = dec!(15);
        assert_eq!(snap.regime(), "Stable");
        snap.value = dec!(29.9);
        assert_eq!(snap.regime(), "Elevated fear");
        snap.value = dec!(38.57);
        snap.change = Some(dec!(12.1));
        assert_eq!(snap.regime(), "Panic level");
        assert_eq!(snap.trend(), Some("VIX rising"));
    }
}
