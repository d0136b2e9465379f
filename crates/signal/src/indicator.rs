use rust_decimal::Decimal;

/// Reading returned when the series is too short for the requested period.
pub const NEUTRAL: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// # Summary
/// Relative Strength Index over the last `period` price changes.
///
/// # Invariants
/// - Result is within `[0, 100]`.
/// - Pure: the same series and period always give the same value.
///
/// # Logic
/// 1. Fewer than `period + 1` samples (or a zero period) yields [`NEUTRAL`].
/// 2. Sums positive deltas into `gain` and absolute negative deltas into `loss`
///    over the last `period + 1` samples.
/// 3. No losses gives 100, no gains gives 0.
/// 4. Otherwise `100 - 100 / (1 + rs)` with `rs = avg_gain / avg_loss`.
/// 5. A ratio too large for `Decimal` reads as 100; sums saturate instead of overflowing.
///
/// # Arguments
/// * `series`: closing prices, oldest first.
/// * `period`: number of deltas averaged.
///
/// # Returns
/// The oscillator value.
pub fn compute_indicator(series: &[Decimal], period: usize) -> Decimal {
    if period == 0 || series.len() <= period {
        return NEUTRAL;
    }

    let recent = &series[series.len() - (period + 1)..];
    let (gain, loss) = recent
        .windows(2)
        .fold((Decimal::ZERO, Decimal::ZERO), |(gain, loss), pair| {
            let delta = pair[1] - pair[0];
            if delta > Decimal::ZERO {
                (gain.saturating_add(delta), loss)
            } else {
                (gain, loss.saturating_sub(delta))
            }
        });

    if loss.is_zero() {
        return Decimal::ONE_HUNDRED;
    }
    if gain.is_zero() {
        return Decimal::ZERO;
    }

    // avg_gain / avg_loss: the period cancels out
    gain.checked_div(loss)
        .and_then(|rs| Decimal::ONE.checked_add(rs))
        .and_then(|denominator| Decimal::ONE_HUNDRED.checked_div(denominator))
        .map_or(Decimal::ONE_HUNDRED, |scaled| Decimal::ONE_HUNDRED - scaled)
}
