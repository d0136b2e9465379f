use rust_decimal::{Decimal, RoundingStrategy};

/// # Summary
/// Renders a decimal with exactly `dp` fractional digits, rounding half away from zero.
pub fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let width = usize::try_from(dp).unwrap_or(0);
    format!("{:.*}", width, rounded)
}

/// Like [`fixed`] but always carries a sign, e.g. `+1.30`.
pub fn signed(value: Decimal, dp: u32) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        fixed(value, dp)
    } else {
        format!("+{}", fixed(value, dp))
    }
}

/// Price as quoted, without trailing zeros (`503.10000` prints as `503.1`).
pub fn price(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_pads_and_rounds_away_from_zero() {
        assert_eq!(fixed(dec!(10), 2), "10.00");
        assert_eq!(fixed(dec!(2.345), 2), "2.35");
        assert_eq!(fixed(dec!(54.5454545), 1), "54.5");
        assert_eq!(fixed(dec!(0.05), 1), "0.1");
    }

    #[test]
    fn test_signed_and_price() {
        assert_eq!(signed(dec!(1.3), 2), "+1.30");
        assert_eq!(signed(dec!(-0.456), 2), "-0.46");
        assert_eq!(signed(Decimal::ZERO, 2), "+0.00");
        assert_eq!(price(dec!(503.10000)), "503.1");
        assert_eq!(price(dec!(90)), "90");
    }
}
