//! Monetary amount helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` scaled to 2 decimal places;
//! rounding uses banker's rounding (midpoint-nearest-even).

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places stored for ledger amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Rounds an amount to ledger scale using banker's rounding.
#[must_use]
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Applies a fractional tax rate to a base amount, returning the grossed-up
/// amount at ledger scale.
///
/// A rate of `0.10` turns `100.00` into `110.00`.
#[must_use]
pub fn gross_up(base: Decimal, rate: Decimal) -> Decimal {
    round_amount(base * (Decimal::ONE + rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_amount_truncates_to_two_places() {
        assert_eq!(round_amount(dec!(10.004)), dec!(10.00));
        assert_eq!(round_amount(dec!(10.006)), dec!(10.01));
    }

    #[test]
    fn test_round_amount_bankers_midpoint() {
        // Midpoints round to even
        assert_eq!(round_amount(dec!(10.005)), dec!(10.00));
        assert_eq!(round_amount(dec!(10.015)), dec!(10.02));
    }

    #[test]
    fn test_gross_up() {
        assert_eq!(gross_up(dec!(100.00), dec!(0.10)), dec!(110.00));
        assert_eq!(gross_up(dec!(100.00), dec!(0)), dec!(100.00));
        assert_eq!(gross_up(dec!(33.33), dec!(0.11)), dec!(37.00));
    }
}
