//! Frequency advancement.
//!
//! The next occurrence is always strictly after the current one. Month-based
//! frequencies add calendar months with day-of-month clamping: monthly from
//! 2024-01-31 lands on 2024-02-29, not 2024-03-02.

use chrono::{Days, Months, NaiveDate};

use super::types::Frequency;

/// The next execution date strictly after `current` for the frequency.
///
/// `chrono`'s month arithmetic clamps the day-of-month to the target month's
/// length, which is exactly the calendar behavior the ledger needs.
#[must_use]
pub fn next_occurrence(current: NaiveDate, frequency: Frequency) -> NaiveDate {
    let next = match frequency {
        Frequency::Daily => current.checked_add_days(Days::new(1)),
        Frequency::Weekly => current.checked_add_days(Days::new(7)),
        Frequency::Monthly => current.checked_add_months(Months::new(1)),
        Frequency::Quarterly => current.checked_add_months(Months::new(3)),
        Frequency::Annual => current.checked_add_months(Months::new(12)),
    };
    // Only reachable at the far edge of the representable date range.
    next.unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case(Frequency::Daily, d(2024, 1, 31), d(2024, 2, 1))]
    #[case(Frequency::Weekly, d(2024, 2, 26), d(2024, 3, 4))]
    #[case(Frequency::Monthly, d(2024, 1, 15), d(2024, 2, 15))]
    #[case(Frequency::Quarterly, d(2024, 1, 15), d(2024, 4, 15))]
    #[case(Frequency::Annual, d(2024, 3, 1), d(2025, 3, 1))]
    fn test_plain_advancement(
        #[case] frequency: Frequency,
        #[case] current: NaiveDate,
        #[case] expected: NaiveDate,
    ) {
        assert_eq!(next_occurrence(current, frequency), expected);
    }

    #[test]
    fn test_monthly_clamps_to_leap_february() {
        // Jan 31 advances to Feb 29 in a leap year, never rolling into
        // March.
        assert_eq!(
            next_occurrence(d(2024, 1, 31), Frequency::Monthly),
            d(2024, 2, 29)
        );
    }

    #[test]
    fn test_monthly_clamps_to_common_february() {
        assert_eq!(
            next_occurrence(d(2023, 1, 31), Frequency::Monthly),
            d(2023, 2, 28)
        );
    }

    #[test]
    fn test_monthly_clamp_is_not_sticky() {
        // After clamping to Feb 29, the next hop lands on Mar 29 (chrono
        // carries the stored day, not the original 31st).
        let feb = next_occurrence(d(2024, 1, 31), Frequency::Monthly);
        assert_eq!(next_occurrence(feb, Frequency::Monthly), d(2024, 3, 29));
    }

    #[test]
    fn test_quarterly_clamp() {
        assert_eq!(
            next_occurrence(d(2024, 11, 30), Frequency::Quarterly),
            d(2025, 2, 28)
        );
    }

    #[test]
    fn test_annual_from_leap_day() {
        assert_eq!(
            next_occurrence(d(2024, 2, 29), Frequency::Annual),
            d(2025, 2, 28)
        );
    }

    #[test]
    fn test_always_strictly_after() {
        for frequency in [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
            Frequency::Quarterly,
            Frequency::Annual,
        ] {
            let current = d(2024, 1, 31);
            assert!(next_occurrence(current, frequency) > current);
        }
    }
}
