//! Running balance computation for a single account.
//!
//! Balances are a pure fold over posted lines: ordering by (date, entry
//! number) gives a deterministic total order, the opening balance is the
//! signed sum of everything strictly before the window, and each row adds
//! its signed amount per the account's normal balance side. Any cached
//! balance is an optimization; this fold over persisted lines is the source
//! of truth.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::JournalEntryId;

use crate::account::NormalBalance;

/// A posted journal line as read from storage, scoped to one account.
#[derive(Debug, Clone)]
pub struct PostedLineRef {
    /// The entry the line belongs to.
    pub entry_id: JournalEntryId,
    /// Sequential entry number within the company.
    pub entry_number: i64,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// One row of an account ledger with its running total.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    /// Entry date.
    pub date: NaiveDate,
    /// Entry number, the same-day tie-break.
    pub entry_number: i64,
    /// Entry description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Cumulative signed balance immediately after this line.
    pub running_balance: Decimal,
}

/// A computed account ledger: opening balance plus ordered rows.
#[derive(Debug, Clone, Serialize)]
pub struct RunningLedger {
    /// Signed balance of all posted lines strictly before the window.
    pub opening_balance: Decimal,
    /// Rows in (date, entry number) order with running totals.
    pub rows: Vec<LedgerRow>,
}

impl RunningLedger {
    /// The balance after the last row, or the opening balance when the
    /// window is empty.
    #[must_use]
    pub fn closing_balance(&self) -> Decimal {
        self.rows
            .last()
            .map_or(self.opening_balance, |row| row.running_balance)
    }
}

/// Stateless engine computing running balances.
pub struct BalanceEngine;

impl BalanceEngine {
    /// Signed opening balance from lines strictly before the window.
    #[must_use]
    pub fn opening_balance(normal: NormalBalance, prior_lines: &[PostedLineRef]) -> Decimal {
        prior_lines
            .iter()
            .map(|l| normal.signed_change(l.debit, l.credit))
            .sum()
    }

    /// Fold window lines into a running ledger.
    ///
    /// Lines are sorted by (date, entry number) internally, so the result is
    /// identical regardless of storage ordering - recomputing from the same
    /// persisted lines always yields the same sequence.
    #[must_use]
    pub fn running_ledger(
        normal: NormalBalance,
        opening_balance: Decimal,
        mut lines: Vec<PostedLineRef>,
    ) -> RunningLedger {
        lines.sort_by(|a, b| {
            a.entry_date
                .cmp(&b.entry_date)
                .then(a.entry_number.cmp(&b.entry_number))
        });

        let mut running = opening_balance;
        let rows = lines
            .into_iter()
            .map(|line| {
                running += normal.signed_change(line.debit, line.credit);
                LedgerRow {
                    date: line.entry_date,
                    entry_number: line.entry_number,
                    description: line.description,
                    debit: line.debit,
                    credit: line.credit,
                    running_balance: running,
                }
            })
            .collect();

        RunningLedger {
            opening_balance,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn line(number: i64, date: (i32, u32, u32), debit: Decimal, credit: Decimal) -> PostedLineRef {
        PostedLineRef {
            entry_id: JournalEntryId::new(),
            entry_number: number,
            entry_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: format!("entry {number}"),
            debit,
            credit,
        }
    }

    #[test]
    fn test_opening_balance_debit_normal() {
        let prior = vec![
            line(1, (2026, 1, 5), dec!(1000.00), dec!(0)),
            line(2, (2026, 1, 9), dec!(0), dec!(250.00)),
        ];
        assert_eq!(
            BalanceEngine::opening_balance(NormalBalance::Debit, &prior),
            dec!(750.00)
        );
    }

    #[test]
    fn test_opening_balance_credit_normal() {
        let prior = vec![line(1, (2026, 1, 5), dec!(0), dec!(1000.00))];
        assert_eq!(
            BalanceEngine::opening_balance(NormalBalance::Credit, &prior),
            dec!(1000.00)
        );
    }

    #[test]
    fn test_running_ledger_orders_by_date_then_number() {
        // Deliberately shuffled: same-day entries 3 and 2, earlier entry 1
        let lines = vec![
            line(3, (2026, 1, 10), dec!(30.00), dec!(0)),
            line(1, (2026, 1, 5), dec!(10.00), dec!(0)),
            line(2, (2026, 1, 10), dec!(20.00), dec!(0)),
        ];

        let ledger = BalanceEngine::running_ledger(NormalBalance::Debit, Decimal::ZERO, lines);

        let numbers: Vec<i64> = ledger.rows.iter().map(|r| r.entry_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(ledger.rows[0].running_balance, dec!(10.00));
        assert_eq!(ledger.rows[1].running_balance, dec!(30.00));
        assert_eq!(ledger.rows[2].running_balance, dec!(60.00));
    }

    #[test]
    fn test_running_ledger_starts_from_opening() {
        let lines = vec![line(7, (2026, 2, 1), dec!(0), dec!(100.00))];
        let ledger = BalanceEngine::running_ledger(NormalBalance::Debit, dec!(500.00), lines);

        assert_eq!(ledger.opening_balance, dec!(500.00));
        assert_eq!(ledger.rows[0].running_balance, dec!(400.00));
        assert_eq!(ledger.closing_balance(), dec!(400.00));
    }

    #[test]
    fn test_empty_window_closes_at_opening() {
        let ledger = BalanceEngine::running_ledger(NormalBalance::Debit, dec!(42.00), vec![]);
        assert!(ledger.rows.is_empty());
        assert_eq!(ledger.closing_balance(), dec!(42.00));
    }

    #[test]
    fn test_credit_normal_account_rises_on_credit() {
        // Revenue example: a 1000.00 credit raises the balance by 1000.00
        let lines = vec![line(1, (2026, 1, 15), dec!(0), dec!(1000.00))];
        let ledger = BalanceEngine::running_ledger(NormalBalance::Credit, Decimal::ZERO, lines);
        assert_eq!(ledger.closing_balance(), dec!(1000.00));
    }

    // ========================================================================
    // Properties: determinism and closing = opening + sum of signed changes
    // ========================================================================

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn lines_strategy(max_len: usize) -> impl Strategy<Value = Vec<PostedLineRef>> {
        prop::collection::vec(
            (1i64..10_000i64, 1u32..29u32, amount_strategy(), any::<bool>()),
            1..=max_len,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .map(|(number, day, amount, is_debit)| {
                    let (debit, credit) = if is_debit {
                        (amount, Decimal::ZERO)
                    } else {
                        (Decimal::ZERO, amount)
                    };
                    line(number, (2026, 3, day), debit, credit)
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Closing balance equals opening plus the signed sum of all lines.
        #[test]
        fn prop_closing_equals_opening_plus_sum(
            opening in amount_strategy(),
            lines in lines_strategy(20),
        ) {
            let expected: Decimal = opening
                + lines
                    .iter()
                    .map(|l| NormalBalance::Debit.signed_change(l.debit, l.credit))
                    .sum::<Decimal>();

            let ledger =
                BalanceEngine::running_ledger(NormalBalance::Debit, opening, lines);
            prop_assert_eq!(ledger.closing_balance(), expected);
        }

        /// Recomputing from the same lines yields identical rows.
        #[test]
        fn prop_recompute_is_deterministic(
            opening in amount_strategy(),
            lines in lines_strategy(15),
        ) {
            let a = BalanceEngine::running_ledger(
                NormalBalance::Credit,
                opening,
                lines.clone(),
            );
            let b = BalanceEngine::running_ledger(NormalBalance::Credit, opening, lines);

            prop_assert_eq!(a.rows.len(), b.rows.len());
            for (x, y) in a.rows.iter().zip(b.rows.iter()) {
                prop_assert_eq!(x.entry_number, y.entry_number);
                prop_assert_eq!(x.running_balance, y.running_balance);
            }
        }

        /// Each row's running balance differs from the previous by exactly
        /// the row's signed amount.
        #[test]
        fn prop_row_deltas_match_signed_amounts(
            lines in lines_strategy(20),
        ) {
            let ledger =
                BalanceEngine::running_ledger(NormalBalance::Debit, Decimal::ZERO, lines);

            let mut previous = ledger.opening_balance;
            for row in &ledger.rows {
                let delta = NormalBalance::Debit.signed_change(row.debit, row.credit);
                prop_assert_eq!(row.running_balance, previous + delta);
                previous = row.running_balance;
            }
        }
    }
}
