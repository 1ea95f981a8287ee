//! Posting validation.
//!
//! Pure validation of a line set before anything is written. A rejected
//! posting leaves no trace; the balance invariant is enforced here, at write
//! time, not at read time.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{LineInput, PostingTotals};
use crate::account::Account;
use tally_shared::types::{AccountId, CompanyId};

/// Stateless validator for journal entry line sets.
///
/// Contains pure business logic with no database dependencies; account
/// lookups are injected as a closure.
pub struct PostingValidator;

impl PostingValidator {
    /// Validate a line set for posting.
    ///
    /// Steps:
    /// 1. At least 2 lines.
    /// 2. Each line carries exactly one positive side.
    /// 3. Every account resolves, belongs to the company, and is postable.
    /// 4. Total debits equal total credits exactly.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` on the first violated rule; nothing is written
    /// by callers when validation fails.
    pub fn validate<A>(
        company_id: CompanyId,
        lines: &[LineInput],
        account_resolver: A,
    ) -> Result<PostingTotals, LedgerError>
    where
        A: Fn(AccountId) -> Result<Account, LedgerError>,
    {
        if lines.len() < 2 {
            return Err(LedgerError::InsufficientLines);
        }

        for line in lines {
            Self::validate_amounts(line)?;

            let account = account_resolver(line.account_id)?;
            if account.company_id != company_id {
                return Err(LedgerError::CompanyMismatch(line.account_id.into_inner()));
            }
            if !account.is_postable() {
                return Err(LedgerError::AccountNotPostable(
                    line.account_id.into_inner(),
                ));
            }
        }

        let totals = Self::totals(lines);
        if !totals.is_balanced {
            return Err(LedgerError::UnbalancedEntry {
                debit: totals.debit,
                credit: totals.credit,
            });
        }

        Ok(totals)
    }

    /// A line carries exactly one positive amount; the other side is zero.
    fn validate_amounts(line: &LineInput) -> Result<(), LedgerError> {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if line.debit > Decimal::ZERO && line.credit > Decimal::ZERO {
            return Err(LedgerError::BothSidesSet);
        }
        if line.debit == Decimal::ZERO && line.credit == Decimal::ZERO {
            return Err(LedgerError::ZeroAmount);
        }
        Ok(())
    }

    /// Calculate posting totals from lines.
    #[must_use]
    pub fn totals(lines: &[LineInput]) -> PostingTotals {
        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();
        PostingTotals::new(debit, credit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::ledger::types::LineSide;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn make_account(id: AccountId, company_id: CompanyId) -> Account {
        Account {
            id,
            company_id,
            code: "1100".to_string(),
            name: "Cash".to_string(),
            account_type: AccountType::Asset,
            parent_id: None,
            is_header: false,
            is_active: true,
        }
    }

    fn resolver_for(company_id: CompanyId) -> impl Fn(AccountId) -> Result<Account, LedgerError> {
        move |id| Ok(make_account(id, company_id))
    }

    #[test]
    fn test_balanced_pair_passes() {
        let company = CompanyId::new();
        let lines = vec![
            LineInput::new(AccountId::new(), LineSide::Debit, dec!(1000.00)),
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(1000.00)),
        ];

        let totals = PostingValidator::validate(company, &lines, resolver_for(company)).unwrap();
        assert!(totals.is_balanced);
        assert_eq!(totals.debit, dec!(1000.00));
    }

    #[test]
    fn test_unbalanced_pair_rejected() {
        let company = CompanyId::new();
        let lines = vec![
            LineInput::new(AccountId::new(), LineSide::Debit, dec!(1000.00)),
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(900.00)),
        ];

        let result = PostingValidator::validate(company, &lines, resolver_for(company));
        assert!(matches!(result, Err(LedgerError::UnbalancedEntry { .. })));
    }

    #[test]
    fn test_single_line_rejected() {
        let company = CompanyId::new();
        let lines = vec![LineInput::new(AccountId::new(), LineSide::Debit, dec!(10))];

        let result = PostingValidator::validate(company, &lines, resolver_for(company));
        assert!(matches!(result, Err(LedgerError::InsufficientLines)));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let company = CompanyId::new();
        let lines = vec![
            LineInput::new(AccountId::new(), LineSide::Debit, dec!(0)),
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(0)),
        ];

        let result = PostingValidator::validate(company, &lines, resolver_for(company));
        assert!(matches!(result, Err(LedgerError::ZeroAmount)));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let company = CompanyId::new();
        let lines = vec![
            LineInput::new(AccountId::new(), LineSide::Debit, dec!(-100)),
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(-100)),
        ];

        let result = PostingValidator::validate(company, &lines, resolver_for(company));
        assert!(matches!(result, Err(LedgerError::NegativeAmount)));
    }

    #[test]
    fn test_both_sides_set_rejected() {
        let company = CompanyId::new();
        let mut line = LineInput::new(AccountId::new(), LineSide::Debit, dec!(100));
        line.credit = dec!(100);
        let lines = vec![
            line,
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(100)),
        ];

        let result = PostingValidator::validate(company, &lines, resolver_for(company));
        assert!(matches!(result, Err(LedgerError::BothSidesSet)));
    }

    #[test]
    fn test_header_account_rejected() {
        let company = CompanyId::new();
        let lines = vec![
            LineInput::new(AccountId::new(), LineSide::Debit, dec!(100)),
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(100)),
        ];

        let header_resolver = move |id: AccountId| -> Result<Account, LedgerError> {
            let mut account = make_account(id, company);
            account.is_header = true;
            Ok(account)
        };

        let result = PostingValidator::validate(company, &lines, header_resolver);
        assert!(matches!(result, Err(LedgerError::AccountNotPostable(_))));
    }

    #[test]
    fn test_inactive_account_rejected() {
        let company = CompanyId::new();
        let lines = vec![
            LineInput::new(AccountId::new(), LineSide::Debit, dec!(100)),
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(100)),
        ];

        let inactive_resolver = move |id: AccountId| -> Result<Account, LedgerError> {
            let mut account = make_account(id, company);
            account.is_active = false;
            Ok(account)
        };

        let result = PostingValidator::validate(company, &lines, inactive_resolver);
        assert!(matches!(result, Err(LedgerError::AccountNotPostable(_))));
    }

    #[test]
    fn test_foreign_company_account_rejected() {
        let company = CompanyId::new();
        let other = CompanyId::new();
        let lines = vec![
            LineInput::new(AccountId::new(), LineSide::Debit, dec!(100)),
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(100)),
        ];

        let result = PostingValidator::validate(company, &lines, resolver_for(other));
        assert!(matches!(result, Err(LedgerError::CompanyMismatch(_))));
    }

    #[test]
    fn test_missing_account_propagates() {
        let company = CompanyId::new();
        let lines = vec![
            LineInput::new(AccountId::new(), LineSide::Debit, dec!(100)),
            LineInput::new(AccountId::new(), LineSide::Credit, dec!(100)),
        ];

        let missing = |id: AccountId| -> Result<Account, LedgerError> {
            Err(LedgerError::AccountNotFound(id.into_inner()))
        };

        let result = PostingValidator::validate(company, &lines, missing);
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    // ========================================================================
    // Property: a validated line set is always exactly balanced
    // ========================================================================

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any mirrored debit/credit pair validates and reports exact balance.
        #[test]
        fn prop_mirrored_pairs_validate(amount in amount_strategy()) {
            let company = CompanyId::new();
            let lines = vec![
                LineInput::new(AccountId::new(), LineSide::Debit, amount),
                LineInput::new(AccountId::new(), LineSide::Credit, amount),
            ];

            let totals =
                PostingValidator::validate(company, &lines, resolver_for(company)).unwrap();
            prop_assert!(totals.is_balanced);
            prop_assert_eq!(totals.debit, totals.credit);
        }

        /// Any pair that differs by a positive delta is rejected.
        #[test]
        fn prop_skewed_pairs_rejected(
            amount in amount_strategy(),
            delta in amount_strategy(),
        ) {
            let company = CompanyId::new();
            let lines = vec![
                LineInput::new(AccountId::new(), LineSide::Debit, amount + delta),
                LineInput::new(AccountId::new(), LineSide::Credit, amount),
            ];

            let result = PostingValidator::validate(company, &lines, resolver_for(company));
            prop_assert!(
                matches!(result, Err(LedgerError::UnbalancedEntry { .. })),
                "expected UnbalancedEntry, got {:?}",
                result
            );
        }
    }
}
