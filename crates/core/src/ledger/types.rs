//! Ledger domain types for journal entry creation and validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

/// The side of a double-entry line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl LineSide {
    /// The opposite side, used when building reversals.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Journal entry lifecycle status.
///
/// Entries transition `Draft -> Posted` and `Posted -> Void` only. Posted
/// entries are immutable; voiding creates a new linked reversing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry awaits manual confirmation; carries no entry number.
    Draft,
    /// Entry is posted to the ledger (immutable).
    Posted,
    /// Entry has been voided by a reversing entry (immutable).
    Void,
}

impl EntryStatus {
    /// Returns true if the entry is immutable.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Posted | Self::Void)
    }
}

/// Where a journal entry originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Entered by a user through the transaction endpoints.
    Manual,
    /// Generated by the recurring scheduler.
    Recurring,
}

/// Input for a single journal line.
///
/// Exactly one of `debit`/`credit` must be positive; the other is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInput {
    /// The account to post to (must be a postable leaf account).
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Tax rate frozen into this line at creation time, if any.
    pub tax_rate: Option<Decimal>,
    /// Optional memo for this line.
    pub memo: Option<String>,
}

impl LineInput {
    /// Creates a line on the given side.
    #[must_use]
    pub fn new(account_id: AccountId, side: LineSide, amount: Decimal) -> Self {
        let (debit, credit) = match side {
            LineSide::Debit => (amount, Decimal::ZERO),
            LineSide::Credit => (Decimal::ZERO, amount),
        };
        Self {
            account_id,
            debit,
            credit,
            tax_rate: None,
            memo: None,
        }
    }
}

/// Posting totals for validation and display.
#[derive(Debug, Clone)]
pub struct PostingTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the line set is balanced (debits == credits).
    pub is_balanced: bool,
}

impl PostingTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_side_flipped() {
        assert_eq!(LineSide::Debit.flipped(), LineSide::Credit);
        assert_eq!(LineSide::Credit.flipped(), LineSide::Debit);
    }

    #[test]
    fn test_entry_status_immutability() {
        assert!(!EntryStatus::Draft.is_immutable());
        assert!(EntryStatus::Posted.is_immutable());
        assert!(EntryStatus::Void.is_immutable());
    }

    #[test]
    fn test_line_input_sides() {
        let debit = LineInput::new(AccountId::new(), LineSide::Debit, dec!(100));
        assert_eq!(debit.debit, dec!(100));
        assert_eq!(debit.credit, Decimal::ZERO);

        let credit = LineInput::new(AccountId::new(), LineSide::Credit, dec!(100));
        assert_eq!(credit.debit, Decimal::ZERO);
        assert_eq!(credit.credit, dec!(100));
    }

    #[test]
    fn test_totals_balanced() {
        let totals = PostingTotals::new(dec!(100.00), dec!(100.00));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_totals_unbalanced() {
        let totals = PostingTotals::new(dec!(100.00), dec!(50.00));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(50.00));
    }
}
