//! Reversal building for voiding posted entries.
//!
//! Voiding never edits the original entry: a new reversing entry is created
//! with debits and credits swapped on every line, dated at void time and
//! linked back to the original.

use rust_decimal::Decimal;

use super::types::LineInput;
use tally_shared::types::JournalEntryId;

/// A posted line as read back from the ledger, input to reversal building.
#[derive(Debug, Clone)]
pub struct PostedLine {
    /// The account the original line posted to.
    pub account_id: tally_shared::types::AccountId,
    /// Debit amount of the original line.
    pub debit: Decimal,
    /// Credit amount of the original line.
    pub credit: Decimal,
    /// Tax rate frozen into the original line, if any.
    pub tax_rate: Option<Decimal>,
    /// Memo of the original line.
    pub memo: Option<String>,
}

/// Output of reversal building.
#[derive(Debug)]
pub struct Reversal {
    /// The entry being voided.
    pub original_entry_id: JournalEntryId,
    /// The reversing lines, debit/credit swapped.
    pub lines: Vec<LineInput>,
    /// Description for the reversing entry.
    pub description: String,
}

/// Stateless builder for reversing entries.
pub struct ReversalBuilder;

impl ReversalBuilder {
    /// Build reversing lines by swapping debits and credits.
    ///
    /// All amounts and the frozen tax rate are preserved; the memo is
    /// prefixed with "Reversal: ".
    #[must_use]
    pub fn build(
        original_entry_id: JournalEntryId,
        original_lines: &[PostedLine],
        reason: &str,
    ) -> Reversal {
        let lines = original_lines
            .iter()
            .map(|line| LineInput {
                account_id: line.account_id,
                debit: line.credit,
                credit: line.debit,
                tax_rate: line.tax_rate,
                memo: Some(format!(
                    "Reversal: {}",
                    line.memo.clone().unwrap_or_default()
                )),
            })
            .collect();

        Reversal {
            original_entry_id,
            lines,
            description: format!("Reversal of entry {original_entry_id}. Reason: {reason}"),
        }
    }

    /// Validate that the original lines are balanced.
    ///
    /// Always true for posted entries; checked again before writing the
    /// reversal.
    #[must_use]
    pub fn is_balanced(original_lines: &[PostedLine]) -> bool {
        let debit: Decimal = original_lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = original_lines.iter().map(|l| l.credit).sum();
        debit == credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::AccountId;

    fn posted_pair() -> Vec<PostedLine> {
        vec![
            PostedLine {
                account_id: AccountId::new(),
                debit: dec!(100.00),
                credit: Decimal::ZERO,
                tax_rate: None,
                memo: Some("Office supplies".to_string()),
            },
            PostedLine {
                account_id: AccountId::new(),
                debit: Decimal::ZERO,
                credit: dec!(100.00),
                tax_rate: Some(dec!(0.10)),
                memo: None,
            },
        ]
    }

    #[test]
    fn test_build_swaps_sides() {
        let lines = posted_pair();
        let reversal = ReversalBuilder::build(JournalEntryId::new(), &lines, "Duplicate");

        assert_eq!(reversal.lines.len(), 2);
        // First line was a debit; reversal credits it
        assert_eq!(reversal.lines[0].debit, Decimal::ZERO);
        assert_eq!(reversal.lines[0].credit, dec!(100.00));
        // Second line was a credit; reversal debits it
        assert_eq!(reversal.lines[1].debit, dec!(100.00));
        assert_eq!(reversal.lines[1].credit, Decimal::ZERO);
    }

    #[test]
    fn test_build_preserves_accounts_and_tax() {
        let lines = posted_pair();
        let account = lines[1].account_id;
        let reversal = ReversalBuilder::build(JournalEntryId::new(), &lines, "Error");

        assert_eq!(reversal.lines[1].account_id, account);
        assert_eq!(reversal.lines[1].tax_rate, Some(dec!(0.10)));
    }

    #[test]
    fn test_build_memo_and_description() {
        let original = JournalEntryId::new();
        let reversal = ReversalBuilder::build(original, &posted_pair(), "Duplicate entry");

        assert!(
            reversal.lines[0]
                .memo
                .as_ref()
                .unwrap()
                .starts_with("Reversal: ")
        );
        assert!(reversal.description.contains(&original.to_string()));
        assert!(reversal.description.contains("Duplicate entry"));
    }

    #[test]
    fn test_reversal_of_balanced_lines_is_balanced() {
        let lines = posted_pair();
        assert!(ReversalBuilder::is_balanced(&lines));

        let reversal = ReversalBuilder::build(JournalEntryId::new(), &lines, "x");
        let debit: Decimal = reversal.lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = reversal.lines.iter().map(|l| l.credit).sum();
        assert_eq!(debit, credit);
    }

    #[test]
    fn test_is_balanced_detects_skew() {
        let mut lines = posted_pair();
        lines[1].credit = dec!(50.00);
        assert!(!ReversalBuilder::is_balanced(&lines));
    }
}
