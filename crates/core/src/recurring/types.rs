//! Recurring scheduling types.

use serde::{Deserialize, Serialize};

use crate::ledger::LineSide;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, TaxRateId};

/// How often a recurring definition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every 7 days.
    Weekly,
    /// Every calendar month, day-of-month clamped.
    Monthly,
    /// Every 3 calendar months, day-of-month clamped.
    Quarterly,
    /// Every 12 calendar months, day-of-month clamped.
    Annual,
}

/// Outcome of one attempted execution, recorded in history.
///
/// The per-(definition, due date) state machine is
/// `SCHEDULED -> CLAIMED -> {SUCCESS, FAILED}`; only the terminal states are
/// persisted in history, the claim is a lease on the definition row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The instance produced a journal entry (posted or draft).
    Success,
    /// The instance failed; the error message is recorded.
    Failed,
}

/// One template line of a recurring definition.
#[derive(Debug, Clone)]
pub struct TemplateLine {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub side: LineSide,
    /// Base amount before tax gross-up (must be positive).
    pub amount: Decimal,
    /// Tax rate to snapshot at execution time, if tax-bearing.
    pub tax_rate_id: Option<TaxRateId>,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Aggregate result of one `trigger()` call.
///
/// Individual failures are data, not errors: the batch always completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOutcome {
    /// Definitions that were due and claimed.
    pub attempted: u64,
    /// Instances that produced an entry.
    pub succeeded: u64,
    /// Instances recorded as failed.
    pub failed: u64,
}

impl TriggerOutcome {
    /// Record one successful instance.
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    /// Record one failed instance.
    pub fn record_failure(&mut self) {
        self.attempted += 1;
        self.failed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_counters() {
        let mut outcome = TriggerOutcome::default();
        outcome.record_success();
        outcome.record_success();
        outcome.record_failure();

        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
    }
}
