//! Recurring scheduler error types.
//!
//! These never escape `trigger()`: per-instance failures are recorded in
//! history with the error message and counted in the aggregate outcome.

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Errors that can occur while executing a recurring instance.
#[derive(Debug, Error)]
pub enum RecurringError {
    /// Definition not found.
    #[error("Recurring definition not found: {0}")]
    DefinitionNotFound(Uuid),

    /// Definition has no template lines.
    #[error("Recurring definition {0} has no template lines")]
    EmptyTemplate(Uuid),

    /// Definition is inactive.
    #[error("Recurring definition {0} is inactive")]
    InactiveDefinition(Uuid),

    /// Tax snapshot lookup failed; retried on the next natural due date.
    #[error("Tax rate lookup failed for {tax_rate_id}: {message}")]
    TaxLookup {
        /// The tax rate that could not be resolved.
        tax_rate_id: Uuid,
        /// Provider error message.
        message: String,
    },

    /// Another trigger call holds the claim for this instance.
    #[error("Recurring instance is claimed by another worker")]
    ClaimContention,

    /// The generated line set failed ledger validation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl RecurringError {
    /// Returns true if the failure is transient and worth retrying on the
    /// next due date without operator intervention.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TaxLookup { .. } | Self::ClaimContention | Self::Database(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(
            RecurringError::TaxLookup {
                tax_rate_id: Uuid::nil(),
                message: "unavailable".to_string(),
            }
            .is_retryable()
        );
        assert!(RecurringError::ClaimContention.is_retryable());
        assert!(!RecurringError::EmptyTemplate(Uuid::nil()).is_retryable());
        assert!(!RecurringError::Ledger(LedgerError::InsufficientLines).is_retryable());
    }

    #[test]
    fn test_ledger_error_passthrough_display() {
        let err = RecurringError::from(LedgerError::InsufficientLines);
        assert_eq!(err.to_string(), "Journal entry must have at least 2 lines");
    }
}
