//! Ledger error types for validation and state errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Line amount cannot be zero.
    #[error("Line amount cannot be zero")]
    ZeroAmount,

    /// Line amount cannot be negative.
    #[error("Line amount cannot be negative")]
    NegativeAmount,

    /// A line must carry either a debit or a credit, never both.
    #[error("Line must carry either a debit or a credit, not both")]
    BothSidesSet,

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account belongs to a different company.
    #[error("Account {0} belongs to a different company")]
    CompanyMismatch(Uuid),

    /// Account is a header or inactive and cannot receive postings.
    #[error("Account {0} is not postable")]
    AccountNotPostable(Uuid),

    // ========== Fiscal Period Errors ==========
    /// No fiscal period covers the posting date.
    #[error("No fiscal period found for date {0}")]
    NoFiscalPeriod(NaiveDate),

    /// The fiscal period covering the posting date is closed.
    #[error("Fiscal period is closed, no posting allowed")]
    PeriodClosed,

    // ========== Entry State Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Only posted entries can be voided.
    #[error("Only posted entries can be voided")]
    CannotVoidUnposted,

    /// Only draft entries can be promoted to posted.
    #[error("Only draft entries can be posted")]
    NotADraft,

    // ========== Concurrency Errors ==========
    /// Entry number contention; retried internally, surfaced only when
    /// retries exhaust.
    #[error("Entry number assignment contention, please retry")]
    ConcurrentNumberAssignment,

    // ========== Infrastructure ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::BothSidesSet => "BOTH_SIDES_SET",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::CompanyMismatch(_) => "COMPANY_MISMATCH",
            Self::AccountNotPostable(_) => "ACCOUNT_NOT_POSTABLE",
            Self::NoFiscalPeriod(_) => "NO_FISCAL_PERIOD",
            Self::PeriodClosed => "PERIOD_CLOSED",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::CannotVoidUnposted => "CANNOT_VOID_UNPOSTED",
            Self::NotADraft => "NOT_A_DRAFT",
            Self::ConcurrentNumberAssignment => "CONCURRENT_NUMBER_ASSIGNMENT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InsufficientLines
            | Self::UnbalancedEntry { .. }
            | Self::ZeroAmount
            | Self::NegativeAmount
            | Self::BothSidesSet
            | Self::CompanyMismatch(_)
            | Self::AccountNotPostable(_)
            | Self::CannotVoidUnposted
            | Self::NotADraft => 400,

            Self::NoFiscalPeriod(_) | Self::PeriodClosed => 422,

            Self::AccountNotFound(_) | Self::EntryNotFound(_) => 404,

            Self::ConcurrentNumberAssignment => 409,

            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentNumberAssignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientLines.error_code(),
            "INSUFFICIENT_LINES"
        );
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: dec!(100),
                credit: dec!(50),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(LedgerError::PeriodClosed.error_code(), "PERIOD_CLOSED");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InsufficientLines.http_status_code(), 400);
        assert_eq!(LedgerError::PeriodClosed.http_status_code(), 422);
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::ConcurrentNumberAssignment.http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::Database("x".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentNumberAssignment.is_retryable());
        assert!(!LedgerError::InsufficientLines.is_retryable());
        assert!(!LedgerError::PeriodClosed.is_retryable());
    }

    #[test]
    fn test_unbalanced_display() {
        let err = LedgerError::UnbalancedEntry {
            debit: dec!(100.00),
            credit: dec!(90.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 100.00, Credit: 90.00"
        );
    }
}
