//! Fiscal period gating.
//!
//! Posting requires the entry date to fall inside an open accounting period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CompanyId, FiscalPeriodId};

/// Status of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period is open for postings.
    Open,
    /// Period is closed; postings are rejected.
    Closed,
}

/// An accounting period within a company's fiscal calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Company this period belongs to.
    pub company_id: CompanyId,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// Start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// End date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
}

impl FiscalPeriod {
    /// Returns true if entries can be posted to this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn january() -> FiscalPeriod {
        FiscalPeriod {
            id: FiscalPeriodId::new(),
            company_id: CompanyId::new(),
            name: "January 2026".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            status: PeriodStatus::Open,
        }
    }

    #[test]
    fn test_open_period_allows_posting() {
        assert!(january().is_open());
    }

    #[test]
    fn test_closed_period_rejects_posting() {
        let mut period = january();
        period.status = PeriodStatus::Closed;
        assert!(!period.is_open());
    }

    #[test]
    fn test_contains_date_bounds() {
        let period = january();
        assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
        assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
    }
}
