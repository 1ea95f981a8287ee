//! Shared domain types.

pub mod id;
pub mod money;

pub use id::{
    AccountId, CompanyId, FiscalPeriodId, JournalEntryId, JournalLineId, RecurringDefinitionId,
    RecurringHistoryId, TaxRateId, UserId,
};
pub use money::{AMOUNT_SCALE, gross_up, round_amount};
