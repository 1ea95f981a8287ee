//! `SeaORM` active enums mapped to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification (`account_type` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account (debit-normal).
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability account (credit-normal).
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity account (credit-normal).
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue account (credit-normal).
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense account (debit-normal).
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<AccountType> for tally_core::account::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<tally_core::account::AccountType> for AccountType {
    fn from(value: tally_core::account::AccountType) -> Self {
        use tally_core::account::AccountType as Core;
        match value {
            Core::Asset => Self::Asset,
            Core::Liability => Self::Liability,
            Core::Equity => Self::Equity,
            Core::Revenue => Self::Revenue,
            Core::Expense => Self::Expense,
        }
    }
}

/// Journal entry lifecycle (`entry_status` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Awaiting manual confirmation; no entry number yet.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Posted to the ledger; immutable.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Voided by a reversing entry; immutable.
    #[sea_orm(string_value = "void")]
    Void,
}

impl From<EntryStatus> for tally_core::ledger::EntryStatus {
    fn from(value: EntryStatus) -> Self {
        match value {
            EntryStatus::Draft => Self::Draft,
            EntryStatus::Posted => Self::Posted,
            EntryStatus::Void => Self::Void,
        }
    }
}

/// Where an entry originated (`entry_source` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_source")]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Entered manually by a user.
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Generated by the recurring scheduler.
    #[sea_orm(string_value = "recurring")]
    Recurring,
}

/// Fiscal period status (`fiscal_period_status` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "fiscal_period_status"
)]
#[serde(rename_all = "lowercase")]
pub enum FiscalPeriodStatus {
    /// Open for postings.
    #[sea_orm(string_value = "open")]
    Open,
    /// Closed; postings rejected.
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Recurring frequency (`recurring_frequency` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "recurring_frequency")]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    /// Every day.
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Every 7 days.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Every calendar month, clamped.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every 3 calendar months, clamped.
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// Every 12 calendar months, clamped.
    #[sea_orm(string_value = "annual")]
    Annual,
}

impl From<RecurringFrequency> for tally_core::recurring::Frequency {
    fn from(value: RecurringFrequency) -> Self {
        match value {
            RecurringFrequency::Daily => Self::Daily,
            RecurringFrequency::Weekly => Self::Weekly,
            RecurringFrequency::Monthly => Self::Monthly,
            RecurringFrequency::Quarterly => Self::Quarterly,
            RecurringFrequency::Annual => Self::Annual,
        }
    }
}

impl From<tally_core::recurring::Frequency> for RecurringFrequency {
    fn from(value: tally_core::recurring::Frequency) -> Self {
        use tally_core::recurring::Frequency as Core;
        match value {
            Core::Daily => Self::Daily,
            Core::Weekly => Self::Weekly,
            Core::Monthly => Self::Monthly,
            Core::Quarterly => Self::Quarterly,
            Core::Annual => Self::Annual,
        }
    }
}

/// Line side in a recurring template (`line_side` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "line_side")]
#[serde(rename_all = "lowercase")]
pub enum LineSide {
    /// Debit line.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit line.
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<LineSide> for tally_core::ledger::LineSide {
    fn from(value: LineSide) -> Self {
        match value {
            LineSide::Debit => Self::Debit,
            LineSide::Credit => Self::Credit,
        }
    }
}

/// Recurring execution outcome (`recurring_run_status` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "recurring_run_status"
)]
#[serde(rename_all = "lowercase")]
pub enum RecurringRunStatus {
    /// The instance produced a journal entry.
    #[sea_orm(string_value = "success")]
    Success,
    /// The instance failed; the message is recorded.
    #[sea_orm(string_value = "failed")]
    Failed,
}
