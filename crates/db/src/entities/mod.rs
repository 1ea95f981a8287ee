//! `SeaORM` entity definitions.

pub mod accounts;
pub mod companies;
pub mod entry_counters;
pub mod fiscal_periods;
pub mod journal_entries;
pub mod journal_lines;
pub mod recurring_definitions;
pub mod recurring_history;
pub mod recurring_lines;
pub mod sea_orm_active_enums;
