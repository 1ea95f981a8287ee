//! Account types and posting rules.
//!
//! Accounts form a per-company hierarchy. Header accounts group leaf
//! accounts and never receive postings; only active leaf accounts are
//! postable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CompanyId};

/// Account classification in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, receivables, equipment).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// The normal balance side for this account type.
    ///
    /// Asset/Expense accounts are debit-normal; Liability/Equity/Revenue
    /// accounts are credit-normal.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }
}

/// The side on which an account's balance normally grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal: debits increase the balance.
    Debit,
    /// Credit-normal: credits increase the balance.
    Credit,
}

impl NormalBalance {
    /// Signed balance change produced by a (debit, credit) pair.
    #[must_use]
    pub fn signed_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Company this account belongs to.
    pub company_id: CompanyId,
    /// Account code, unique per company (e.g., "1100").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Parent account for hierarchy (headers group leaves).
    pub parent_id: Option<AccountId>,
    /// Header accounts group children and cannot receive postings.
    pub is_header: bool,
    /// Inactive accounts are soft-deactivated, never deleted.
    pub is_active: bool,
}

impl Account {
    /// Returns true if lines may be posted to this account.
    ///
    /// Header accounts and inactive accounts are not postable.
    #[must_use]
    pub fn is_postable(&self) -> bool {
        self.is_active && !self.is_header
    }

    /// The normal balance side of this account.
    #[must_use]
    pub const fn normal_balance(&self) -> NormalBalance {
        self.account_type.normal_balance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_account(is_header: bool, is_active: bool) -> Account {
        Account {
            id: AccountId::new(),
            company_id: CompanyId::new(),
            code: "1100".to_string(),
            name: "Cash".to_string(),
            account_type: AccountType::Asset,
            parent_id: None,
            is_header,
            is_active,
        }
    }

    #[test]
    fn test_normal_balance_per_type() {
        assert_eq!(AccountType::Asset.normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Expense.normal_balance(), NormalBalance::Debit);
        assert_eq!(
            AccountType::Liability.normal_balance(),
            NormalBalance::Credit
        );
        assert_eq!(AccountType::Equity.normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Revenue.normal_balance(), NormalBalance::Credit);
    }

    #[test]
    fn test_signed_change_debit_normal() {
        let n = NormalBalance::Debit;
        assert_eq!(n.signed_change(dec!(100), dec!(0)), dec!(100));
        assert_eq!(n.signed_change(dec!(0), dec!(40)), dec!(-40));
    }

    #[test]
    fn test_signed_change_credit_normal() {
        let n = NormalBalance::Credit;
        assert_eq!(n.signed_change(dec!(0), dec!(100)), dec!(100));
        assert_eq!(n.signed_change(dec!(40), dec!(0)), dec!(-40));
    }

    #[test]
    fn test_leaf_active_account_is_postable() {
        assert!(make_account(false, true).is_postable());
    }

    #[test]
    fn test_header_account_is_not_postable() {
        assert!(!make_account(true, true).is_postable());
    }

    #[test]
    fn test_inactive_account_is_not_postable() {
        assert!(!make_account(false, false).is_postable());
    }
}
