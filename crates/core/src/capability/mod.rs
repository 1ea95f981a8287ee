//! Role/tier capability gate.
//!
//! Permission checks are an enumerated capability set, not string
//! containment: every action the core exposes is a variant, and the gate
//! answers yes/no for a (role, tier) pair. Manual postings consult the gate;
//! scheduler postings bypass it (system-initiated, pre-authorized by the
//! definition's owner).

use serde::{Deserialize, Serialize};

/// User role within a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Company owner; full control.
    Owner,
    /// Administrator.
    Admin,
    /// Accountant; full ledger access.
    Accountant,
    /// Clerk; can draft and post but not void.
    Clerk,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Parse from the lowercase wire form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "accountant" => Some(Self::Accountant),
            "clerk" => Some(Self::Clerk),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

/// Subscription tier of the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Entry tier.
    Starter,
    /// Mid tier; unlocks recurring automation.
    Business,
    /// Top tier.
    Enterprise,
}

impl Tier {
    /// Parse from the lowercase wire form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "starter" => Some(Self::Starter),
            "business" => Some(Self::Business),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

/// Actions gated by role and tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create or post a journal entry.
    PostEntry,
    /// Void a posted entry.
    VoidEntry,
    /// Create or edit recurring definitions.
    ManageRecurring,
    /// Manually invoke the recurring trigger.
    TriggerRecurring,
    /// Read account ledgers and balances.
    ViewLedger,
}

/// Yes/no capability check consumed by the API layer.
pub trait CapabilityGate: Send + Sync {
    /// May `role` at `tier` perform `action`?
    fn is_allowed(&self, role: Role, tier: Tier, action: Action) -> bool;
}

/// Default policy matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyGate;

impl CapabilityGate for PolicyGate {
    fn is_allowed(&self, role: Role, tier: Tier, action: Action) -> bool {
        match action {
            Action::ViewLedger => true,
            Action::PostEntry => !matches!(role, Role::Viewer),
            Action::VoidEntry => matches!(role, Role::Owner | Role::Admin | Role::Accountant),
            Action::ManageRecurring | Action::TriggerRecurring => {
                tier >= Tier::Business
                    && matches!(role, Role::Owner | Role::Admin | Role::Accountant)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_viewer_cannot_post() {
        let gate = PolicyGate;
        assert!(!gate.is_allowed(Role::Viewer, Tier::Enterprise, Action::PostEntry));
        assert!(gate.is_allowed(Role::Viewer, Tier::Starter, Action::ViewLedger));
    }

    #[test]
    fn test_clerk_posts_but_cannot_void() {
        let gate = PolicyGate;
        assert!(gate.is_allowed(Role::Clerk, Tier::Starter, Action::PostEntry));
        assert!(!gate.is_allowed(Role::Clerk, Tier::Enterprise, Action::VoidEntry));
    }

    #[rstest]
    #[case(Role::Owner)]
    #[case(Role::Admin)]
    #[case(Role::Accountant)]
    fn test_senior_roles_void(#[case] role: Role) {
        assert!(PolicyGate.is_allowed(role, Tier::Starter, Action::VoidEntry));
    }

    #[test]
    fn test_recurring_requires_business_tier() {
        let gate = PolicyGate;
        assert!(!gate.is_allowed(Role::Owner, Tier::Starter, Action::ManageRecurring));
        assert!(gate.is_allowed(Role::Owner, Tier::Business, Action::ManageRecurring));
        assert!(gate.is_allowed(Role::Accountant, Tier::Enterprise, Action::TriggerRecurring));
        assert!(!gate.is_allowed(Role::Clerk, Tier::Enterprise, Action::TriggerRecurring));
    }

    #[test]
    fn test_role_and_tier_parsing() {
        assert_eq!(Role::parse("accountant"), Some(Role::Accountant));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Tier::parse("business"), Some(Tier::Business));
        assert_eq!(Tier::parse(""), None);
    }
}
