use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;
use crate::domain::common::Displayable;

/// A financial account as stored: flat, with an optional link to its parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Account {
    /// Creates a zero-balance root account with a fresh identifier.
    pub fn new(name: impl Into<String>, kind: AccountKind, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: None,
            name: name.into(),
            kind,
            currency,
            balance: 0.0,
            limit: None,
            icon: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether the stored balance satisfies the rules of the account kind.
    pub fn has_valid_balance(&self) -> bool {
        validate_account_type(self.kind, self.balance, self.limit)
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("{} ({:?}, {})", self.name, self.kind, self.currency)
    }
}

/// Enumerates the supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Payment,
    Saving,
    CreditCard,
    Debt,
    Invest,
    Lending,
}

impl AccountKind {
    pub const ALL: [AccountKind; 6] = [
        AccountKind::Payment,
        AccountKind::Saving,
        AccountKind::CreditCard,
        AccountKind::Debt,
        AccountKind::Invest,
        AccountKind::Lending,
    ];

    /// Credit cards and debts carry non-positive balances.
    pub fn is_liability(&self) -> bool {
        matches!(self, AccountKind::CreditCard | AccountKind::Debt)
    }

    /// Balance rules per kind. Every bound is inclusive, so a zero balance is
    /// always accepted. A credit card without a limit only needs a
    /// non-positive balance.
    pub fn accepts_balance(&self, balance: f64, limit: Option<f64>) -> bool {
        match self {
            AccountKind::Payment | AccountKind::Saving | AccountKind::Invest | AccountKind::Lending => {
                balance >= 0.0
            }
            AccountKind::CreditCard => {
                balance <= 0.0 && limit.map_or(true, |limit| balance >= -limit)
            }
            AccountKind::Debt => balance <= 0.0,
        }
    }

    /// Human readable rule, used in rejection messages.
    pub fn balance_rule(&self) -> &'static str {
        match self {
            AccountKind::Payment | AccountKind::Saving | AccountKind::Invest | AccountKind::Lending => {
                "balance must not be negative"
            }
            AccountKind::CreditCard => "balance must be between -limit and 0",
            AccountKind::Debt => "balance must not be positive",
        }
    }
}

/// Checks `balance` (and `limit` for credit cards) against the rules of `kind`.
///
/// Returns `false` on violation; rejecting the surrounding request is left to
/// the caller.
pub fn validate_account_type(kind: AccountKind, balance: f64, limit: Option<f64>) -> bool {
    kind.accepts_balance(balance, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_card_limit_is_inclusive() {
        assert!(validate_account_type(AccountKind::CreditCard, -500.0, Some(500.0)));
        assert!(!validate_account_type(AccountKind::CreditCard, -600.0, Some(500.0)));
        assert!(!validate_account_type(AccountKind::CreditCard, 1.0, Some(500.0)));
    }

    #[test]
    fn credit_card_without_limit_only_checks_sign() {
        assert!(validate_account_type(AccountKind::CreditCard, -1_000_000.0, None));
        assert!(!validate_account_type(AccountKind::CreditCard, 0.01, None));
    }

    #[test]
    fn debt_and_asset_boundaries() {
        assert!(validate_account_type(AccountKind::Debt, 0.0, None));
        assert!(!validate_account_type(AccountKind::Debt, 10.0, None));
        assert!(!validate_account_type(AccountKind::Saving, -1.0, None));
        assert!(validate_account_type(AccountKind::Lending, 42.0, None));
    }

    #[test]
    fn zero_balance_is_valid_for_every_kind() {
        for kind in AccountKind::ALL {
            assert!(validate_account_type(kind, 0.0, Some(0.0)), "{kind:?}");
            assert!(validate_account_type(kind, 0.0, None), "{kind:?}");
        }
    }

    #[test]
    fn deserializes_storage_rows() {
        let json = r#"{
            "id": "b",
            "parentId": "a",
            "name": "Visa",
            "type": "CreditCard",
            "currency": "VND",
            "balance": -250000,
            "limit": 5000000,
            "icon": "card"
        }"#;
        let account: Account = serde_json::from_str(json).expect("valid row");
        assert_eq!(account.parent_id.as_deref(), Some("a"));
        assert_eq!(account.kind, AccountKind::CreditCard);
        assert_eq!(account.currency, Currency::Vnd);
        assert_eq!(account.limit, Some(5_000_000.0));
        assert!(account.has_valid_balance());
    }

    #[test]
    fn new_accounts_get_unique_ids() {
        let first = Account::new("Wallet", AccountKind::Payment, Currency::Usd);
        let second = Account::new("Wallet", AccountKind::Payment, Currency::Usd);
        assert_ne!(first.id, second.id);
        assert!(first.parent_id.is_none());
    }
}
