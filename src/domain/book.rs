use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::Account;

/// A named, persisted collection of flat account rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountBook {
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountBook {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            accounts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Wraps rows loaded from elsewhere into an unnamed book.
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let mut book = Self::new("accounts");
        book.accounts = accounts;
        book
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    /// Direct children of `id`, in storage order.
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Account> + 'a {
        self.accounts
            .iter()
            .filter(move |account| account.parent_id.as_deref() == Some(id))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
