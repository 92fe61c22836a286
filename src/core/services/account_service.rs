use std::collections::HashSet;

use tracing::info;

use crate::domain::account::{validate_account_type, Account};
use crate::domain::AccountBook;

use super::{ServiceError, ServiceResult};

/// Validation boundary for account create/update requests.
pub struct AccountService;

impl AccountService {
    pub fn add(book: &mut AccountBook, account: Account) -> ServiceResult<()> {
        Self::validate_name(book, None, &account.name)?;
        if book.account(&account.id).is_some() {
            return Err(ServiceError::Invalid(format!(
                "Account id `{}` already exists",
                account.id
            )));
        }
        Self::validate_balance(&account)?;
        if let Some(parent_id) = account.parent_id.as_deref() {
            Self::ensure_parent_exists(book, parent_id)?;
        }
        info!(account = %account.id, name = %account.name, "account added");
        book.accounts.push(account);
        book.touch();
        Ok(())
    }

    /// Replaces the editable fields of `id` with those of `changes`.
    pub fn edit(book: &mut AccountBook, id: &str, changes: Account) -> ServiceResult<()> {
        if book.account(id).is_none() {
            return Err(ServiceError::NotFound(format!("Account `{}`", id)));
        }
        Self::validate_name(book, Some(id), &changes.name)?;
        Self::validate_balance(&changes)?;
        if let Some(parent_id) = changes.parent_id.as_deref() {
            Self::ensure_parent_exists(book, parent_id)?;
            Self::ensure_not_descendant(book, id, parent_id)?;
        }

        let account = book
            .account_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("Account `{}`", id)))?;
        account.parent_id = changes.parent_id;
        account.name = changes.name;
        account.kind = changes.kind;
        account.currency = changes.currency;
        account.balance = changes.balance;
        account.limit = changes.limit;
        account.icon = changes.icon;
        book.touch();
        Ok(())
    }

    pub fn remove(book: &mut AccountBook, id: &str) -> ServiceResult<()> {
        if book.children_of(id).next().is_some() {
            return Err(ServiceError::Invalid(
                "Account has sub-accounts".into(),
            ));
        }
        let before = book.accounts.len();
        book.accounts.retain(|account| account.id != id);
        if book.accounts.len() == before {
            return Err(ServiceError::NotFound(format!("Account `{}`", id)));
        }
        book.touch();
        Ok(())
    }

    pub fn list(book: &AccountBook) -> Vec<&Account> {
        book.accounts.iter().collect()
    }

    fn validate_name(book: &AccountBook, exclude: Option<&str>, candidate: &str) -> ServiceResult<()> {
        let normalized = candidate.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ServiceError::Invalid("Account name is required".into()));
        }
        let duplicate = book.accounts.iter().any(|account| {
            let name = account.name.trim().to_lowercase();
            name == normalized && exclude.map_or(true, |id| account.id != id)
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "Account `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }

    fn validate_balance(account: &Account) -> ServiceResult<()> {
        if validate_account_type(account.kind, account.balance, account.limit) {
            Ok(())
        } else {
            Err(ServiceError::Invalid(format!(
                "{:?} account `{}`: {}",
                account.kind,
                account.name,
                account.kind.balance_rule()
            )))
        }
    }

    fn ensure_parent_exists(book: &AccountBook, parent_id: &str) -> ServiceResult<()> {
        if book.account(parent_id).is_some() {
            Ok(())
        } else {
            Err(ServiceError::Invalid(
                "Parent account does not exist".into(),
            ))
        }
    }

    /// Rejects moving `id` under itself or any of its descendants.
    fn ensure_not_descendant(book: &AccountBook, id: &str, parent_id: &str) -> ServiceResult<()> {
        let mut seen = HashSet::new();
        let mut current = Some(parent_id);
        while let Some(candidate) = current {
            if candidate == id {
                return Err(ServiceError::Invalid(
                    "Account cannot be nested under itself".into(),
                ));
            }
            if !seen.insert(candidate) {
                break;
            }
            current = book
                .account(candidate)
                .and_then(|account| account.parent_id.as_deref());
        }
        Ok(())
    }
}
