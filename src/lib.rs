#![doc(test(attr(deny(warnings))))]

//! Budget Accounts builds parent/child account trees from flat account rows,
//! rolls balances up into a single display currency, and validates balances
//! against the rules of each account kind.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod hierarchy;
pub mod storage;
pub mod utils;

pub use currency::{Currency, RateSource, RateTable};
pub use domain::{validate_account_type, Account, AccountBook, AccountKind};
pub use errors::{CurrencyError, HierarchyError, StorageError};
pub use hierarchy::{build_hierarchy, compute_rollup, AccountHierarchy, AccountNode, NodeId, RolledNode, RolledTree};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Accounts tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
