use serde::Serialize;
use tracing::{error, info};

use crate::currency::{Currency, RateSource};
use crate::domain::account::Account;
use crate::hierarchy::{build_hierarchy, rollup_roots, RolledTree};

use super::ServiceResult;

/// Rendering-ready result of one aggregation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyReport {
    pub currency: Currency,
    pub roots: Vec<RolledTree>,
    /// Accounts whose parent could not be found; they are listed as roots.
    pub dangling: Vec<String>,
    pub assets: f64,
    pub liabilities: f64,
}

impl HierarchyReport {
    pub fn net_total(&self) -> f64 {
        self.assets + self.liabilities
    }

    pub fn account_count(&self) -> usize {
        self.roots.iter().map(RolledTree::account_count).sum()
    }
}

pub struct HierarchyService;

impl HierarchyService {
    /// Builds the tree for `accounts` and rolls every root up into
    /// `display_currency`.
    ///
    /// Every account's own converted value counts towards assets or
    /// liabilities by its own kind, wherever it sits in the tree.
    pub fn summarize(
        accounts: &[Account],
        display_currency: Currency,
        rates: &impl RateSource,
    ) -> ServiceResult<HierarchyReport> {
        let hierarchy = build_hierarchy(accounts);
        let roots = rollup_roots(&hierarchy, display_currency, rates).map_err(|err| {
            error!(%err, "account rollup failed");
            err
        })?;

        let (liabilities, assets) = roots
            .iter()
            .flat_map(|root| root.nodes())
            .fold((0.0, 0.0), |(debt, held), node| {
                if node.kind.is_liability() {
                    (debt + node.own_value, held)
                } else {
                    (debt, held + node.own_value)
                }
            });
        let dangling = hierarchy
            .dangling()
            .iter()
            .filter_map(|id| hierarchy.get(*id))
            .map(|node| node.account.id.clone())
            .collect();

        let report = HierarchyReport {
            currency: display_currency,
            assets,
            liabilities,
            roots,
            dangling,
        };
        info!(
            accounts = accounts.len(),
            roots = report.roots.len(),
            currency = %display_currency,
            net = report.net_total(),
            "account hierarchy summarized"
        );
        Ok(report)
    }
}
