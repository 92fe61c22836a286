use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::currency::{convert, Currency, RateSource};
use crate::domain::account::AccountKind;
use crate::errors::HierarchyError;
use crate::hierarchy::{AccountHierarchy, NodeId};

/// One account of a [`RolledTree`], decorated with its value in the display
/// currency.
///
/// `own_value` is the account's balance converted on its own; `rolled_value`
/// adds the rolled values of all children. `parent` and `children` are slots
/// in the owning tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RolledNode {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
    pub currency: Currency,
    pub balance: f64,
    pub own_value: f64,
    pub rolled_value: f64,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// A rolled-up subtree, stored flat in pre-order.
///
/// The first slot is the subtree root, so a tree is never empty. Deep chains
/// stay flat in memory and in JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RolledTree {
    nodes: Vec<RolledNode>,
}

impl RolledTree {
    pub fn root(&self) -> &RolledNode {
        &self.nodes[0]
    }

    pub fn rolled_value(&self) -> f64 {
        self.root().rolled_value
    }

    /// Number of accounts in the subtree, root included.
    pub fn account_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in pre-order.
    pub fn nodes(&self) -> &[RolledNode] {
        &self.nodes
    }

    /// Pre-order walk yielding each node with its depth below the root.
    pub fn flatten(&self) -> impl Iterator<Item = (usize, &RolledNode)> {
        self.nodes.iter().map(|node| (node.depth, node))
    }

    pub fn find(&self, id: &str) -> Option<&RolledNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn children<'t>(&'t self, node: &'t RolledNode) -> impl Iterator<Item = &'t RolledNode> {
        node.children.iter().filter_map(move |slot| self.nodes.get(*slot))
    }
}

/// Rolls `root` and its descendants up into `display_currency`.
///
/// Each balance is converted before being added, never the other way round.
/// Revisiting an account id (parent cycle or duplicate ids) stops the walk
/// with [`HierarchyError::Structural`]; a `root` from another hierarchy is
/// rejected with [`HierarchyError::UnknownNode`].
pub fn compute_rollup(
    hierarchy: &AccountHierarchy,
    root: NodeId,
    display_currency: Currency,
    rates: &impl RateSource,
) -> Result<RolledTree, HierarchyError> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut nodes: Vec<RolledNode> = Vec::new();
    // (node, parent slot, depth). Children go on in reverse so they come off
    // in input order.
    let mut pending: Vec<(NodeId, Option<usize>, usize)> = vec![(root, None, 0)];

    while let Some((id, parent, depth)) = pending.pop() {
        let node = hierarchy
            .get(id)
            .ok_or(HierarchyError::UnknownNode { index: id.index() })?;
        let account = &node.account;
        if !visited.insert(account.id.as_str()) {
            return Err(HierarchyError::Structural {
                account_id: account.id.clone(),
            });
        }

        let own_value = convert(account.balance, account.currency, display_currency, rates)?;
        let slot = nodes.len();
        if let Some(parent) = parent {
            nodes[parent].children.push(slot);
        }
        nodes.push(RolledNode {
            id: account.id.clone(),
            name: account.name.clone(),
            kind: account.kind,
            currency: account.currency,
            balance: account.balance,
            own_value,
            rolled_value: own_value,
            depth,
            parent,
            children: Vec::new(),
        });
        pending.extend(
            node.children
                .iter()
                .rev()
                .map(|child| (*child, Some(slot), depth + 1)),
        );
    }

    // Descendants always sit after their ancestors, so sweeping backwards
    // folds each subtree total into its parent only once it is complete.
    for slot in (1..nodes.len()).rev() {
        if let Some(parent) = nodes[slot].parent {
            let value = nodes[slot].rolled_value;
            nodes[parent].rolled_value += value;
        }
    }

    let tree = RolledTree { nodes };
    debug!(
        root = %tree.root().id,
        accounts = tree.account_count(),
        currency = %display_currency,
        value = tree.rolled_value(),
        "account rollup computed"
    );
    Ok(tree)
}

/// Rolls up every root of `hierarchy`, in root order.
pub fn rollup_roots(
    hierarchy: &AccountHierarchy,
    display_currency: Currency,
    rates: &impl RateSource,
) -> Result<Vec<RolledTree>, HierarchyError> {
    hierarchy
        .roots()
        .iter()
        .map(|root| compute_rollup(hierarchy, *root, display_currency, rates))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::RateTable;
    use crate::domain::account::Account;
    use crate::errors::CurrencyError;
    use crate::hierarchy::build_hierarchy;

    const VND_PER_USD: f64 = 25_000.0;

    fn rates() -> RateTable {
        RateTable::new()
            .with_rate(Currency::Vnd, Currency::Usd, 1.0 / VND_PER_USD)
            .unwrap()
            .with_rate(Currency::Usd, Currency::Vnd, VND_PER_USD)
            .unwrap()
    }

    fn account(id: &str, parent: Option<&str>, balance: f64, currency: Currency) -> Account {
        let account = Account::new(id, AccountKind::Saving, currency)
            .with_id(id)
            .with_balance(balance);
        match parent {
            Some(parent) => account.with_parent(parent),
            None => account,
        }
    }

    fn root_rollup(accounts: &[Account], display: Currency) -> Result<RolledTree, HierarchyError> {
        let hierarchy = build_hierarchy(accounts);
        compute_rollup(&hierarchy, hierarchy.roots()[0], display, &rates())
    }

    fn assert_additive(tree: &RolledTree) {
        for node in tree.nodes() {
            let children: f64 = tree.children(node).map(|child| child.rolled_value).sum();
            assert!((node.rolled_value - (node.own_value + children)).abs() < 1e-9);
        }
    }

    fn chain(len: usize) -> Vec<Account> {
        (0..len)
            .map(|idx| {
                let id = format!("n{idx}");
                let parent = idx.checked_sub(1).map(|prev| format!("n{prev}"));
                account(&id, parent.as_deref(), 1.0, Currency::Usd)
            })
            .collect()
    }

    #[test]
    fn rolls_up_a_chain() {
        let accounts = vec![
            account("A", None, 100.0, Currency::Usd),
            account("B", Some("A"), 50.0, Currency::Usd),
            account("C", Some("B"), 25.0, Currency::Usd),
        ];
        let rolled = root_rollup(&accounts, Currency::Usd).unwrap();

        assert_eq!(rolled.rolled_value(), 175.0);
        assert_eq!(rolled.find("B").unwrap().rolled_value, 75.0);
        assert_eq!(rolled.find("C").unwrap().rolled_value, 25.0);
        assert_additive(&rolled);
    }

    #[test]
    fn rollup_is_deterministic() {
        let accounts = vec![
            account("A", None, 10.0, Currency::Usd),
            account("B", Some("A"), 250_000.0, Currency::Vnd),
            account("C", Some("A"), 3.5, Currency::Usd),
        ];
        let first = build_hierarchy(&accounts);
        let second = build_hierarchy(&accounts);
        let rates = rates();

        assert_eq!(
            rollup_roots(&first, Currency::Usd, &rates).unwrap(),
            rollup_roots(&second, Currency::Usd, &rates).unwrap()
        );
    }

    #[test]
    fn two_node_cycle_is_a_structural_error() {
        let accounts = vec![
            account("A", Some("B"), 1.0, Currency::Usd),
            account("B", Some("A"), 1.0, Currency::Usd),
        ];
        let hierarchy = build_hierarchy(&accounts);

        for name in ["A", "B"] {
            let node = hierarchy.find(name).unwrap();
            let err = compute_rollup(&hierarchy, node, Currency::Usd, &rates()).unwrap_err();
            assert!(matches!(err, HierarchyError::Structural { .. }), "{err}");
        }
        assert!(rollup_roots(&hierarchy, Currency::Usd, &rates()).is_err());
    }

    #[test]
    fn duplicate_child_ids_are_a_structural_error() {
        let accounts = vec![
            account("A", None, 1.0, Currency::Usd),
            account("B", Some("A"), 1.0, Currency::Usd),
            account("B", Some("A"), 1.0, Currency::Usd),
        ];
        let err = root_rollup(&accounts, Currency::Usd).unwrap_err();
        assert_eq!(
            err,
            HierarchyError::Structural {
                account_id: "B".into()
            }
        );
    }

    #[test]
    fn converts_leaves_before_summing() {
        let accounts = vec![
            account("root", None, 100.0, Currency::Usd),
            account("vnd", Some("root"), 2_500_000.0, Currency::Vnd),
            account("usd", Some("root"), 20.0, Currency::Usd),
        ];
        let rolled = root_rollup(&accounts, Currency::Usd).unwrap();

        let leaf_first = 100.0 + 2_500_000.0 / VND_PER_USD + 20.0;
        assert!((rolled.rolled_value() - leaf_first).abs() < 1e-9);
        assert!((rolled.find("vnd").unwrap().own_value - 100.0).abs() < 1e-9);

        // Adding raw balances across currencies and converting once at the end
        // treats every amount as if it were in the root's currency.
        let raw_sum_then_convert = 100.0 + 2_500_000.0 + 20.0;
        assert!((rolled.rolled_value() - raw_sum_then_convert).abs() > 1.0);
    }

    #[test]
    fn mixed_subtree_in_vnd_display() {
        let accounts = vec![
            account("root", None, 1_000_000.0, Currency::Vnd),
            account("usd", Some("root"), 4.0, Currency::Usd),
        ];
        let rolled = root_rollup(&accounts, Currency::Vnd).unwrap();
        assert!((rolled.rolled_value() - 1_100_000.0).abs() < 1e-6);
        assert_eq!(rolled.find("usd").unwrap().balance, 4.0);
    }

    #[test]
    fn missing_rate_is_reported() {
        let accounts = vec![account("vnd", None, 5.0, Currency::Vnd)];
        let hierarchy = build_hierarchy(&accounts);
        let err = compute_rollup(&hierarchy, hierarchy.roots()[0], Currency::Usd, &RateTable::new())
            .unwrap_err();
        assert_eq!(
            err,
            HierarchyError::Conversion(CurrencyError::RateNotFound {
                from: Currency::Vnd,
                to: Currency::Usd
            })
        );
    }

    #[test]
    fn rollup_leaves_the_hierarchy_untouched() {
        let accounts = vec![
            account("A", None, 1.0, Currency::Usd),
            account("B", Some("A"), 2.0, Currency::Usd),
        ];
        let hierarchy = build_hierarchy(&accounts);
        let before = hierarchy.clone();
        rollup_roots(&hierarchy, Currency::Usd, &rates()).unwrap();
        assert_eq!(hierarchy, before);
    }

    #[test]
    fn flatten_reports_depths_in_pre_order() {
        let accounts = vec![
            account("A", None, 1.0, Currency::Usd),
            account("B", Some("A"), 1.0, Currency::Usd),
            account("C", Some("B"), 1.0, Currency::Usd),
            account("D", Some("A"), 1.0, Currency::Usd),
        ];
        let rolled = root_rollup(&accounts, Currency::Usd).unwrap();
        let flat: Vec<(usize, &str)> = rolled
            .flatten()
            .map(|(depth, node)| (depth, node.id.as_str()))
            .collect();
        assert_eq!(flat, vec![(0, "A"), (1, "B"), (2, "C"), (1, "D")]);
    }

    #[test]
    fn deep_chain_rolls_up_without_recursion() {
        let accounts = chain(150_000);
        let hierarchy = build_hierarchy(&accounts);
        let rates = rates();
        let first = compute_rollup(&hierarchy, hierarchy.roots()[0], Currency::Usd, &rates).unwrap();
        let second = compute_rollup(&hierarchy, hierarchy.roots()[0], Currency::Usd, &rates).unwrap();

        assert_eq!(first.account_count(), 150_000);
        assert_eq!(first.rolled_value(), 150_000.0);
        assert_eq!(first.find("n149999").unwrap().depth, 149_999);
        assert_eq!(first.find("n100000").unwrap().rolled_value, 50_000.0);
        assert!(first == second);
        assert!(serde_json::to_string(&first).is_ok());
    }

    #[test]
    fn deep_chain_closing_into_a_cycle_is_still_reported() {
        let mut accounts = chain(120_000);
        accounts[0].parent_id = Some("n119999".into());
        let hierarchy = build_hierarchy(&accounts);
        let start = hierarchy.find("n0").unwrap();
        let err = compute_rollup(&hierarchy, start, Currency::Usd, &rates()).unwrap_err();
        assert_eq!(
            err,
            HierarchyError::Structural {
                account_id: "n0".into()
            }
        );
    }

    #[test]
    fn foreign_node_id_is_rejected() {
        let big = build_hierarchy(&chain(3));
        let small = build_hierarchy(&chain(1));
        let foreign = big.find("n2").unwrap();
        let err = compute_rollup(&small, foreign, Currency::Usd, &rates()).unwrap_err();
        assert_eq!(err, HierarchyError::UnknownNode { index: 2 });
    }
}
