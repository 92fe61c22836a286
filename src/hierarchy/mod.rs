//! Parent/child account trees built from flat storage rows.
//!
//! Nodes live in an arena indexed by [`NodeId`]; parent links are resolved by
//! id lookup in a single pass, so construction never follows a chain of
//! parents. Parent-pointer cycles are kept as-is in the arena and only
//! rejected when a rollup walks into them.

pub mod rollup;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::account::Account;

pub use rollup::{compute_rollup, rollup_roots, RolledNode, RolledTree};

/// Index of a node inside an [`AccountHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An account plus the resolved links to its parent and children.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountNode {
    pub account: Account,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Tree projection of a flat account list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountHierarchy {
    nodes: Vec<AccountNode>,
    roots: Vec<NodeId>,
    dangling: Vec<NodeId>,
    cyclic: Vec<NodeId>,
}

impl AccountHierarchy {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `None` when `id` is out of range for this hierarchy.
    pub fn get(&self, id: NodeId) -> Option<&AccountNode> {
        self.nodes.get(id.0)
    }

    /// Root nodes in the relative order they had in the input.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn root_nodes(&self) -> impl Iterator<Item = &AccountNode> {
        self.roots.iter().filter_map(move |id| self.get(*id))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &AccountNode> {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(move |child| self.get(*child))
    }

    /// Nodes whose `parent_id` did not match any account in the input.
    pub fn dangling(&self) -> &[NodeId] {
        &self.dangling
    }

    /// Nodes sitting on a parent-pointer cycle. They are also listed as roots.
    pub fn cyclic(&self) -> &[NodeId] {
        &self.cyclic
    }

    /// First node carrying `account_id`.
    pub fn find(&self, account_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.account.id == account_id)
            .map(NodeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &AccountNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Unvisited,
    Rooted,
    Detached,
}

/// Builds the account tree for a flat, unordered list of accounts.
///
/// An account becomes a root when it has no `parent_id`, when its
/// `parent_id` does not resolve, or when it lies on a parent cycle. The
/// result is a pure function of `accounts`.
pub fn build_hierarchy(accounts: &[Account]) -> AccountHierarchy {
    let mut lookup: HashMap<&str, usize> = HashMap::with_capacity(accounts.len());
    for (idx, account) in accounts.iter().enumerate() {
        lookup.entry(account.id.as_str()).or_insert(idx);
    }

    let mut nodes: Vec<AccountNode> = accounts
        .iter()
        .map(|account| AccountNode {
            account: account.clone(),
            parent: None,
            children: Vec::new(),
        })
        .collect();

    let mut dangling = Vec::new();
    for (idx, account) in accounts.iter().enumerate() {
        let Some(parent_id) = account.parent_id.as_deref() else {
            continue;
        };
        match lookup.get(parent_id) {
            Some(&parent) => {
                nodes[idx].parent = Some(NodeId(parent));
                nodes[parent].children.push(NodeId(idx));
            }
            None => {
                warn!(
                    account = %account.id,
                    parent = %parent_id,
                    "parent account not found; treating account as root"
                );
                dangling.push(NodeId(idx));
            }
        }
    }

    let on_cycle = cycle_members(&nodes);
    let mut cyclic = Vec::new();
    let mut roots = Vec::new();
    for (idx, node) in nodes.iter().enumerate() {
        if on_cycle[idx] {
            warn!(
                account = %node.account.id,
                "account is part of a parent cycle; listing it as root"
            );
            cyclic.push(NodeId(idx));
            roots.push(NodeId(idx));
        } else if node.parent.is_none() {
            roots.push(NodeId(idx));
        }
    }

    debug!(
        accounts = nodes.len(),
        roots = roots.len(),
        dangling = dangling.len(),
        cyclic = cyclic.len(),
        "account hierarchy built"
    );

    AccountHierarchy {
        nodes,
        roots,
        dangling,
        cyclic,
    }
}

/// Marks every node lying on a parent-pointer cycle.
///
/// Each node's parent chain is walked at most once overall: finished chains
/// are memoised as rooted (reaches a node without parent) or detached.
fn cycle_members(nodes: &[AccountNode]) -> Vec<bool> {
    let mut state = vec![Anchor::Unvisited; nodes.len()];
    let mut on_cycle = vec![false; nodes.len()];
    let mut path: Vec<usize> = Vec::new();
    let mut position: HashMap<usize, usize> = HashMap::new();

    for start in 0..nodes.len() {
        if state[start] != Anchor::Unvisited {
            continue;
        }
        path.clear();
        position.clear();

        let mut current = start;
        let outcome = loop {
            if state[current] != Anchor::Unvisited {
                break state[current];
            }
            if let Some(&pos) = position.get(&current) {
                for &member in &path[pos..] {
                    on_cycle[member] = true;
                }
                break Anchor::Detached;
            }
            position.insert(current, path.len());
            path.push(current);
            match nodes[current].parent {
                Some(parent) => current = parent.0,
                None => break Anchor::Rooted,
            }
        };

        for &visited in &path {
            state[visited] = outcome;
        }
    }

    on_cycle
}
