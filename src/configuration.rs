//! The active configuration: an insertion-ordered, deduplicated,
//! document-order-sorted set of states.

use crate::tree::{NodeId, StateTree};
use std::collections::BTreeSet;

/// The set of states active at a given instant.
///
/// Backed by a `BTreeSet<NodeId>`: since [`NodeId`]s are assigned in
/// document order during construction, iterating the set already yields
/// document order for free — exactly the "identifier-keyed set plus
/// explicit sort by document-order index" the design notes call for.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Configuration {
    active: BTreeSet<NodeId>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.active.contains(&id)
    }

    pub fn insert(&mut self, id: NodeId) -> bool {
        self.active.insert(id)
    }

    pub fn remove(&mut self, id: NodeId) -> bool {
        self.active.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Iterate active states in document order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.active.iter().copied()
    }

    /// Atomic/final states currently active, in document order — the
    /// states `selectTransitions`/`selectEventlessTransitions` walk.
    pub fn atomic_states<'a>(&'a self, tree: &'a StateTree) -> impl Iterator<Item = NodeId> + 'a {
        self.iter().filter(move |&id| tree.children(id).is_empty())
    }

    /// Snapshot as the stable string ids a host observes, in document order.
    pub fn to_ids(&self, tree: &StateTree) -> Vec<String> {
        self.active.iter().map(|&id| tree.node(id).id.clone()).collect()
    }

    /// A serializable snapshot a host can log, diff, or persist. The data
    /// model is out of scope, so this only ever carries the
    /// stable string ids, never interpreter-internal [`NodeId`]s.
    pub fn snapshot(&self, tree: &StateTree) -> ConfigurationSnapshot {
        ConfigurationSnapshot { active: self.to_ids(tree) }
    }
}

/// Serde-friendly mirror of [`Configuration`] for logging and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigurationSnapshot {
    pub active: Vec<String>,
}
