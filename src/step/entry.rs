//! `computeEntrySet`: `addDescendantStatesToEnter` and
//! `addAncestorStatesToEnter`, and the `statesForDefaultEntry` /
//! `defaultHistoryContent` side tables they populate.

use crate::guards::ContentExecutor;
use crate::history::HistoryStore;
use crate::tree::{
    effective_target_states, is_descendant, proper_ancestors, transition_domain, NodeId, NodeKind, StateTree,
    TransitionId,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The result of [`compute_entry_set`]: the states to enter in entry order,
/// which of those are compound states entered through their default initial
/// transition, and the executable content a default-history resolution owes
/// each history pseudo-state's parent.
pub struct EntrySet {
    /// Ascending document order — ancestors before descendants.
    pub states_to_enter: Vec<NodeId>,
    pub states_for_default_entry: HashSet<NodeId>,
    pub default_history_content: HashMap<NodeId, Option<Arc<dyn ContentExecutor>>>,
}

pub fn compute_entry_set(tree: &StateTree, transitions: &[TransitionId], history: &HistoryStore) -> EntrySet {
    let mut states_to_enter = Vec::new();
    let mut states_for_default_entry = HashSet::new();
    let mut default_history_content = HashMap::new();

    for &t in transitions {
        let targets = effective_target_states(tree, t, history);
        for &target in &targets {
            add_descendant_states_to_enter(
                tree,
                target,
                history,
                &mut states_to_enter,
                &mut states_for_default_entry,
                &mut default_history_content,
            );
        }
        if let Some(domain) = transition_domain(tree, t) {
            for &target in &targets {
                add_ancestor_states_to_enter(
                    tree,
                    target,
                    domain,
                    history,
                    &mut states_to_enter,
                    &mut states_for_default_entry,
                    &mut default_history_content,
                );
            }
        }
    }

    states_to_enter.sort_by_key(|n| n.index());
    EntrySet { states_to_enter, states_for_default_entry, default_history_content }
}

fn has_descendant_in(tree: &StateTree, states: &[NodeId], ancestor: NodeId) -> bool {
    states.iter().any(|&s| s == ancestor || is_descendant(tree, s, ancestor))
}

fn add_descendant_states_to_enter(
    tree: &StateTree,
    s: NodeId,
    history: &HistoryStore,
    states_to_enter: &mut Vec<NodeId>,
    states_for_default_entry: &mut HashSet<NodeId>,
    default_history_content: &mut HashMap<NodeId, Option<Arc<dyn ContentExecutor>>>,
) {
    if let NodeKind::History { default, .. } = tree.kind(s) {
        if let Some(stored) = history.get(s) {
            let stored = stored.to_vec();
            for &st in &stored {
                add_descendant_states_to_enter(tree, st, history, states_to_enter, states_for_default_entry, default_history_content);
            }
            let parent = tree.parent(s).expect("history pseudo-states always have a parent");
            for &st in &stored {
                add_ancestor_states_to_enter(
                    tree,
                    st,
                    parent,
                    history,
                    states_to_enter,
                    states_for_default_entry,
                    default_history_content,
                );
            }
        } else {
            let default_transition = tree.transition(*default);
            default_history_content.insert(s, default_transition.content.clone());
            let default_targets = default_transition.targets.clone();
            for target in default_targets {
                add_descendant_states_to_enter(
                    tree,
                    target,
                    history,
                    states_to_enter,
                    states_for_default_entry,
                    default_history_content,
                );
            }
        }
        return;
    }

    if !states_to_enter.contains(&s) {
        states_to_enter.push(s);
    }

    if tree.kind(s).is_compound_like() {
        states_for_default_entry.insert(s);
        let initial = tree
            .kind(s)
            .initial_transition()
            .expect("compound states always carry a default initial transition");
        let initial_targets = tree.transition(initial).targets.clone();
        for &target in &initial_targets {
            add_descendant_states_to_enter(tree, target, history, states_to_enter, states_for_default_entry, default_history_content);
        }
        for &target in &initial_targets {
            add_ancestor_states_to_enter(
                tree,
                target,
                s,
                history,
                states_to_enter,
                states_for_default_entry,
                default_history_content,
            );
        }
    } else if tree.kind(s).is_parallel() {
        for &child in tree.children(s) {
            if !has_descendant_in(tree, states_to_enter, child) {
                add_descendant_states_to_enter(tree, child, history, states_to_enter, states_for_default_entry, default_history_content);
            }
        }
    }
}

fn add_ancestor_states_to_enter(
    tree: &StateTree,
    s: NodeId,
    stop: NodeId,
    history: &HistoryStore,
    states_to_enter: &mut Vec<NodeId>,
    states_for_default_entry: &mut HashSet<NodeId>,
    default_history_content: &mut HashMap<NodeId, Option<Arc<dyn ContentExecutor>>>,
) {
    for ancestor in proper_ancestors(tree, s, Some(stop)) {
        if !states_to_enter.contains(&ancestor) {
            states_to_enter.push(ancestor);
        }
        if tree.kind(ancestor).is_parallel() {
            for &child in tree.children(ancestor) {
                if !has_descendant_in(tree, states_to_enter, child) {
                    add_descendant_states_to_enter(
                        tree,
                        child,
                        history,
                        states_to_enter,
                        states_for_default_entry,
                        default_history_content,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build_tree, HistoryDepth, NodeSpec, RootSpec, TransitionSpec};

    #[test]
    fn entering_compound_adds_default_child() {
        let tree = build_tree(RootSpec {
            initial: "a".into(),
            children: vec![NodeSpec::compound("a", "a1", vec![NodeSpec::atomic("a1"), NodeSpec::atomic("a2")])],
        })
        .unwrap();
        let root = tree.root();
        let initial = tree.kind(root).initial_transition().unwrap();
        let entry = compute_entry_set(&tree, &[initial], &HistoryStore::new());
        let a = tree.by_id("a").unwrap();
        let a1 = tree.by_id("a1").unwrap();
        assert_eq!(entry.states_to_enter, vec![a, a1]);
        assert!(entry.states_for_default_entry.contains(&a));
    }

    #[test]
    fn entering_parallel_enters_every_region() {
        let tree = build_tree(RootSpec {
            initial: "p".into(),
            children: vec![NodeSpec::parallel(
                "p",
                vec![
                    NodeSpec::compound("x", "x1", vec![NodeSpec::atomic("x1")]),
                    NodeSpec::compound("y", "y1", vec![NodeSpec::atomic("y1")]),
                ],
            )],
        })
        .unwrap();
        let root = tree.root();
        let initial = tree.kind(root).initial_transition().unwrap();
        let entry = compute_entry_set(&tree, &[initial], &HistoryStore::new());
        for id in ["p", "x", "x1", "y", "y1"] {
            assert!(entry.states_to_enter.contains(&tree.by_id(id).unwrap()), "missing {id}");
        }
    }

    #[test]
    fn history_without_stored_value_falls_back_to_default() {
        let tree = build_tree(RootSpec {
            initial: "p".into(),
            children: vec![NodeSpec::compound(
                "p",
                "p1",
                vec![
                    NodeSpec::atomic("p1"),
                    NodeSpec::atomic("p2"),
                    NodeSpec::history("h", HistoryDepth::Shallow, "p2")
                        .with_transition(TransitionSpec::new().on("resume").to("h")),
                ],
            )],
        })
        .unwrap();
        let h = tree.by_id("h").unwrap();
        let p2 = tree.by_id("p2").unwrap();
        let t = tree.node(h).transitions[0];
        let entry = compute_entry_set(&tree, &[t], &HistoryStore::new());
        assert!(entry.states_to_enter.contains(&p2));
    }

    #[test]
    fn history_with_stored_value_restores_it() {
        let tree = build_tree(RootSpec {
            initial: "p".into(),
            children: vec![NodeSpec::compound(
                "p",
                "p1",
                vec![
                    NodeSpec::atomic("p1"),
                    NodeSpec::atomic("p2"),
                    NodeSpec::history("h", HistoryDepth::Shallow, "p1")
                        .with_transition(TransitionSpec::new().on("resume").to("h")),
                ],
            )],
        })
        .unwrap();
        let h = tree.by_id("h").unwrap();
        let p2 = tree.by_id("p2").unwrap();
        let mut history = HistoryStore::new();
        history.record(h, vec![p2]);
        let t = tree.node(h).transitions[0];
        let entry = compute_entry_set(&tree, &[t], &history);
        assert!(entry.states_to_enter.contains(&p2));
        assert!(!entry.states_to_enter.contains(&tree.by_id("p1").unwrap()));
    }
}
