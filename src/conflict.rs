//! Conflict resolution: prune mutually-incompatible transitions using
//! exit-set intersection and document order.

use crate::configuration::Configuration;
use crate::step::exit::compute_exit_set;
use crate::tree::{is_descendant, StateTree, TransitionId};

/// Filter `enabled` (already in the document order [`crate::selection`]
/// produced) down to a mutually non-conflicting set.
///
/// For each `t1`, compare against every transition already accepted into the
/// filtered set: if their exit sets intersect, the transition whose source is
/// the deeper (more specific) state wins, since it was selected by an atomic
/// state closer to where the event actually fired. Targetless transitions
/// have empty exit sets and so never conflict with anything.
pub fn resolve_conflicts(tree: &StateTree, config: &Configuration, enabled: Vec<TransitionId>) -> Vec<TransitionId> {
    let mut filtered: Vec<TransitionId> = Vec::new();
    'outer: for t1 in enabled {
        let exit1 = compute_exit_set(tree, config, std::slice::from_ref(&t1));
        let mut preempted_indices = Vec::new();
        for (idx, &t2) in filtered.iter().enumerate() {
            let exit2 = compute_exit_set(tree, config, std::slice::from_ref(&t2));
            if !exit1.iter().any(|s| exit2.contains(s)) {
                continue;
            }
            let source1 = tree.transition(t1).source;
            let source2 = tree.transition(t2).source;
            if is_descendant(tree, source1, source2) {
                preempted_indices.push(idx);
            } else {
                continue 'outer;
            }
        }
        for idx in preempted_indices.into_iter().rev() {
            filtered.remove(idx);
        }
        filtered.push(t1);
    }
    filtered
}
