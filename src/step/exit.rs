//! `computeExitSet`: for each transition with effective
//! targets, compute its domain, then collect every state in the current
//! configuration that is a descendant of that domain.

use crate::configuration::Configuration;
use crate::tree::{is_descendant, transition_domain, NodeId, StateTree, TransitionId};

/// The union of exit sets across `transitions`. The domain itself is never a
/// member — an `internal` transition whose domain is its own (compound)
/// source leaves that source active, which is the entire point of declaring
/// it `internal`.
pub fn compute_exit_set(tree: &StateTree, config: &Configuration, transitions: &[TransitionId]) -> Vec<NodeId> {
    let mut set = Vec::new();
    for &t in transitions {
        let Some(domain) = transition_domain(tree, t) else {
            continue;
        };
        for s in config.iter() {
            if s != domain && is_descendant(tree, s, domain) && !set.contains(&s) {
                set.push(s);
            }
        }
    }
    set
}
