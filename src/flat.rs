//! The flat single-level convenience machine: `{event -> nextState}` per
//! state.

use crate::conflict::resolve_conflicts;
use crate::configuration::Configuration;
use crate::error::BuildResult;
use crate::event::{Event, EventData};
use crate::history::HistoryStore;
use crate::selection::select_transitions;
use crate::step::entry::compute_entry_set;
use crate::step::exit::compute_exit_set;
use crate::tree::{build_tree, NodeSpec, RootSpec, StateTree, TransitionSpec};
use std::collections::HashMap;

/// Result of [`Machine::transition`]: the next state, or `currentState`
/// unchanged when no transition matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineTransitionResult {
    pub value: String,
}

/// A single-level state machine: `{ state: { event: nextState } }`.
///
/// The degenerate case of the hierarchical core: every
/// declared state is an atomic sibling under a synthesized compound root, and
/// `transition` drives one external-event step through the same selection,
/// conflict-resolution, and exit/entry machinery the hierarchical
/// interpreter uses. Unlike [`crate::interpreter::Interpreter`], it keeps no
/// configuration between calls — `transition` is a pure `(state, event) ->
/// state` function, with the caller threading `currentState` through.
pub struct Machine {
    tree: StateTree,
}

impl Machine {
    /// Build a flat machine from the initial state and a `{state: {event:
    /// target}}` mapping. A state reachable only as a transition target (a
    /// terminal state with no outgoing transitions, e.g. `"done"`) does not
    /// need its own entry in `transitions`.
    pub fn new(initial: impl Into<String>, transitions: HashMap<String, HashMap<String, String>>) -> BuildResult<Self> {
        let initial = initial.into();
        let mut ids: Vec<String> = transitions.keys().cloned().collect();
        for targets in transitions.values() {
            for target in targets.values() {
                if !ids.contains(target) {
                    ids.push(target.clone());
                }
            }
        }
        if !ids.contains(&initial) {
            ids.push(initial.clone());
        }
        ids.sort();

        let children: Vec<NodeSpec> = ids
            .into_iter()
            .map(|id| {
                let mut spec = NodeSpec::atomic(id.clone());
                if let Some(out) = transitions.get(&id) {
                    let mut events: Vec<&String> = out.keys().collect();
                    events.sort();
                    for event in events {
                        spec = spec.with_transition(TransitionSpec::new().on(event.clone()).to(out[event].clone()));
                    }
                }
                spec
            })
            .collect();

        let tree = build_tree(RootSpec { initial, children })?;
        Ok(Self { tree })
    }

    /// `transition(currentState, event) -> { value: nextState }`. Identity
    /// semantics when `currentState` is unknown or no transition matches.
    pub fn transition(&self, current_state: &str, event: &str) -> MachineTransitionResult {
        let Some(state_id) = self.tree.by_id(current_state) else {
            return MachineTransitionResult { value: current_state.to_string() };
        };

        let mut config = Configuration::new();
        config.insert(state_id);
        let ev = Event::external(event, EventData::None);
        let history = HistoryStore::new();
        let enabled = select_transitions(&self.tree, &config, Some(&ev), |_| {});
        let enabled = resolve_conflicts(&self.tree, &config, enabled);
        if enabled.is_empty() {
            return MachineTransitionResult { value: current_state.to_string() };
        }

        for s in compute_exit_set(&self.tree, &config, &enabled) {
            config.remove(s);
        }
        let entry = compute_entry_set(&self.tree, &enabled, &history);
        for s in entry.states_to_enter {
            config.insert(s);
        }

        let value = config
            .iter()
            .find(|&id| self.tree.children(id).is_empty())
            .map(|id| self.tree.node(id).id.clone())
            .unwrap_or_else(|| current_state.to_string());
        MachineTransitionResult { value }
    }
}
