//! The microstep: exit → transition content → enter, in strict phases
//!. Operates through a [`MicrostepContext`] borrowing the
//! interpreter's mutable fields rather than taking `&mut Interpreter`
//! directly, keeping the step engine's concerns (this module) separate from
//! the event loop's (`crate::interpreter`).

use crate::config::BindingMode;
use crate::configuration::Configuration;
use crate::error::InterpreterError;
use crate::event::{Event, EventData};
use crate::guards::ContentContext;
use crate::history::HistoryStore;
use crate::tree::{is_descendant, HistoryDepth, NodeId, NodeKind, StateTree, TransitionId};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Borrowed interpreter state a microstep needs to read and mutate.
pub struct MicrostepContext<'a> {
    pub tree: &'a StateTree,
    pub config: &'a mut Configuration,
    pub history: &'a mut HistoryStore,
    pub states_to_invoke: &'a mut BTreeSet<NodeId>,
    pub internal_queue: &'a mut VecDeque<Event>,
    pub is_running: &'a mut bool,
    pub first_entry_flags: &'a mut HashSet<NodeId>,
    pub current_event: Option<&'a Event>,
    pub last_error: &'a mut Option<InterpreterError>,
    pub binding: BindingMode,
}

/// Run all three phases of one conflict-resolved transition set.
pub fn microstep(ctx: &mut MicrostepContext, transitions: &[TransitionId]) {
    exit_states(ctx, transitions);
    execute_transition_content(ctx, transitions);
    enter_states(ctx, transitions);
}

/// Phase 1: compute the exit set, record history for any history children of
/// exited states, run `onexit` content, and drop each state from the
/// configuration. Sorted in exit order — descending document order, so
/// deeper states (and a parallel's later-declared children) exit first.
pub fn exit_states(ctx: &mut MicrostepContext, transitions: &[TransitionId]) {
    let mut to_exit = super::exit::compute_exit_set(ctx.tree, ctx.config, transitions);
    to_exit.sort_by(|a, b| b.index().cmp(&a.index()));

    for &s in &to_exit {
        ctx.states_to_invoke.remove(&s);

        // Record first: `spec.md` §9 open question 2 resolves the ordering
        // ambiguity by recording history before running onexit content.
        for &child in ctx.tree.children(s) {
            if let NodeKind::History { depth, .. } = ctx.tree.kind(child) {
                let recorded: Vec<NodeId> = match depth {
                    HistoryDepth::Shallow => {
                        ctx.tree.children(s).iter().copied().filter(|c| ctx.config.contains(*c)).collect()
                    }
                    HistoryDepth::Deep => {
                        ctx.tree.atomic_descendants(s).into_iter().filter(|c| ctx.config.contains(*c)).collect()
                    }
                };
                ctx.history.record(child, recorded);
            }
        }

        if let Some(exec) = ctx.tree.node(s).on_exit.clone() {
            let cctx = ContentContext { event: ctx.current_event, state: s };
            if let Err(reason) = exec.execute(&cctx) {
                report_content_error(ctx, s, reason);
            }
        }

        ctx.config.remove(s);
    }
}

/// Phase 2: run each enabled transition's own executable content, in
/// document order of the transitions.
fn execute_transition_content(ctx: &mut MicrostepContext, transitions: &[TransitionId]) {
    let mut ordered = transitions.to_vec();
    ordered.sort_by_key(|t| t.index());
    for t in ordered {
        let transition = ctx.tree.transition(t);
        let source = transition.source;
        if let Some(content) = transition.content.clone() {
            let cctx = ContentContext { event: ctx.current_event, state: source };
            if let Err(reason) = content.execute(&cctx) {
                report_content_error(ctx, source, reason);
            }
        }
    }
}

/// Phase 3: compute the entry set, add each state to the configuration (and
/// `statesToInvoke`), run `onentry` content, default-entry/default-history
/// content, and raise `done.state.*` events for entered final states. Sorted
/// in entry order — ascending document order, ancestors before descendants.
fn enter_states(ctx: &mut MicrostepContext, transitions: &[TransitionId]) {
    let entry = super::entry::compute_entry_set(ctx.tree, transitions, ctx.history);

    for &s in &entry.states_to_enter {
        ctx.config.insert(s);
        ctx.states_to_invoke.insert(s);

        let first_entry = ctx.first_entry_flags.insert(s);
        // The data model itself is out of scope; this flag is
        // the only piece of late-binding bookkeeping the core owns, for a
        // host that wires a data model in through the content hooks.
        let _ = (ctx.binding, first_entry);

        if let Some(exec) = ctx.tree.node(s).on_entry.clone() {
            let cctx = ContentContext { event: ctx.current_event, state: s };
            if let Err(reason) = exec.execute(&cctx) {
                report_content_error(ctx, s, reason);
            }
        }

        if entry.states_for_default_entry.contains(&s) {
            if let Some(initial) = ctx.tree.kind(s).initial_transition() {
                if let Some(content) = ctx.tree.transition(initial).content.clone() {
                    let cctx = ContentContext { event: ctx.current_event, state: s };
                    if let Err(reason) = content.execute(&cctx) {
                        report_content_error(ctx, s, reason);
                    }
                }
            }
        }

        if let Some(Some(content)) = entry.default_history_content.get(&s) {
            let cctx = ContentContext { event: ctx.current_event, state: s };
            if let Err(reason) = content.execute(&cctx) {
                report_content_error(ctx, s, reason);
            }
        }

        if ctx.tree.kind(s).is_final() {
            handle_final_entry(ctx, s);
        }
    }
}

fn handle_final_entry(ctx: &mut MicrostepContext, s: NodeId) {
    let Some(parent) = ctx.tree.parent(s) else { return };
    if parent == ctx.tree.root() {
        *ctx.is_running = false;
        return;
    }
    ctx.internal_queue.push_back(Event::done(format!("done.state.{}", ctx.tree.node(parent).id)));
    let Some(grandparent) = ctx.tree.parent(parent) else { return };
    if ctx.tree.kind(grandparent).is_parallel() && all_regions_in_final_state(ctx.tree, ctx.config, grandparent) {
        ctx.internal_queue.push_back(Event::done(format!("done.state.{}", ctx.tree.node(grandparent).id)));
    }
}

fn all_regions_in_final_state(tree: &StateTree, config: &Configuration, parallel: NodeId) -> bool {
    tree.children(parallel).iter().all(|&region| {
        config.iter().any(|s| (s == region || is_descendant(tree, s, region)) && tree.kind(s).is_final())
    })
}

fn report_content_error(ctx: &mut MicrostepContext, state: NodeId, reason: String) {
    let id = ctx.tree.node(state).id.clone();
    tracing::warn!(state = %id, %reason, "executable content failed");
    *ctx.last_error = Some(InterpreterError::ContentError { state: id, reason });
    ctx.internal_queue.push_back(Event::internal("error.execution", EventData::None));
}
