//! The interpreter: owns the mutable step-engine state and drives the
//! macrostep/event loop.

use crate::conflict::resolve_conflicts;
use crate::config::{BindingMode, InterpreterConfig};
use crate::configuration::Configuration;
use crate::error::{InterpreterError, StepResult};
use crate::event::{Event, EventData};
use crate::history::HistoryStore;
use crate::queue::ExternalQueue;
use crate::selection::{select_eventless_transitions, select_transitions};
use crate::step::microstep::{microstep, MicrostepContext};
use crate::tree::{NodeId, StateTree, TransitionId};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, error};

/// Drives a [`StateTree`] through event processing, one macrostep per
/// external event, surfacing the resulting configurations.
///
/// Single-threaded and cooperative: the only externally
/// synchronized piece of state is the external queue behind
/// [`ExternalQueue`]; everything else is owned exclusively by the
/// interpreter's own loop.
pub struct Interpreter {
    tree: StateTree,
    config: Configuration,
    internal_queue: VecDeque<Event>,
    external_queue: ExternalQueue,
    history: HistoryStore,
    states_to_invoke: BTreeSet<NodeId>,
    first_entry_flags: HashSet<NodeId>,
    is_running: bool,
    binding: BindingMode,
    cfg: InterpreterConfig,
    last_error: Option<InterpreterError>,
    current_event: Option<Event>,
    invoke_handler: Option<Arc<dyn Fn(&[String]) + Send + Sync>>,
}

impl Interpreter {
    pub fn new(tree: StateTree, cfg: InterpreterConfig) -> Self {
        let binding = cfg.binding;
        if cfg.strict_validation {
            for warning in tree.structural_warnings() {
                tracing::warn!(%warning, "strict_validation: unusual tree shape");
            }
        }
        Self {
            tree,
            config: Configuration::new(),
            internal_queue: VecDeque::new(),
            external_queue: ExternalQueue::new(),
            history: HistoryStore::new(),
            states_to_invoke: BTreeSet::new(),
            first_entry_flags: HashSet::new(),
            is_running: false,
            binding,
            cfg,
            last_error: None,
            current_event: None,
            invoke_handler: None,
        }
    }

    /// Register a callback run with the ids of every state entered since the
    /// last macrostep boundary, just before `statesToInvoke` is cleared
    ///. The core never performs invocation itself — tracking
    /// which states require it is as far as `spec.md` §1 scopes this in.
    pub fn with_invoke_handler(mut self, handler: impl Fn(&[String]) + Send + Sync + 'static) -> Self {
        self.invoke_handler = Some(Arc::new(handler));
        self
    }

    pub fn tree(&self) -> &StateTree {
        &self.tree
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Snapshot of the active configuration as stable state ids, in document
    /// order.
    pub fn current_configuration(&self) -> Vec<String> {
        self.config.to_ids(&self.tree)
    }

    pub fn last_error(&self) -> Option<&InterpreterError> {
        self.last_error.as_ref()
    }

    /// Enter the root's default initial child via a synthesized transition
    /// and stabilize.
    pub fn start(&mut self) -> StepResult<()> {
        self.is_running = true;
        self.current_event = None;
        let root = self.tree.root();
        let initial = self
            .tree
            .kind(root)
            .initial_transition()
            .expect("root always carries a default initial transition (spec.md §3 inv. 5)");
        debug!("start: entering root's default initial child");
        self.run_microstep(vec![initial]);
        self.stabilize()
    }

    /// Enqueue on the external queue. Since the interpreter is
    /// single-threaded and cooperative with no async runtime of its own, this
    /// also immediately drives the queue to the next quiescent point
    /// rather than requiring a separate blocking call.
    pub fn send(&mut self, event: Event) -> StepResult<()> {
        self.external_queue.push(event);
        self.drain_external()
    }

    /// Enqueue on the internal queue, drained ahead of the next external
    /// event. Exposed for
    /// hosts whose executable content needs to raise an event outside the
    /// content-execution phase itself.
    pub fn send_internal(&mut self, event: Event) {
        self.internal_queue.push_back(event);
    }

    /// Clear the running flag; observed between microsteps, never mid-step
    ///.
    pub fn stop(&mut self) {
        self.is_running = false;
    }

    /// Drive the external queue to completion. Stabilizes *before* popping
    /// each external event (draining eventless transitions and any
    /// already-queued internal events first) and again after processing it —
    /// whatever was queued ahead of a `send` always runs ahead of it, per the
    /// internal-before-external law of `spec.md` §8.
    fn drain_external(&mut self) -> StepResult<()> {
        loop {
            self.stabilize()?;
            if !self.is_running {
                break;
            }
            let Some(event) = self.external_queue.pop() else {
                break;
            };
            debug!(event = %event.name, "processing external event");
            self.current_event = Some(event.clone());
            let enabled = self.select_and_resolve(Some(&event));
            if !enabled.is_empty() {
                self.run_microstep(enabled);
            }
        }
        Ok(())
    }

    /// Drain eventless transitions, then internal events, until quiescent
    ///: "eventless transitions always take priority over
    /// internal events, which always take priority over external events."
    ///
    /// An internal event that matches no transition is still consumed (it
    /// must not block the events queued behind it) — quiescence means *both*
    /// queues are empty and no eventless transition is enabled, not merely
    /// that the most recently popped event went nowhere.
    fn stabilize(&mut self) -> StepResult<()> {
        let mut steps = 0usize;
        loop {
            if !self.is_running {
                break;
            }
            let enabled = self.select_and_resolve_eventless();
            if !enabled.is_empty() {
                self.run_step(&mut steps, enabled)?;
                continue;
            }
            let Some(event) = self.internal_queue.pop_front() else {
                break;
            };
            self.current_event = Some(event.clone());
            let enabled = self.select_and_resolve(Some(&event));
            if !enabled.is_empty() {
                self.run_step(&mut steps, enabled)?;
            }
        }
        self.flush_states_to_invoke();
        Ok(())
    }

    fn run_step(&mut self, steps: &mut usize, enabled: Vec<TransitionId>) -> StepResult<()> {
        *steps += 1;
        if *steps > self.cfg.max_microsteps_per_macrostep {
            let limit = self.cfg.max_microsteps_per_macrostep;
            error!(limit, "eventless transitions did not quiesce within the step cap");
            self.internal_queue.push_back(Event::internal("error.execution", EventData::None));
            let err = InterpreterError::QuiescenceViolation { limit };
            self.last_error = Some(err.clone());
            return Err(err);
        }
        self.run_microstep(enabled);
        Ok(())
    }

    fn select_and_resolve(&mut self, event: Option<&Event>) -> Vec<TransitionId> {
        let mut guard_error = None;
        let enabled = select_transitions(&self.tree, &self.config, event, |e| guard_error = Some(e));
        if let Some(e) = guard_error {
            self.last_error = Some(e);
        }
        resolve_conflicts(&self.tree, &self.config, enabled)
    }

    fn select_and_resolve_eventless(&mut self) -> Vec<TransitionId> {
        let mut guard_error = None;
        let enabled = select_eventless_transitions(&self.tree, &self.config, |e| guard_error = Some(e));
        if let Some(e) = guard_error {
            self.last_error = Some(e);
        }
        resolve_conflicts(&self.tree, &self.config, enabled)
    }

    fn run_microstep(&mut self, transitions: Vec<TransitionId>) {
        let mut ctx = MicrostepContext {
            tree: &self.tree,
            config: &mut self.config,
            history: &mut self.history,
            states_to_invoke: &mut self.states_to_invoke,
            internal_queue: &mut self.internal_queue,
            is_running: &mut self.is_running,
            first_entry_flags: &mut self.first_entry_flags,
            current_event: self.current_event.as_ref(),
            last_error: &mut self.last_error,
            binding: self.binding,
        };
        microstep(&mut ctx, &transitions);
    }

    fn flush_states_to_invoke(&mut self) {
        if self.states_to_invoke.is_empty() {
            return;
        }
        if let Some(handler) = &self.invoke_handler {
            let ids: Vec<String> = self.states_to_invoke.iter().map(|&id| self.tree.node(id).id.clone()).collect();
            handler(&ids);
        }
        self.states_to_invoke.clear();
    }
}
