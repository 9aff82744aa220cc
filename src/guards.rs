//! Guard and executable-content hooks.
//!
//! The interpreter never evaluates guard expressions or executable content
//! itself — both are opaque callbacks supplied by the host, exactly as
//! `spec.md` §6 requires. Absent hosts get identity guards (`None` always
//! matches) and no-op content (`None` runs nothing).

use crate::event::Event;
use crate::tree::NodeId;
use std::fmt;

/// Context visible to a guard while deciding whether its transition fires.
///
/// `event` is `None` while selecting eventless transitions and during the
/// synthesized transition `start()` uses to enter the root's default child
/// — there is no triggering event in either case.
pub struct TransitionContext<'a> {
    pub event: Option<&'a Event>,
    pub source: NodeId,
}

/// A host-supplied condition attached to a transition.
///
/// Mirrors the teacher's `Guard<C, E>` trait, minus the context/event type
/// parameters the core interpreter never inspects: the data model is out of
/// scope, so guards receive only the event and the firing transition's
/// source.
pub trait Guard: Send + Sync {
    /// Evaluate the guard. `Err` models a host callback that failed (the
    /// spec's "GuardError" condition); the transition is then treated as
    /// not matching.
    fn evaluate(&self, ctx: &TransitionContext<'_>) -> Result<bool, String>;
}

impl<F> Guard for F
where
    F: Fn(&TransitionContext<'_>) -> Result<bool, String> + Send + Sync,
{
    fn evaluate(&self, ctx: &TransitionContext<'_>) -> Result<bool, String> {
        self(ctx)
    }
}

/// Context visible to executable content while it runs. `event` is `None`
/// during `start()`'s synthesized entry into the root's default child.
pub struct ContentContext<'a> {
    pub event: Option<&'a Event>,
    pub state: NodeId,
}

/// A host-supplied side effect attached to a transition or to a state's
/// entry/exit.
///
/// Mirrors the teacher's `Action<C, E>` trait. The core never inspects what
/// the content does; it only sequences *when* it runs (exit, then
/// transition content, then entry — `spec.md` §4.5).
pub trait ContentExecutor: Send + Sync {
    /// Run the content. `Err` models a host callback that failed (the
    /// spec's "ContentError" condition); the caller enqueues
    /// `error.execution` and continues.
    fn execute(&self, ctx: &ContentContext<'_>) -> Result<(), String>;
}

impl<F> ContentExecutor for F
where
    F: Fn(&ContentContext<'_>) -> Result<(), String> + Send + Sync,
{
    fn execute(&self, ctx: &ContentContext<'_>) -> Result<(), String> {
        self(ctx)
    }
}

impl fmt::Debug for dyn Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<guard>")
    }
}

impl fmt::Debug for dyn ContentExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<content>")
    }
}
