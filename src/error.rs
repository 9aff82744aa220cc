//! Error types for tree construction and interpreter execution.
//!
//! Construction errors (`BuildError`) are returned while assembling a
//! [`crate::tree::StateTree`] from host-supplied nodes and never occur once a
//! tree has been built. Runtime errors (`InterpreterError`) surface from the
//! step algorithm and never corrupt the current configuration: a microstep
//! either completes all three phases or the interpreter halts cleanly.

use thiserror::Error;

/// Errors raised while validating and assembling a [`crate::tree::StateTree`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A transition's id reference did not resolve to any element in the tree.
    #[error("transition on '{source}' references unresolved target '{target_ref}'")]
    UnresolvedTarget { source: String, target_ref: String },

    /// One of the structural invariants of the data model was violated.
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// Two elements in the tree were given the same id.
    #[error("duplicate state id: '{0}'")]
    DuplicateId(String),
}

/// Errors raised while driving the interpreter.
#[derive(Debug, Clone, Error)]
pub enum InterpreterError {
    /// A host guard callback failed; the transition that owns it is treated
    /// as not matching and evaluation continues.
    #[error("guard evaluation failed on transition from '{source}': {reason}")]
    GuardError { source: String, reason: String },

    /// A host executable-content callback failed; an `error.execution`
    /// internal event is enqueued and the macrostep continues.
    #[error("executable content failed on '{state}': {reason}")]
    ContentError { state: String, reason: String },

    /// Eventless transitions failed to quiesce within the configured step
    /// cap; the macrostep halts without corrupting the configuration.
    #[error("eventless transitions did not quiesce within {limit} microsteps")]
    QuiescenceViolation { limit: usize },
}

pub type BuildResult<T> = Result<T, BuildError>;
pub type StepResult<T> = Result<T, InterpreterError>;
