//! A W3C SCXML-conformant hierarchical state machine interpreter.
//!
//! The crate is split along the lines of the algorithm it implements: a tree
//! model ([`tree`]) built once from a declarative spec, transition
//! [`selection`] and [`conflict`] resolution over a [`configuration`], and a
//! [`step`] engine that drives the exit/enter microstep and the macrostep
//! event loop ([`interpreter`]). A [`flat`] convenience wrapper covers the
//! common degenerate case of a single level of atomic states.
//!
//! Executable content (`onentry`/`onexit`/transition actions), guard
//! conditions, a data model, and the XML surface form are deliberately out of
//! scope — [`guards::Guard`] and [`guards::ContentExecutor`] are the seams a
//! host wires its own language into.

pub mod conflict;
pub mod config;
pub mod configuration;
pub mod error;
pub mod event;
pub mod flat;
pub mod guards;
pub mod history;
pub mod interpreter;
pub mod queue;
pub mod selection;
pub mod step;
pub mod tree;

pub use config::{BindingMode, InterpreterConfig};
pub use configuration::{Configuration, ConfigurationSnapshot};
pub use error::{BuildError, BuildResult, InterpreterError, StepResult};
pub use event::{Event, EventData, EventOrigin, EventSnapshot};
pub use flat::{Machine, MachineTransitionResult};
pub use guards::{ContentContext, ContentExecutor, Guard, TransitionContext};
pub use interpreter::Interpreter;
pub use queue::ExternalQueue;
pub use tree::{
    build_tree, HistoryDepth, Node, NodeId, NodeKind, NodeSpec, RootSpec, StateTree, Transition, TransitionId,
    TransitionKind, TransitionSpec,
};
