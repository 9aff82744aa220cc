//! Interpreter configuration.
//!
//! Modeled on the teacher's `MachineConfig`: a small struct of knobs with a
//! sensible `Default`, not a full configuration-file layer — the spec has no
//! concept of external config sources, only runtime bounds.

/// Early vs. late data-model binding. The core has no data
/// model to actually initialize — this only gates *when* the
/// `first_entry_flags` bookkeeping would matter to a host that wires one in
/// through the opaque content hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// All data is initialized when the machine starts, before any state is
    /// entered.
    Early,
    /// A state's data is initialized the first time that state is entered.
    Late,
}

/// Runtime bounds and toggles for an [`crate::interpreter::Interpreter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Upper bound on the number of microsteps a single macrostep may take
    /// while draining eventless transitions and internal events before the
    /// interpreter declares a [`crate::error::InterpreterError::QuiescenceViolation`]
    ///.
    pub max_microsteps_per_macrostep: usize,
    /// When true, [`crate::interpreter::Interpreter::new`] logs a
    /// `tracing::warn!` for trees that merely look unusual (e.g. a compound
    /// state with a single child) via [`crate::tree::StateTree::structural_warnings`].
    /// Construction itself (`build_tree`) always rejects the hard invariant
    /// violations of `spec.md` §3 regardless of this flag.
    pub strict_validation: bool,
    /// Early vs. late data-model binding.
    pub binding: BindingMode,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_microsteps_per_macrostep: 1000,
            strict_validation: false,
            binding: BindingMode::Early,
        }
    }
}
