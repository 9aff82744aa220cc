//! The arena-backed tree: owns every [`Node`] and [`Transition`] by stable
//! index, per the "indices are preferred" guidance of `spec.md` §9.

use super::node::{Node, NodeId, NodeKind, Transition, TransitionId};
use std::collections::HashMap;

/// An immutable, validated hierarchical state tree.
///
/// Built once via [`super::builder::build_tree`] and never mutated again —
/// the interpreter's only mutable state lives alongside it in
/// [`crate::interpreter::Interpreter`].
#[derive(Debug)]
pub struct StateTree {
    nodes: Vec<Node>,
    transitions: Vec<Transition>,
    by_id: HashMap<String, NodeId>,
}

impl StateTree {
    pub(crate) fn new(nodes: Vec<Node>, transitions: Vec<Transition>, by_id: HashMap<String, NodeId>) -> Self {
        Self { nodes, transitions, by_id }
    }

    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn transition(&self, id: TransitionId) -> &Transition {
        &self.transitions[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a state by its declared id.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// All atomic and final leaf states reachable from `id`, in document order.
    pub fn atomic_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_atomic(id, &mut out);
        out
    }

    fn collect_atomic(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let node = self.node(id);
        if node.children.is_empty() {
            out.push(id);
            return;
        }
        for child in &node.children {
            self.collect_atomic(*child, out);
        }
    }

    /// Shapes that satisfy every hard invariant of `spec.md` §3 but are
    /// unusual enough that a host running with
    /// [`crate::config::InterpreterConfig::strict_validation`] probably
    /// wants to know about them — e.g. a compound state with a single child,
    /// which is always equivalent to an atomic state.
    pub fn structural_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for node in &self.nodes {
            if node.kind.is_compound_like() && node.children.len() == 1 {
                warnings.push(format!(
                    "compound state '{}' has exactly one child; consider an atomic state",
                    node.id
                ));
            }
            if node.kind.is_parallel() && node.children.len() < 2 {
                warnings.push(format!("parallel state '{}' has fewer than two regions", node.id));
            }
        }
        warnings
    }
}
