//! Fluent-ish tree construction, modeled on the teacher's `MachineBuilder` /
//! `StateBuilder` / `TransitionBuilder` chain but shaped for a hierarchical
//! tree instead of a flat `HashMap<String, StateNode>`.
//!
//! Consumers (and tests) build a [`RootSpec`] describing the tree
//! declaratively, then call [`build_tree`] to validate it and produce an
//! immutable [`StateTree`].

use super::arena::StateTree;
use super::node::{HistoryDepth, Node, NodeId, NodeKind, Transition, TransitionId, TransitionKind};
use crate::error::{BuildError, BuildResult};
use crate::guards::{ContentExecutor, Guard};
use std::collections::HashMap;
use std::sync::Arc;

/// One transition, as declared by the host, before target ids are resolved.
pub struct TransitionSpec {
    pub event: Option<String>,
    pub guard: Option<Arc<dyn Guard>>,
    pub targets: Vec<String>,
    pub kind: TransitionKind,
    pub content: Option<Arc<dyn ContentExecutor>>,
}

impl TransitionSpec {
    pub fn new() -> Self {
        Self { event: None, guard: None, targets: Vec::new(), kind: TransitionKind::External, content: None }
    }

    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn targets(mut self, targets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn guarded_by(mut self, guard: impl Guard + 'static) -> Self {
        self.guard = Some(Arc::new(guard));
        self
    }

    pub fn internal(mut self) -> Self {
        self.kind = TransitionKind::Internal;
        self
    }

    pub fn with_content(mut self, content: impl ContentExecutor + 'static) -> Self {
        self.content = Some(Arc::new(content));
        self
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// The kind-specific payload of a declared (not-yet-built) node.
pub enum NodeSpecPayload {
    Compound { initial: String, children: Vec<NodeSpec> },
    Parallel { children: Vec<NodeSpec> },
    Atomic,
    Final,
    History { depth: HistoryDepth, default_target: String, default_content: Option<Arc<dyn ContentExecutor>> },
}

/// A declared node, before ids are assigned and targets resolved.
pub struct NodeSpec {
    pub id: String,
    pub on_entry: Option<Arc<dyn ContentExecutor>>,
    pub on_exit: Option<Arc<dyn ContentExecutor>>,
    pub transitions: Vec<TransitionSpec>,
    pub payload: NodeSpecPayload,
}

impl NodeSpec {
    pub fn compound(id: impl Into<String>, initial: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self {
            id: id.into(),
            on_entry: None,
            on_exit: None,
            transitions: Vec::new(),
            payload: NodeSpecPayload::Compound { initial: initial.into(), children },
        }
    }

    pub fn parallel(id: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self {
            id: id.into(),
            on_entry: None,
            on_exit: None,
            transitions: Vec::new(),
            payload: NodeSpecPayload::Parallel { children },
        }
    }

    pub fn atomic(id: impl Into<String>) -> Self {
        Self { id: id.into(), on_entry: None, on_exit: None, transitions: Vec::new(), payload: NodeSpecPayload::Atomic }
    }

    pub fn atomic_final(id: impl Into<String>) -> Self {
        Self { id: id.into(), on_entry: None, on_exit: None, transitions: Vec::new(), payload: NodeSpecPayload::Final }
    }

    pub fn history(id: impl Into<String>, depth: HistoryDepth, default_target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            on_entry: None,
            on_exit: None,
            transitions: Vec::new(),
            payload: NodeSpecPayload::History { depth, default_target: default_target.into(), default_content: None },
        }
    }

    pub fn with_transition(mut self, transition: TransitionSpec) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn on_entry(mut self, action: impl ContentExecutor + 'static) -> Self {
        self.on_entry = Some(Arc::new(action));
        self
    }

    pub fn on_exit(mut self, action: impl ContentExecutor + 'static) -> Self {
        self.on_exit = Some(Arc::new(action));
        self
    }
}

/// The top of a declared tree: the root's default initial child plus its
/// top-level children. The root itself is always compound-shaped
/// so it is not expressed as a `NodeSpec`.
pub struct RootSpec {
    pub initial: String,
    pub children: Vec<NodeSpec>,
}

/// A transition whose target id-refs have not yet been resolved to
/// [`NodeId`]s, paired with the state it was declared on. Accumulated in
/// construction order (a pre-order walk) by [`insert_node`] and resolved in
/// one pass once the whole node array exists.
struct PendingTransition {
    source: NodeId,
    spec: TransitionSpec,
}

/// Full pre-order search of `node`'s own subtree (itself plus every
/// descendant) for `idref`.
fn subtree_find(nodes: &[Node], node: NodeId, idref: &str) -> Option<NodeId> {
    if nodes[node.index()].id == idref {
        return Some(node);
    }
    for &child in &nodes[node.index()].children {
        if let Some(found) = subtree_find(nodes, child, idref) {
            return Some(found);
        }
    }
    None
}

/// Resolve an id-ref using the same parent-to-top strategy as
/// [`super::query::find_target`], operating directly on the half-built node
/// array since a [`StateTree`] does not exist until transitions resolve.
///
/// `spec.md` §4.1 describes this as checking `start` itself, then `start`'s
/// siblings, then recursing upward. Read literally that would never resolve
/// a target nested two or more levels below a sibling (or below `start`
/// itself), which conflicts with `spec.md` §3 inv. 7 ("every transition's
/// declared targets resolve to some element in the tree"). This
/// implementation widens each step from "the node" to "the node's subtree",
/// which still expands outward level by level (parent-to-top) and still
/// degenerates to the literal algorithm when every id is a direct sibling.
fn resolve_idref(nodes: &[Node], start: NodeId, idref: &str) -> Option<NodeId> {
    if let Some(found) = subtree_find(nodes, start, idref) {
        return Some(found);
    }
    let parent = nodes[start.index()].parent?;
    for &sibling in &nodes[parent.index()].children {
        if sibling == start {
            continue;
        }
        if let Some(found) = subtree_find(nodes, sibling, idref) {
            return Some(found);
        }
    }
    resolve_idref(nodes, parent, idref)
}

/// Reserve `pending`'s next slot for `spec` on `source`, returning its
/// eventual [`TransitionId`].
fn stage(pending: &mut Vec<PendingTransition>, source: NodeId, spec: TransitionSpec) -> TransitionId {
    let id = TransitionId(pending.len() as u32);
    pending.push(PendingTransition { source, spec });
    id
}

/// Insert `spec` (and its descendants) under `parent`, staging every
/// transition it declares — including a compound's initial transition and a
/// history state's default transition — into `pending`.
fn insert_node(
    nodes: &mut Vec<Node>,
    by_id: &mut HashMap<String, NodeId>,
    pending: &mut Vec<PendingTransition>,
    parent: NodeId,
    spec: NodeSpec,
) -> BuildResult<NodeId> {
    if by_id.contains_key(&spec.id) {
        return Err(BuildError::DuplicateId(spec.id));
    }
    let this_id = NodeId::new(nodes.len() as u32);
    // Reserve the slot before recursing so children record the right parent.
    nodes.push(Node {
        id: spec.id.clone(),
        parent: Some(parent),
        children: Vec::new(),
        transitions: Vec::new(),
        kind: NodeKind::Atomic,
        on_entry: spec.on_entry,
        on_exit: spec.on_exit,
    });
    by_id.insert(spec.id, this_id);

    let own_transitions: Vec<TransitionId> =
        spec.transitions.into_iter().map(|t| stage(pending, this_id, t)).collect();
    nodes[this_id.index()].transitions = own_transitions;

    let kind = match spec.payload {
        NodeSpecPayload::Atomic => NodeKind::Atomic,
        NodeSpecPayload::Final => NodeKind::Final,
        NodeSpecPayload::Compound { initial, children } => {
            let initial_id = stage(pending, this_id, TransitionSpec::new().to(initial));
            let child_ids = insert_children(nodes, by_id, pending, this_id, children)?;
            nodes[this_id.index()].children = child_ids;
            NodeKind::Compound { initial: initial_id }
        }
        NodeSpecPayload::Parallel { children } => {
            let child_ids = insert_children(nodes, by_id, pending, this_id, children)?;
            nodes[this_id.index()].children = child_ids;
            NodeKind::Parallel
        }
        NodeSpecPayload::History { depth, default_target, default_content } => {
            let mut default_spec = TransitionSpec::new().to(default_target);
            default_spec.content = default_content;
            let default_id = stage(pending, this_id, default_spec);
            NodeKind::History { depth, default: default_id }
        }
    };
    nodes[this_id.index()].kind = kind;
    Ok(this_id)
}

fn insert_children(
    nodes: &mut Vec<Node>,
    by_id: &mut HashMap<String, NodeId>,
    pending: &mut Vec<PendingTransition>,
    parent: NodeId,
    children: Vec<NodeSpec>,
) -> BuildResult<Vec<NodeId>> {
    children.into_iter().map(|child| insert_node(nodes, by_id, pending, parent, child)).collect()
}

/// Validate and assemble a declared tree into an immutable [`StateTree`].
pub fn build_tree(root: RootSpec) -> BuildResult<StateTree> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut by_id: HashMap<String, NodeId> = HashMap::new();
    let mut pending: Vec<PendingTransition> = Vec::new();

    let root_id = NodeId::new(0);
    nodes.push(Node {
        id: String::from("__root__"),
        parent: None,
        children: Vec::new(),
        transitions: Vec::new(),
        kind: NodeKind::Atomic,
        on_entry: None,
        on_exit: None,
    });
    by_id.insert(String::from("__root__"), root_id);

    let initial_id = stage(&mut pending, root_id, TransitionSpec::new().to(root.initial));
    let child_ids = insert_children(&mut nodes, &mut by_id, &mut pending, root_id, root.children)?;
    nodes[root_id.index()].children = child_ids;
    nodes[root_id.index()].kind = NodeKind::Root { initial: initial_id };

    if nodes[root_id.index()].children.is_empty() {
        return Err(BuildError::InvalidTree("root must have at least one child state".into()));
    }

    let mut transitions: Vec<Transition> = Vec::with_capacity(pending.len());
    for (i, PendingTransition { source, spec }) in pending.into_iter().enumerate() {
        let mut targets = Vec::with_capacity(spec.targets.len());
        for raw in &spec.targets {
            let resolved = resolve_idref(&nodes, source, raw).ok_or_else(|| BuildError::UnresolvedTarget {
                source: nodes[source.index()].id.clone(),
                target_ref: raw.clone(),
            })?;
            targets.push(resolved);
        }
        transitions.push(Transition {
            id: TransitionId(i as u32),
            source,
            event: spec.event,
            guard: spec.guard,
            targets,
            raw_targets: spec.targets,
            kind: spec.kind,
            content: spec.content,
        });
    }

    validate_invariants(&nodes)?;
    Ok(StateTree::new(nodes, transitions, by_id))
}

fn validate_invariants(nodes: &[Node]) -> BuildResult<()> {
    for node in nodes {
        if matches!(node.kind, NodeKind::Atomic | NodeKind::Final) && !node.children.is_empty() {
            return Err(BuildError::InvalidTree(format!(
                "atomic/final state '{}' must not have state children",
                node.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::HistoryDepth;

    #[test]
    fn builds_simple_flat_siblings() {
        let tree = build_tree(RootSpec {
            initial: "a".into(),
            children: vec![
                NodeSpec::atomic("a").with_transition(TransitionSpec::new().on("go").to("b")),
                NodeSpec::atomic("b"),
            ],
        })
        .unwrap();
        assert!(tree.by_id("a").is_some());
        assert!(tree.by_id("b").is_some());
        let root = tree.root();
        assert_eq!(tree.children(root).len(), 2);
    }

    #[test]
    fn unresolved_target_fails_construction() {
        let err = build_tree(RootSpec {
            initial: "a".into(),
            children: vec![NodeSpec::atomic("a").with_transition(TransitionSpec::new().on("go").to("nowhere"))],
        })
        .unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedTarget { .. }));
    }

    #[test]
    fn duplicate_id_fails_construction() {
        let err = build_tree(RootSpec {
            initial: "a".into(),
            children: vec![NodeSpec::atomic("a"), NodeSpec::atomic("a")],
        })
        .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateId(_)));
    }

    #[test]
    fn compound_state_with_nested_children() {
        let tree = build_tree(RootSpec {
            initial: "a".into(),
            children: vec![
                NodeSpec::compound(
                    "a",
                    "a1",
                    vec![NodeSpec::atomic("a1"), NodeSpec::atomic("a2")],
                ),
                NodeSpec::atomic("b"),
            ],
        })
        .unwrap();
        let a = tree.by_id("a").unwrap();
        assert_eq!(tree.children(a).len(), 2);
        assert!(matches!(tree.kind(a), NodeKind::Compound { .. }));
    }

    #[test]
    fn history_state_resolves_default_target() {
        let tree = build_tree(RootSpec {
            initial: "p".into(),
            children: vec![NodeSpec::compound(
                "p",
                "p1",
                vec![
                    NodeSpec::atomic("p1"),
                    NodeSpec::history("h", HistoryDepth::Shallow, "p1"),
                ],
            )],
        })
        .unwrap();
        let h = tree.by_id("h").unwrap();
        assert!(matches!(tree.kind(h), NodeKind::History { .. }));
    }
}
