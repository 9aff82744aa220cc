//! The hierarchical tree model: typed nodes, parent/child links, and the
//! queries and builder that operate over them.

pub mod arena;
pub mod builder;
pub mod node;
pub mod query;

pub use arena::StateTree;
pub use builder::{build_tree, NodeSpec, NodeSpecPayload, RootSpec, TransitionSpec};
pub use node::{HistoryDepth, Node, NodeId, NodeKind, Transition, TransitionId, TransitionKind};
pub use query::{effective_target_states, find_lcca, find_target, is_descendant, proper_ancestors, transition_domain};

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> StateTree {
        build_tree(RootSpec {
            initial: "a".into(),
            children: vec![
                NodeSpec::compound("a", "a1", vec![NodeSpec::atomic("a1"), NodeSpec::atomic("a2")]),
                NodeSpec::atomic("b"),
            ],
        })
        .unwrap()
    }

    #[test]
    fn proper_ancestors_of_nested_atomic() {
        let tree = sample_tree();
        let a1 = tree.by_id("a1").unwrap();
        let a = tree.by_id("a").unwrap();
        let root = tree.root();
        let ancestors = proper_ancestors(&tree, a1, None);
        assert_eq!(ancestors, vec![a, root]);
    }

    #[test]
    fn proper_ancestors_stop_exclusive() {
        let tree = sample_tree();
        let a1 = tree.by_id("a1").unwrap();
        let a = tree.by_id("a").unwrap();
        assert_eq!(proper_ancestors(&tree, a1, Some(a)), Vec::<NodeId>::new());
    }

    #[test]
    fn proper_ancestors_same_state_is_empty() {
        let tree = sample_tree();
        let a1 = tree.by_id("a1").unwrap();
        assert!(proper_ancestors(&tree, a1, Some(a1)).is_empty());
    }

    #[test]
    fn is_descendant_true_for_nested_atomic() {
        let tree = sample_tree();
        let a1 = tree.by_id("a1").unwrap();
        let a = tree.by_id("a").unwrap();
        assert!(is_descendant(&tree, a1, a));
        assert!(!is_descendant(&tree, a, a1));
    }

    #[test]
    fn find_lcca_of_siblings_is_root() {
        let tree = sample_tree();
        let a1 = tree.by_id("a1").unwrap();
        let b = tree.by_id("b").unwrap();
        assert_eq!(find_lcca(&tree, &[a1, b]), tree.root());
    }

    #[test]
    fn find_lcca_within_same_compound() {
        let tree = sample_tree();
        let a1 = tree.by_id("a1").unwrap();
        let a2 = tree.by_id("a2").unwrap();
        let a = tree.by_id("a").unwrap();
        assert_eq!(find_lcca(&tree, &[a1, a2]), a);
    }
}
