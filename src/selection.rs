//! Transition selection: enumerate enabled transitions for an event (or
//! eventless), one per atomic state in the configuration.

use crate::configuration::Configuration;
use crate::error::InterpreterError;
use crate::event::{event_name_matches, Event};
use crate::guards::TransitionContext;
use crate::tree::{proper_ancestors, StateTree, TransitionId};
use tracing::warn;

/// Walk `[s, ...properAncestors(s, None)]` outward from each atomic state in
/// `config` (in document order), taking the first outbound transition on
/// each visited state whose event name matches `event` (if any) and whose
/// guard passes.
///
/// A guard that fails to evaluate (`Err`) is treated as not matching; the
/// failure is reported through `on_guard_error` rather than aborting
/// selection.
pub fn select_transitions(
    tree: &StateTree,
    config: &Configuration,
    event: Option<&Event>,
    mut on_guard_error: impl FnMut(InterpreterError),
) -> Vec<TransitionId> {
    let mut enabled = Vec::new();
    'outer: for atomic in config.atomic_states(tree).collect::<Vec<_>>() {
        let mut chain = vec![atomic];
        chain.extend(proper_ancestors(tree, atomic, None));
        for state in chain {
            for &transition_id in &tree.node(state).transitions {
                let transition = tree.transition(transition_id);
                let name_matches = match (&transition.event, event) {
                    (Some(pattern), Some(ev)) => event_name_matches(pattern, &ev.name),
                    (None, None) => true,
                    _ => false,
                };
                if !name_matches {
                    continue;
                }
                let guard_passes = match &transition.guard {
                    None => true,
                    Some(guard) => {
                        let ctx = TransitionContext { event, source: transition.source };
                        match guard.evaluate(&ctx) {
                            Ok(pass) => pass,
                            Err(reason) => {
                                on_guard_error(InterpreterError::GuardError {
                                    source: tree.node(transition.source).id.clone(),
                                    reason,
                                });
                                warn!(state = %tree.node(state).id, "guard evaluation failed");
                                false
                            }
                        }
                    }
                };
                if guard_passes {
                    enabled.push(transition_id);
                    continue 'outer;
                }
            }
        }
    }
    enabled
}

/// Considers only transitions with no `event` attribute.
pub fn select_eventless_transitions(
    tree: &StateTree,
    config: &Configuration,
    on_guard_error: impl FnMut(InterpreterError),
) -> Vec<TransitionId> {
    select_transitions(tree, config, None, on_guard_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventData;
    use crate::tree::{build_tree, NodeSpec, RootSpec, TransitionSpec};
    use rstest::rstest;

    #[test]
    fn selects_matching_transition_on_atomic_state() {
        let tree = build_tree(RootSpec {
            initial: "a".into(),
            children: vec![
                NodeSpec::atomic("a").with_transition(TransitionSpec::new().on("go").to("b")),
                NodeSpec::atomic("b"),
            ],
        })
        .unwrap();
        let a = tree.by_id("a").unwrap();
        let mut config = Configuration::new();
        config.insert(a);
        let event = Event::external("go", EventData::None);
        let enabled = select_transitions(&tree, &config, Some(&event), |_| panic!("no guard errors expected"));
        assert_eq!(enabled.len(), 1);
        assert_eq!(tree.transition(enabled[0]).source, a);
    }

    #[test]
    fn walks_outward_to_ancestor_transitions() {
        let tree = build_tree(RootSpec {
            initial: "p".into(),
            children: vec![NodeSpec::compound(
                "p",
                "c",
                vec![NodeSpec::atomic("c")],
            )
            .with_transition(TransitionSpec::new().on("go").to("p"))],
        })
        .unwrap();
        let c = tree.by_id("c").unwrap();
        let mut config = Configuration::new();
        config.insert(c);
        let event = Event::external("go", EventData::None);
        let enabled = select_transitions(&tree, &config, Some(&event), |_| panic!());
        assert_eq!(enabled.len(), 1);
        assert_eq!(tree.transition(enabled[0]).source, tree.by_id("p").unwrap());
    }

    #[test]
    fn eventless_only_considers_transitions_without_event() {
        let tree = build_tree(RootSpec {
            initial: "a".into(),
            children: vec![
                NodeSpec::atomic("a").with_transition(TransitionSpec::new().on("go").to("b")),
                NodeSpec::atomic("b"),
            ],
        })
        .unwrap();
        let a = tree.by_id("a").unwrap();
        let mut config = Configuration::new();
        config.insert(a);
        let enabled = select_eventless_transitions(&tree, &config, |_| panic!());
        assert!(enabled.is_empty());
    }

    #[rstest]
    #[case::exact("go", true)]
    #[case::dotted_child("go.retry", true)]
    #[case::unrelated("stop", false)]
    #[case::sibling_prefix("going", false)]
    fn dotted_event_names_select_through_the_full_pipeline(#[case] incoming: &str, #[case] should_fire: bool) {
        let tree = build_tree(RootSpec {
            initial: "a".into(),
            children: vec![
                NodeSpec::atomic("a").with_transition(TransitionSpec::new().on("go").to("b")),
                NodeSpec::atomic("b"),
            ],
        })
        .unwrap();
        let a = tree.by_id("a").unwrap();
        let mut config = Configuration::new();
        config.insert(a);
        let event = Event::external(incoming, EventData::None);
        let enabled = select_transitions(&tree, &config, Some(&event), |_| panic!());
        assert_eq!(!enabled.is_empty(), should_fire, "event {incoming:?}");
    }
}
