//! History value storage: what a shallow/deep history pseudo-state resolves
//! to the next time its parent is entered.

use crate::tree::node::NodeId;
use std::collections::HashMap;

/// Maps a history state's id to the configuration it should restore.
///
/// Recorded during [`crate::step::microstep::exit_states`] just before a
/// state with a history child is exited, and consulted by
/// [`crate::tree::query::effective_target_states`] the next time that
/// history pseudo-state is targeted.
#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    values: HashMap<NodeId, Vec<NodeId>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, history_state: NodeId) -> Option<&[NodeId]> {
        self.values.get(&history_state).map(|v| v.as_slice())
    }

    pub fn record(&mut self, history_state: NodeId, states: Vec<NodeId>) {
        self.values.insert(history_state, states);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_retrieves() {
        let mut store = HistoryStore::new();
        let h = NodeId::test(3);
        assert!(store.get(h).is_none());
        store.record(h, vec![NodeId::test(5), NodeId::test(6)]);
        assert_eq!(store.get(h).unwrap(), &[NodeId::test(5), NodeId::test(6)]);
    }
}
