//! Current node and transition bookkeeping.

use std::sync::Arc;

use wg_story::{NodeId, START_NODE, StoryGraph, StoryNode};

/// Where the reader is and how far they have come.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorState {
    /// Id of the current node, exactly as committed.
    pub current_node_id: NodeId,
    /// Number of commits so far.
    pub transition_count: u64,
}

impl Default for NavigatorState {
    fn default() -> Self {
        Self {
            current_node_id: START_NODE.to_string(),
            transition_count: 0,
        }
    }
}

/// The result of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Node id before the commit.
    pub from: NodeId,
    /// Node id after the commit.
    pub to: NodeId,
    /// Transition count after the commit.
    pub transition_count: u64,
}

/// Holds the current node id and applies committed choices.
///
/// Unknown targets are stored as given. Reads go through
/// [`StoryGraph::resolve`], which shows the start node in their place.
#[derive(Debug, Clone)]
pub struct StoryNavigator {
    graph: Arc<StoryGraph>,
    state: NavigatorState,
    history: Vec<NodeId>,
}

impl StoryNavigator {
    /// Start a new play-through at the start node.
    pub fn new(graph: Arc<StoryGraph>) -> Self {
        Self {
            graph,
            state: NavigatorState::default(),
            history: Vec::new(),
        }
    }

    /// The node to display.
    pub fn current_node(&self) -> &StoryNode {
        self.graph.resolve(&self.state.current_node_id)
    }

    /// Current state.
    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    /// Id of the current node, exactly as committed.
    pub fn current_node_id(&self) -> &str {
        &self.state.current_node_id
    }

    /// Number of commits so far.
    pub fn transition_count(&self) -> u64 {
        self.state.transition_count
    }

    /// Committed targets, oldest first.
    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    /// Move to `target` and count the transition.
    pub fn commit(&mut self, target: &str) -> Transition {
        if !self.graph.contains(target) {
            tracing::warn!(
                node = %target,
                from = %self.state.current_node_id,
                "commit to unknown node, will display start"
            );
        }
        let from = std::mem::replace(&mut self.state.current_node_id, target.to_string());
        self.state.transition_count += 1;
        self.history.push(target.to_string());
        Transition {
            from,
            to: target.to_string(),
            transition_count: self.state.transition_count,
        }
    }

    /// Go back to the start node. Counts as a transition.
    pub fn restart(&mut self) -> Transition {
        self.commit(START_NODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wg_story::Choice;

    fn graph() -> Arc<StoryGraph> {
        Arc::new(
            StoryGraph::new([
                StoryNode::new("start", "Clearing.").with_choice(Choice::new("In", "forest")),
                StoryNode::new("forest", "Trees.").with_choice(Choice::new("Out", "start")),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn begins_at_start() {
        let nav = StoryNavigator::new(graph());
        assert_eq!(nav.current_node_id(), "start");
        assert_eq!(nav.transition_count(), 0);
        assert_eq!(nav.current_node().text, "Clearing.");
    }

    #[test]
    fn commit_moves_and_counts() {
        let mut nav = StoryNavigator::new(graph());
        let t = nav.commit("forest");
        assert_eq!(
            t,
            Transition {
                from: "start".to_string(),
                to: "forest".to_string(),
                transition_count: 1
            }
        );
        assert_eq!(nav.current_node().id, "forest");
    }

    #[test]
    fn unknown_target_is_stored_but_resolves_to_start() {
        let mut nav = StoryNavigator::new(graph());
        nav.commit("swamp");
        assert_eq!(nav.current_node_id(), "swamp");
        assert_eq!(nav.current_node().id, "start");
        assert_eq!(nav.transition_count(), 1);
    }

    #[test]
    fn restart_counts() {
        let mut nav = StoryNavigator::new(graph());
        nav.commit("forest");
        let t = nav.restart();
        assert_eq!(t.to, "start");
        assert_eq!(nav.transition_count(), 2);
        assert_eq!(nav.history(), ["forest", "start"]);
    }

    proptest! {
        #[test]
        fn count_and_current_follow_commits(
            targets in proptest::collection::vec("[a-z]{1,6}", 1..30)
        ) {
            let mut nav = StoryNavigator::new(graph());
            for t in &targets {
                nav.commit(t);
            }
            prop_assert_eq!(nav.transition_count(), targets.len() as u64);
            prop_assert_eq!(nav.current_node_id(), targets[targets.len() - 1].as_str());
            prop_assert_eq!(nav.history(), targets.as_slice());
        }
    }
}
