//! Text reveal gate.
//!
//! The renderer animates a node's text on its own clock and reports back
//! when it is done. Completion reports can arrive after the player has
//! already moved on, so a report only counts if it names the node the
//! gate is currently tracking.

use wg_story::{NodeId, START_NODE};

/// Reveal progress of the current node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealState {
    /// The node being revealed.
    pub node_id: NodeId,
    /// Whether its text has finished revealing.
    pub revealed: bool,
}

/// Gates choice visibility on the current node's text reveal.
#[derive(Debug, Clone)]
pub struct TextRevealGate {
    state: RevealState,
}

impl TextRevealGate {
    /// Create a gate tracking the start node, not yet revealed.
    pub fn new() -> Self {
        Self {
            state: RevealState {
                node_id: START_NODE.to_string(),
                revealed: false,
            },
        }
    }

    /// Start tracking a new node. Choices hide until it is revealed.
    pub fn on_node_changed(&mut self, node_id: &str) {
        self.state = RevealState {
            node_id: node_id.to_string(),
            revealed: false,
        };
    }

    /// Mark `node_id` revealed if it is the tracked node.
    ///
    /// Returns `true` only on the call that flips the state; stale and
    /// repeated reports return `false`.
    pub fn on_reveal_finished(&mut self, node_id: &str) -> bool {
        if self.state.node_id != node_id {
            tracing::debug!(
                reported = %node_id,
                current = %self.state.node_id,
                "ignoring stale reveal completion"
            );
            return false;
        }
        if self.state.revealed {
            return false;
        }
        self.state.revealed = true;
        true
    }

    /// Whether the tracked node's choices are visible.
    pub fn is_choices_visible(&self) -> bool {
        self.state.revealed
    }

    /// Whether choices are visible *and* the gate is tracking `node_id`.
    pub fn is_choices_visible_for(&self, node_id: &str) -> bool {
        self.state.revealed && self.state.node_id == node_id
    }

    /// Current state.
    pub fn state(&self) -> &RevealState {
        &self.state
    }
}

impl Default for TextRevealGate {
    fn default() -> Self {
        Self::new()
    }
}
