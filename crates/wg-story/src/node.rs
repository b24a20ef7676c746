//! Story nodes and the choices that connect them.

use serde::{Deserialize, Serialize};

/// Identifier of a story node.
pub type NodeId = String;

/// The reserved id every story must define. Unknown ids resolve here.
pub const START_NODE: &str = "start";

/// A unit of narrative content: text, an animation reference, and the
/// choices leading out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    /// Unique identifier within the graph.
    pub id: NodeId,
    /// Text revealed to the reader.
    pub text: String,
    /// Opaque reference to the animation played alongside the text.
    #[serde(rename = "animation", default)]
    pub animation_ref: String,
    /// Outgoing choices, in display order.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl StoryNode {
    /// Create a node with no animation and no choices.
    pub fn new(id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            animation_ref: String::new(),
            choices: Vec::new(),
        }
    }

    /// Set the animation reference.
    pub fn with_animation(mut self, animation_ref: impl Into<String>) -> Self {
        self.animation_ref = animation_ref.into();
        self
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Whether this node ends the story (it has no way out).
    pub fn is_ending(&self) -> bool {
        self.choices.is_empty()
    }

    /// Get a choice by display index.
    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }
}

/// A labeled edge from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown on the choice button.
    pub label: String,
    /// Id of the node this choice leads to.
    pub target: NodeId,
}

impl Choice {
    /// Create a new choice.
    pub fn new(label: impl Into<String>, target: impl Into<NodeId>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}
