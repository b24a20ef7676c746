//! The immutable story graph.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use strsim::jaro_winkler;

use crate::error::{StoryError, StoryResult};
use crate::node::{NodeId, START_NODE, StoryNode};

/// Minimum similarity for suggesting a node id in place of a dangling target.
const SUGGEST_THRESHOLD: f64 = 0.8;

/// Mapping from node id to node, built once and never mutated.
///
/// Construction guarantees that a `"start"` node exists, so
/// [`resolve`](Self::resolve) can always return a node.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    title: Option<String>,
    nodes: HashMap<NodeId, StoryNode>,
}

impl StoryGraph {
    /// Build a graph from a list of nodes.
    ///
    /// Fails if an id is empty or duplicated, or if there is no `"start"` node.
    pub fn new(nodes: impl IntoIterator<Item = StoryNode>) -> StoryResult<Self> {
        let mut map = HashMap::new();
        for (index, node) in nodes.into_iter().enumerate() {
            if node.id.is_empty() {
                return Err(StoryError::EmptyNodeId(index));
            }
            if map.contains_key(&node.id) {
                return Err(StoryError::DuplicateNode(node.id));
            }
            map.insert(node.id.clone(), node);
        }
        if !map.contains_key(START_NODE) {
            return Err(StoryError::MissingStart);
        }
        Ok(Self {
            title: None,
            nodes: map,
        })
    }

    /// Set the story title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The story title, if one was given.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Return the node for `node_id`, or the start node if it is unknown.
    pub fn resolve(&self, node_id: &str) -> &StoryNode {
        match self.nodes.get(node_id) {
            Some(node) => node,
            None => {
                tracing::debug!(node = %node_id, "unknown node id, resolving to start");
                self.start()
            }
        }
    }

    /// The start node.
    pub fn start(&self) -> &StoryNode {
        // Checked in `new`; the map is never mutated afterwards.
        &self.nodes[START_NODE]
    }

    /// Look up a node without falling back.
    pub fn get(&self, node_id: &str) -> Option<&StoryNode> {
        self.nodes.get(node_id)
    }

    /// Whether the graph has a node with this id.
    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a valid graph has at least the start node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, sorted by id.
    pub fn nodes(&self) -> Vec<&StoryNode> {
        let mut nodes: Vec<&StoryNode> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Total number of choices across all nodes.
    pub fn choice_count(&self) -> usize {
        self.nodes.values().map(|n| n.choices.len()).sum()
    }

    /// Report structural problems that do not prevent play.
    ///
    /// Dangling targets fall back to the start node at runtime and
    /// unreachable nodes are simply never shown, so neither is an error.
    pub fn validate(&self) -> Vec<GraphIssue> {
        let mut issues = Vec::new();

        for node in self.nodes() {
            for (choice_index, choice) in node.choices.iter().enumerate() {
                if !self.contains(&choice.target) {
                    issues.push(GraphIssue::DanglingTarget {
                        node: node.id.clone(),
                        choice_index,
                        target: choice.target.clone(),
                        suggestion: self.suggest(&choice.target),
                    });
                }
            }
        }

        let reachable = self.reachable_from_start();
        for node in self.nodes() {
            if !reachable.contains(node.id.as_str()) {
                issues.push(GraphIssue::Unreachable {
                    node: node.id.clone(),
                });
            }
        }

        issues
    }

    fn reachable_from_start(&self) -> HashSet<&str> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([START_NODE]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                for choice in &node.choices {
                    if self.contains(&choice.target) {
                        queue.push_back(choice.target.as_str());
                    }
                }
            }
        }
        seen
    }

    fn suggest(&self, target: &str) -> Option<NodeId> {
        let target_lower = target.to_lowercase();
        self.nodes
            .keys()
            .map(|id| (id, jaro_winkler(&target_lower, &id.to_lowercase())))
            .filter(|(_, score)| *score >= SUGGEST_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id.clone())
    }
}

/// A non-fatal structural problem in a story graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    /// A choice points at a node id that does not exist.
    DanglingTarget {
        /// Node owning the choice.
        node: NodeId,
        /// Index of the choice within the node.
        choice_index: usize,
        /// The missing target id.
        target: NodeId,
        /// A similarly named node, if any.
        suggestion: Option<NodeId>,
    },
    /// A node cannot be reached from the start node.
    Unreachable {
        /// The unreachable node.
        node: NodeId,
    },
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingTarget {
                node,
                choice_index,
                target,
                suggestion,
            } => {
                write!(
                    f,
                    "choice {} of '{node}' targets unknown node '{target}'",
                    choice_index + 1
                )?;
                if let Some(s) = suggestion {
                    write!(f, " (did you mean '{s}'?)")?;
                }
                Ok(())
            }
            Self::Unreachable { node } => write!(f, "node '{node}' is unreachable from start"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Choice;
    use proptest::prelude::*;

    fn sample() -> StoryGraph {
        StoryGraph::new([
            StoryNode::new("start", "You wake in a clearing.")
                .with_choice(Choice::new("Enter the forest", "forest"))
                .with_choice(Choice::new("Follow the river", "rivr")),
            StoryNode::new("forest", "Trees close in.")
                .with_choice(Choice::new("Go back", "start")),
            StoryNode::new("river", "Water rushes past."),
            StoryNode::new("attic", "Dust everywhere."),
        ])
        .unwrap()
    }

    #[test]
    fn missing_start_is_rejected() {
        let err = StoryGraph::new([StoryNode::new("forest", "Trees.")]).unwrap_err();
        assert!(matches!(err, StoryError::MissingStart));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = StoryGraph::new([
            StoryNode::new("start", "a"),
            StoryNode::new("start", "b"),
        ])
        .unwrap_err();
        assert!(matches!(err, StoryError::DuplicateNode(id) if id == "start"));
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = StoryGraph::new([StoryNode::new("start", "a"), StoryNode::new("", "b")])
            .unwrap_err();
        assert!(matches!(err, StoryError::EmptyNodeId(1)));
    }

    #[test]
    fn resolve_known_node() {
        let graph = sample();
        assert_eq!(graph.resolve("forest").id, "forest");
    }

    #[test]
    fn resolve_unknown_falls_back_to_start() {
        let graph = sample();
        assert_eq!(graph.resolve("nowhere").id, "start");
        assert!(graph.get("nowhere").is_none());
    }

    #[test]
    fn nodes_are_sorted() {
        let graph = sample();
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["attic", "forest", "river", "start"]);
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.choice_count(), 3);
    }

    #[test]
    fn validate_reports_dangling_and_unreachable() {
        let issues = sample().validate();
        assert_eq!(
            issues,
            vec![
                GraphIssue::DanglingTarget {
                    node: "start".to_string(),
                    choice_index: 1,
                    target: "rivr".to_string(),
                    suggestion: Some("river".to_string()),
                },
                GraphIssue::Unreachable {
                    node: "attic".to_string()
                },
                GraphIssue::Unreachable {
                    node: "river".to_string()
                },
            ]
        );
    }

    #[test]
    fn issue_display() {
        let issue = GraphIssue::DanglingTarget {
            node: "start".to_string(),
            choice_index: 0,
            target: "forst".to_string(),
            suggestion: Some("forest".to_string()),
        };
        assert_eq!(
            issue.to_string(),
            "choice 1 of 'start' targets unknown node 'forst' (did you mean 'forest'?)"
        );
    }

    #[test]
    fn clean_graph_has_no_issues() {
        let graph = StoryGraph::new([
            StoryNode::new("start", "a").with_choice(Choice::new("on", "end")),
            StoryNode::new("end", "b"),
        ])
        .unwrap();
        assert!(graph.validate().is_empty());
    }

    proptest! {
        #[test]
        fn absent_ids_resolve_to_start(id in "[a-z]{1,12}") {
            let graph = sample();
            prop_assume!(!graph.contains(&id));
            prop_assert_eq!(graph.resolve(&id).id.as_str(), START_NODE);
        }
    }
}
