//! JSON story file format.
//!
//! ```json
//! {
//!   "title": "The Clearing",
//!   "nodes": [
//!     { "id": "start", "text": "You wake.", "animation": "wake",
//!       "choices": [ { "label": "Stand up", "target": "forest" } ] },
//!     { "id": "forest", "text": "Trees close in." }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoryError, StoryResult};
use crate::graph::StoryGraph;
use crate::node::StoryNode;

/// On-disk representation of a story.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryFile {
    /// Optional display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// All nodes of the story.
    pub nodes: Vec<StoryNode>,
}

impl StoryFile {
    /// Build the graph, logging any structural issues.
    pub fn into_graph(self) -> StoryResult<StoryGraph> {
        let mut graph = StoryGraph::new(self.nodes)?;
        if let Some(title) = self.title {
            graph = graph.with_title(title);
        }
        for issue in graph.validate() {
            tracing::warn!(%issue, "story graph issue");
        }
        tracing::debug!(nodes = graph.len(), "story graph loaded");
        Ok(graph)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> StoryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl StoryGraph {
    /// Parse a story from JSON text.
    pub fn from_json_str(json: &str) -> StoryResult<Self> {
        let file: StoryFile = serde_json::from_str(json)?;
        file.into_graph()
    }

    /// Read and parse a story file.
    pub fn from_path(path: &Path) -> StoryResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| StoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Choice;

    const CLEARING: &str = r#"{
        "title": "The Clearing",
        "nodes": [
            { "id": "start", "text": "You wake.", "animation": "wake",
              "choices": [ { "label": "Stand up", "target": "forest" } ] },
            { "id": "forest", "text": "Trees close in." }
        ]
    }"#;

    #[test]
    fn parse_story_json() {
        let graph = StoryGraph::from_json_str(CLEARING).unwrap();
        assert_eq!(graph.title(), Some("The Clearing"));
        assert_eq!(graph.len(), 2);
        let start = graph.start();
        assert_eq!(start.animation_ref, "wake");
        assert_eq!(start.choices, vec![Choice::new("Stand up", "forest")]);
    }

    #[test]
    fn parse_error_is_reported() {
        let err = StoryGraph::from_json_str("{ \"nodes\": 3 }").unwrap_err();
        assert!(matches!(err, StoryError::Parse(_)));
    }

    #[test]
    fn missing_start_in_file() {
        let err = StoryGraph::from_json_str(r#"{ "nodes": [ { "id": "a", "text": "" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, StoryError::MissingStart));
    }

    #[test]
    fn load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");
        std::fs::write(&path, CLEARING).unwrap();
        let graph = StoryGraph::from_path(&path).unwrap();
        assert!(graph.contains("forest"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoryGraph::from_path(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoryError::Io { .. }));
    }

    #[test]
    fn write_then_load() {
        let file = StoryFile {
            title: None,
            nodes: vec![StoryNode::new("start", "Only node.")],
        };
        let json = file.to_json().unwrap();
        assert!(!json.contains("title"));
        let graph = StoryGraph::from_json_str(&json).unwrap();
        assert_eq!(graph.start().text, "Only node.");
    }
}
