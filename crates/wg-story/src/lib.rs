//! Story graph model for Wegweiser.
//!
//! A story is a directed graph of [`StoryNode`]s connected by [`Choice`]s.
//! The graph is built once, either programmatically or from a JSON story
//! file, and is read-only for the rest of a session. Lookups never fail:
//! unknown ids resolve to the reserved `"start"` node.

pub mod error;
pub mod format;
pub mod graph;
pub mod node;

pub use error::{StoryError, StoryResult};
pub use format::StoryFile;
pub use graph::{GraphIssue, StoryGraph};
pub use node::{Choice, NodeId, START_NODE, StoryNode};
