//! Error types for story loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for story operations.
pub type StoryResult<T> = Result<T, StoryError>;

/// Errors that can occur while building or loading a story graph.
///
/// All of these are configuration errors raised at load time. Once a
/// [`StoryGraph`](crate::StoryGraph) exists, lookups cannot fail.
#[derive(Debug, Error)]
pub enum StoryError {
    /// The graph has no node with the reserved `"start"` id.
    #[error("story has no \"start\" node")]
    MissingStart,

    /// Two nodes share the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// A node id is empty.
    #[error("node #{0} has an empty id")]
    EmptyNodeId(usize),

    /// The story file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The story file is not valid JSON for the story format.
    #[error("invalid story file: {0}")]
    Parse(#[from] serde_json::Error),
}
