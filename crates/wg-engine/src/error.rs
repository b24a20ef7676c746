//! Error types for the engine.

use std::path::PathBuf;

use thiserror::Error;
use wg_story::NodeId;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned to callers of the engine.
///
/// Collaborator failures (haptics, review channel, settings writes) are
/// not here: they are logged and swallowed so they never block play.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The choice index does not exist on the current node.
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),

    /// The current node's text has not finished revealing.
    #[error("choices of '{0}' are not visible yet")]
    ChoicesHidden(NodeId),

    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A config value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The story could not be loaded.
    #[error("{0}")]
    Story(#[from] wg_story::StoryError),

    /// Settings storage failed.
    #[error("{0}")]
    Settings(#[from] wg_settings::SettingsError),

    /// The driver task has stopped.
    #[error("story driver is not running")]
    DriverClosed,
}
