//! Error types for settings storage.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors that can occur while reading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("settings file {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON.
    #[error("corrupt settings file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A stored value has a different type than requested.
    #[error("setting '{key}' is not a {expected}")]
    TypeMismatch {
        /// Key that was read.
        key: String,
        /// Type the caller asked for.
        expected: &'static str,
    },

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("settings lock poisoned")]
    Poisoned,
}
