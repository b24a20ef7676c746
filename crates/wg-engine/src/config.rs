//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::error::{EngineError, EngineResult};

/// Five days in milliseconds.
const FIVE_DAYS_MS: Millis = 5 * 24 * 60 * 60 * 1_000;

/// When a rating prompt may be offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewPolicy {
    /// Offer a prompt only on every n-th transition. Must be positive.
    pub every_n_transitions: u64,
    /// Minimum time since the last prompt, exclusive.
    pub min_interval_ms: Millis,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            every_n_transitions: 10,
            min_interval_ms: FIVE_DAYS_MS,
        }
    }
}

/// Configuration for a story session.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```json
/// { "hold_duration_ms": 3000, "review": { "every_n_transitions": 5 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a choice must be held to commit. Must be positive.
    pub hold_duration_ms: Millis,
    /// Intensity passed to the haptic sink while holding (0-255).
    pub haptic_intensity: u8,
    /// Rating prompt policy.
    pub review: ReviewPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hold_duration_ms: 8_000,
            haptic_intensity: 128,
            review: ReviewPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file.
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validated()
    }

    /// Set the hold duration (at least 1 ms).
    pub fn with_hold_duration_ms(mut self, millis: Millis) -> Self {
        self.hold_duration_ms = millis.max(1);
        self
    }

    /// Set the haptic intensity.
    pub fn with_haptic_intensity(mut self, intensity: u8) -> Self {
        self.haptic_intensity = intensity;
        self
    }

    /// Set the review policy.
    pub fn with_review(mut self, review: ReviewPolicy) -> Self {
        self.review = review;
        self
    }

    /// Reject values the engine cannot work with.
    pub fn validated(self) -> EngineResult<Self> {
        if self.hold_duration_ms <= 0 {
            return Err(EngineError::InvalidConfig(
                "hold_duration_ms must be positive".to_string(),
            ));
        }
        if self.review.every_n_transitions == 0 {
            return Err(EngineError::InvalidConfig(
                "review.every_n_transitions must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.hold_duration_ms, 8_000);
        assert_eq!(config.haptic_intensity, 128);
        assert_eq!(config.review.every_n_transitions, 10);
        assert_eq!(config.review.min_interval_ms, 432_000_000);
    }

    #[test]
    fn builder_chain() {
        let config = EngineConfig::default()
            .with_hold_duration_ms(0)
            .with_haptic_intensity(255)
            .with_review(ReviewPolicy {
                every_n_transitions: 3,
                min_interval_ms: 0,
            });
        assert_eq!(config.hold_duration_ms, 1);
        assert_eq!(config.haptic_intensity, 255);
        assert_eq!(config.review.every_n_transitions, 3);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "review": { "every_n_transitions": 5 } }"#).unwrap();

        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.hold_duration_ms, 8_000);
        assert_eq!(config.review.every_n_transitions, 5);
        assert_eq!(config.review.min_interval_ms, 432_000_000);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "review": { "every_n_transitions": 0 } }"#).unwrap();
        assert!(matches!(
            EngineConfig::from_path(&path),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EngineConfig::from_path(&dir.path().join("none.json")),
            Err(EngineError::ConfigIo { .. })
        ));
    }
}
