//! Collaborator traits for haptics and the review channel.
//!
//! Both collaborators are best-effort. Their failures are logged here and
//! never reach the session, so a broken vibration motor or a missing store
//! page cannot stop the reader from moving on.

use thiserror::Error;

use crate::event::StoryEvent;

/// A collaborator failed.
#[derive(Debug, Error)]
pub enum EffectError {
    /// The platform does not offer this feature.
    #[error("{0} unavailable")]
    Unavailable(String),

    /// The platform call failed.
    #[error("{0}")]
    Failed(String),
}

/// Receives haptic feedback requests.
pub trait HapticSink: Send {
    /// Start continuous feedback at the given intensity.
    fn begin(&mut self, intensity: u8) -> Result<(), EffectError>;

    /// Stop feedback. Stopping when already stopped must be harmless.
    fn stop(&mut self) -> Result<(), EffectError>;
}

/// Opens the platform review flow.
pub trait ReviewChannel: Send {
    /// Whether the platform can show a review flow right now.
    fn is_available(&self) -> bool;

    /// Ask the platform to show the review flow.
    fn request_review(&mut self) -> Result<(), EffectError>;
}

/// A haptic sink that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticSink for NoHaptics {
    fn begin(&mut self, _intensity: u8) -> Result<(), EffectError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EffectError> {
        Ok(())
    }
}

/// A review channel that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReviewChannel;

impl ReviewChannel for NoReviewChannel {
    fn is_available(&self) -> bool {
        false
    }

    fn request_review(&mut self) -> Result<(), EffectError> {
        Err(EffectError::Unavailable("review channel".to_string()))
    }
}

/// Routes haptic events to a [`HapticSink`], swallowing failures.
pub struct EffectDispatcher {
    haptics: Box<dyn HapticSink>,
}

impl EffectDispatcher {
    /// Dispatch to the given sink.
    pub fn new(haptics: Box<dyn HapticSink>) -> Self {
        Self { haptics }
    }

    /// Forward one event. Non-haptic events are ignored.
    pub fn dispatch(&mut self, event: &StoryEvent) {
        let result = match event {
            StoryEvent::HapticBegin { intensity, .. } => self.haptics.begin(*intensity),
            StoryEvent::HapticStop { .. } => self.haptics.stop(),
            _ => return,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, ?event, "haptic feedback failed");
        }
    }
}

impl Default for EffectDispatcher {
    fn default() -> Self {
        Self::new(Box::new(NoHaptics))
    }
}

impl std::fmt::Debug for EffectDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDispatcher").finish_non_exhaustive()
    }
}
