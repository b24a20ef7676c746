//! Rating prompt scheduling.
//!
//! The scheduler is a pure function of the transition count, the time and
//! the persisted [`ReviewPromptRecord`]. Reading and writing the record and
//! showing the dialog belong to the caller.

use wg_settings::ReviewPromptRecord;

use crate::clock::Millis;
use crate::config::ReviewPolicy;

/// Whether to offer a rating prompt now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptDecision {
    /// Offer the prompt.
    Show,
    /// Stay quiet.
    Suppress,
}

/// The player's answer to a shown prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewResponse {
    /// Open the platform review flow.
    RateNow,
    /// Dismiss; ask again after the cool-down.
    Later,
}

/// Decides when a rating prompt may interrupt play.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewPromptScheduler {
    policy: ReviewPolicy,
}

impl ReviewPromptScheduler {
    /// Create a scheduler with the given policy.
    pub fn new(policy: ReviewPolicy) -> Self {
        Self { policy }
    }

    /// Active policy.
    pub fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    /// Decide after a transition.
    ///
    /// Shows only on every n-th transition (never the zeroth), never to a
    /// player who already rated, and only when strictly more than the
    /// minimum interval has passed since the last prompt. A cadence of
    /// zero never shows.
    pub fn on_transition(
        &self,
        transition_count: u64,
        now: Millis,
        record: &ReviewPromptRecord,
    ) -> PromptDecision {
        let on_cadence = transition_count > 0
            && transition_count.checked_rem(self.policy.every_n_transitions) == Some(0);
        let cooled_down =
            now.saturating_sub(record.last_prompt_at_millis) > self.policy.min_interval_ms;

        if on_cadence && !record.has_rated && cooled_down {
            tracing::info!(transition_count, "offering rating prompt");
            PromptDecision::Show
        } else {
            PromptDecision::Suppress
        }
    }
}

/// Prompt text addressed to the player.
pub fn prompt_message(user_name: &str) -> String {
    format!(
        "Enjoying the journey, {user_name}? A quick rating helps other travelers find their way."
    )
}
