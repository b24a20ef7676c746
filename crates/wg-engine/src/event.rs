//! Events emitted by a story session.

use wg_story::NodeId;

/// Something observable that happened in a session.
///
/// Presentation layers subscribe to these instead of polling state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryEvent {
    // Navigation
    /// The current node changed; its text should start revealing.
    NodeChanged {
        /// The node id as committed (may be unknown to the graph).
        node: NodeId,
        /// Transitions so far, including this one.
        transition_count: u64,
    },
    /// The current node's text finished revealing; choices are interactive.
    ChoicesRevealed {
        /// The revealed node.
        node: NodeId,
    },
    /// A held choice committed.
    ChoiceCommitted {
        /// Index of the choice on the node it was made from.
        choice: usize,
        /// Node the choice was made from.
        from: NodeId,
        /// Target of the choice.
        to: NodeId,
    },

    // Hold gesture
    /// The player started holding a choice.
    HoldStarted {
        /// The held choice.
        choice: usize,
        /// Epoch millis at which the hold commits if not released.
        deadline: i64,
    },
    /// The player let go before the hold completed.
    HoldCancelled {
        /// The released choice.
        choice: usize,
    },
    /// Start haptic feedback.
    HapticBegin {
        /// The held choice.
        choice: usize,
        /// Feedback intensity, 0-255.
        intensity: u8,
    },
    /// Stop haptic feedback.
    HapticStop {
        /// The choice whose hold ended.
        choice: usize,
    },

    // Rating prompt
    /// A rating prompt should be shown. Answer with a `ReviewResponse`.
    ReviewPromptRequested {
        /// Personalized prompt text.
        message: String,
    },
    /// The review channel was asked to show the platform review flow.
    ReviewRequested,

    /// A command sent to the driver was refused.
    CommandRejected {
        /// Why it was refused.
        reason: String,
    },
}

/// Ordered buffer of events waiting to be delivered.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<StoryEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: StoryEvent) {
        tracing::trace!(?event, "story event");
        self.events.push(event);
    }

    /// Take all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<StoryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending events.
    pub fn pending(&self) -> &[StoryEvent] {
        &self.events
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
