//! Narrative traversal and gated-interaction engine for Wegweiser.
//!
//! The engine decides which story node is current, when that node's
//! choices become selectable, how a choice commits through a timed
//! hold-to-confirm gesture, and when a rating prompt may interrupt play.
//!
//! Everything observable leaves the engine as a [`StoryEvent`]. Haptics,
//! review dialogs and rendering are collaborators that consume those
//! events; the engine never calls into hardware or UI directly.
//!
//! [`StorySession`] is the synchronous core and takes `now` explicitly on
//! every timed operation. [`StoryDriver`] runs a session as a tokio actor
//! with real, cancellable hold timers.

pub mod clock;
pub mod config;
pub mod driver;
pub mod effects;
pub mod error;
pub mod event;
pub mod hold;
pub mod navigator;
pub mod reveal;
pub mod review;
pub mod session;

pub use clock::{Clock, ManualClock, Millis, SystemClock, TokioClock};
pub use config::{EngineConfig, ReviewPolicy};
pub use driver::{DriverHandle, StoryDriver};
pub use effects::{
    EffectDispatcher, EffectError, HapticSink, NoHaptics, NoReviewChannel, ReviewChannel,
};
pub use error::{EngineError, EngineResult};
pub use event::{EventQueue, StoryEvent};
pub use hold::{HoldPhase, HoldTimer, HoldToConfirm};
pub use navigator::{NavigatorState, StoryNavigator, Transition};
pub use reveal::{RevealState, TextRevealGate};
pub use review::{PromptDecision, ReviewPromptScheduler, ReviewResponse};
pub use session::{SessionSnapshot, StorySession, TimerToken};
pub use wg_settings::ReviewPromptRecord;
