//! Story session orchestration.
//!
//! `StorySession` owns one play-through: the navigator, the reveal gate,
//! one hold session per displayed choice, and the review scheduler. It is
//! the only mutation surface a presentation layer needs. All mutation
//! takes `&mut self`, so a session is driven by one writer at a time; use
//! [`StoryDriver`](crate::StoryDriver) to share it across tasks.
//!
//! Timed operations take `now` explicitly. A cooperative runtime can call
//! [`tick`](StorySession::tick) from its frame loop; a timer-based runtime
//! schedules the [`TimerToken`] returned by
//! [`start_hold`](StorySession::start_hold) and hands it back through
//! [`timer_fired`](StorySession::timer_fired).

use std::sync::Arc;

use wg_settings::{ReviewPromptRecord, SettingsStore, user_display_name};
use wg_story::{Choice, NodeId, START_NODE, StoryGraph, StoryNode};

use crate::clock::Millis;
use crate::config::EngineConfig;
use crate::effects::{NoReviewChannel, ReviewChannel};
use crate::error::{EngineError, EngineResult};
use crate::event::{EventQueue, StoryEvent};
use crate::hold::{HoldPhase, HoldTimer, HoldToConfirm};
use crate::navigator::{StoryNavigator, Transition};
use crate::reveal::{RevealState, TextRevealGate};
use crate::review::{PromptDecision, ReviewPromptScheduler, ReviewResponse, prompt_message};

/// A hold timer stamped with the node visit it was issued on.
///
/// Hold sessions are rebuilt on every transition, so a timer left over
/// from an earlier node is rejected by its epoch before it can reach a
/// hold session that happens to share its choice index and generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    /// Transition count when the timer was issued.
    pub epoch: u64,
    /// The hold timer.
    pub timer: HoldTimer,
}

impl TimerToken {
    /// When the timer should fire.
    pub fn deadline(&self) -> Millis {
        self.timer.deadline
    }
}

/// Point-in-time view of a session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Node id as committed. Report reveal completion with this id.
    pub node_id: NodeId,
    /// The node to display (the start node if `node_id` is unknown).
    pub node: StoryNode,
    /// Transitions so far.
    pub transition_count: u64,
    /// Reveal progress.
    pub reveal: RevealState,
    /// Whether choices are interactive.
    pub choices_visible: bool,
    /// Phase of each choice's hold session.
    pub hold_phases: Vec<HoldPhase>,
    /// Whether a rating prompt is waiting for an answer.
    pub review_pending: bool,
}

/// One play-through of a story.
pub struct StorySession {
    config: EngineConfig,
    navigator: StoryNavigator,
    reveal: TextRevealGate,
    holds: Vec<HoldToConfirm>,
    scheduler: ReviewPromptScheduler,
    settings: Arc<dyn SettingsStore>,
    review_channel: Box<dyn ReviewChannel>,
    review_pending: bool,
    events: EventQueue,
}

impl StorySession {
    /// Start a session at the start node with the default config.
    pub fn new(graph: Arc<StoryGraph>, settings: Arc<dyn SettingsStore>) -> Self {
        Self::build(graph, settings, EngineConfig::default())
    }

    /// Start a session at the start node.
    ///
    /// The config is checked with [`EngineConfig::validated`] first. The
    /// first pending event is `NodeChanged` for the start node.
    pub fn with_config(
        graph: Arc<StoryGraph>,
        settings: Arc<dyn SettingsStore>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        Ok(Self::build(graph, settings, config.validated()?))
    }

    fn build(
        graph: Arc<StoryGraph>,
        settings: Arc<dyn SettingsStore>,
        config: EngineConfig,
    ) -> Self {
        let scheduler = ReviewPromptScheduler::new(config.review);
        let mut session = Self {
            config,
            navigator: StoryNavigator::new(graph),
            reveal: TextRevealGate::new(),
            holds: Vec::new(),
            scheduler,
            settings,
            review_channel: Box::new(NoReviewChannel),
            review_pending: false,
            events: EventQueue::new(),
        };
        session.enter_current_node();
        session
    }

    /// Use a review channel for accepted rating prompts.
    pub fn with_review_channel(mut self, channel: Box<dyn ReviewChannel>) -> Self {
        self.review_channel = channel;
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The node to display.
    pub fn current_node(&self) -> &StoryNode {
        self.navigator.current_node()
    }

    /// Id of the current node as committed.
    pub fn current_node_id(&self) -> &str {
        self.navigator.current_node_id()
    }

    /// Transitions so far.
    pub fn transition_count(&self) -> u64 {
        self.navigator.transition_count()
    }

    /// Reveal progress of the current node.
    pub fn reveal_state(&self) -> &RevealState {
        self.reveal.state()
    }

    /// Whether the current node's choices are interactive.
    pub fn choices_visible(&self) -> bool {
        self.reveal
            .is_choices_visible_for(self.navigator.current_node_id())
    }

    /// Choices to render; empty until the text has been revealed.
    pub fn visible_choices(&self) -> &[Choice] {
        if self.choices_visible() {
            &self.current_node().choices
        } else {
            &[]
        }
    }

    /// Hold session of a displayed choice.
    pub fn hold(&self, choice: usize) -> Option<&HoldToConfirm> {
        self.holds.get(choice)
    }

    /// Phase of a displayed choice's hold session.
    pub fn hold_phase(&self, choice: usize) -> Option<HoldPhase> {
        self.holds.get(choice).map(HoldToConfirm::phase)
    }

    /// Earliest deadline of any hold in progress.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.holds
            .iter()
            .filter_map(HoldToConfirm::pending_timer)
            .map(|t| t.deadline)
            .min()
    }

    /// Whether a rating prompt is waiting for an answer.
    pub fn is_review_pending(&self) -> bool {
        self.review_pending
    }

    /// Take all pending events, oldest first.
    pub fn drain_events(&mut self) -> Vec<StoryEvent> {
        self.events.drain()
    }

    /// Point-in-time view for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.navigator.state();
        SessionSnapshot {
            node_id: state.current_node_id.clone(),
            node: self.current_node().clone(),
            transition_count: state.transition_count,
            reveal: self.reveal.state().clone(),
            choices_visible: self.choices_visible(),
            hold_phases: self.holds.iter().map(HoldToConfirm::phase).collect(),
            review_pending: self.review_pending,
        }
    }

    // -----------------------------------------------------------------------
    // Renderer input
    // -----------------------------------------------------------------------

    /// The renderer finished revealing `node_id`'s text.
    ///
    /// `node_id` must be the id from `NodeChanged` (or
    /// [`SessionSnapshot::node_id`]). Reports for any other node are
    /// stale and ignored. Returns whether choices just became visible.
    pub fn reveal_finished(&mut self, node_id: &str) -> bool {
        if !self.reveal.on_reveal_finished(node_id) {
            return false;
        }
        self.events.push(StoryEvent::ChoicesRevealed {
            node: node_id.to_string(),
        });
        true
    }

    /// The player pressed a choice.
    ///
    /// Returns the timer to schedule, or `None` if that choice is already
    /// being held.
    pub fn start_hold(&mut self, choice: usize, now: Millis) -> EngineResult<Option<TimerToken>> {
        if !self.choices_visible() {
            return Err(EngineError::ChoicesHidden(
                self.navigator.current_node_id().to_string(),
            ));
        }
        let epoch = self.epoch();
        let hold = self
            .holds
            .get_mut(choice)
            .ok_or(EngineError::InvalidChoice(choice))?;
        Ok(hold
            .start_hold(now, &mut self.events)
            .map(|timer| TimerToken { epoch, timer }))
    }

    /// The player let go of a choice.
    ///
    /// Returns whether the release committed the choice, which happens
    /// only when the deadline has already passed.
    pub fn release(&mut self, choice: usize, now: Millis) -> EngineResult<bool> {
        let hold = self
            .holds
            .get_mut(choice)
            .ok_or(EngineError::InvalidChoice(choice))?;
        if hold.release(now, &mut self.events) {
            self.commit_choice(choice, now);
            return Ok(true);
        }
        Ok(false)
    }

    /// A scheduled hold timer fired. Returns whether it committed.
    pub fn timer_fired(&mut self, token: TimerToken, now: Millis) -> bool {
        if token.epoch != self.epoch() {
            tracing::trace!(choice = token.timer.choice, "ignoring timer from earlier node");
            return false;
        }
        let choice = token.timer.choice;
        let Some(hold) = self.holds.get_mut(choice) else {
            return false;
        };
        if hold.on_timer_fired(token.timer, now, &mut self.events) {
            self.commit_choice(choice, now);
            return true;
        }
        false
    }

    /// Fire the earliest due hold timer, if any. Returns whether a choice
    /// committed.
    ///
    /// A commit rebuilds every hold session, so at most one choice can
    /// commit per call even if several deadlines have passed.
    pub fn tick(&mut self, now: Millis) -> bool {
        let epoch = self.epoch();
        let due = self
            .holds
            .iter()
            .filter_map(HoldToConfirm::pending_timer)
            .filter(|t| t.deadline <= now)
            .min_by_key(|t| t.deadline);
        match due {
            Some(timer) => self.timer_fired(TimerToken { epoch, timer }, now),
            None => false,
        }
    }

    /// Go back to the start node. Counts as a transition.
    pub fn restart(&mut self, now: Millis) -> Transition {
        self.navigate(START_NODE, now)
    }

    /// The player answered a rating prompt.
    ///
    /// Returns `false` if no prompt was pending.
    pub fn respond_to_review(&mut self, response: ReviewResponse, now: Millis) -> bool {
        if !std::mem::take(&mut self.review_pending) {
            tracing::debug!(?response, "no rating prompt pending");
            return false;
        }

        let rated = response == ReviewResponse::RateNow;
        match ReviewPromptRecord::load(self.settings.as_ref()) {
            Ok(record) => {
                if let Err(e) = record.after_prompt(now, rated).save(self.settings.as_ref()) {
                    tracing::warn!(
                        error = %e,
                        store = self.settings.name(),
                        "cannot save review record"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    store = self.settings.name(),
                    "cannot read review record"
                );
            }
        }

        if rated {
            if self.review_channel.is_available() {
                match self.review_channel.request_review() {
                    Ok(()) => self.events.push(StoryEvent::ReviewRequested),
                    Err(e) => tracing::warn!(error = %e, "review request failed"),
                }
            } else {
                tracing::info!("review channel unavailable, skipping review request");
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn epoch(&self) -> u64 {
        self.navigator.transition_count()
    }

    fn commit_choice(&mut self, choice: usize, now: Millis) {
        let from = self.navigator.current_node_id().to_string();
        let Some(target) = self
            .current_node()
            .choice(choice)
            .map(|c| c.target.clone())
        else {
            return;
        };
        self.events.push(StoryEvent::ChoiceCommitted {
            choice,
            from,
            to: target.clone(),
        });
        self.navigate(&target, now);
    }

    fn navigate(&mut self, target: &str, now: Millis) -> Transition {
        for hold in &mut self.holds {
            hold.reset(&mut self.events);
        }
        let transition = self.navigator.commit(target);
        tracing::info!(
            from = %transition.from,
            to = %transition.to,
            count = transition.transition_count,
            "transition"
        );
        self.enter_current_node();
        self.consult_scheduler(transition.transition_count, now);
        transition
    }

    fn enter_current_node(&mut self) {
        let node_id = self.navigator.current_node_id().to_string();
        self.reveal.on_node_changed(&node_id);

        let choices = self.navigator.current_node().choices.len();
        self.holds = (0..choices)
            .map(|i| {
                HoldToConfirm::new(i, self.config.hold_duration_ms, self.config.haptic_intensity)
            })
            .collect();

        self.events.push(StoryEvent::NodeChanged {
            node: node_id,
            transition_count: self.navigator.transition_count(),
        });
    }

    fn consult_scheduler(&mut self, transition_count: u64, now: Millis) {
        if self.review_pending {
            return;
        }
        let record = match ReviewPromptRecord::load(self.settings.as_ref()) {
            Ok(record) => record,
            Err(e) => {
                // Without the record we cannot tell whether they already rated.
                tracing::warn!(
                    error = %e,
                    store = self.settings.name(),
                    "cannot read review record"
                );
                return;
            }
        };
        if self.scheduler.on_transition(transition_count, now, &record) == PromptDecision::Show {
            self.review_pending = true;
            let name = user_display_name(self.settings.as_ref());
            self.events.push(StoryEvent::ReviewPromptRequested {
                message: prompt_message(&name),
            });
        }
    }
}
