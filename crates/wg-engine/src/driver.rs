//! Async single-writer driver.
//!
//! [`StoryDriver`] moves a [`StorySession`] into a tokio task and feeds it
//! from a command channel, so any number of UI tasks can share one session
//! without locking. Each hold gets one sleeping task that posts its
//! [`TimerToken`] back into the actor when the deadline passes. Releasing,
//! or any transition, aborts the sleeper; a firing that was already in
//! flight is rejected by the session's epoch and generation checks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use wg_story::NodeId;

use crate::clock::Clock;
use crate::effects::EffectDispatcher;
use crate::error::{EngineError, EngineResult};
use crate::event::StoryEvent;
use crate::hold::HoldToConfirm;
use crate::review::ReviewResponse;
use crate::session::{SessionSnapshot, StorySession, TimerToken};

/// A request for the driver task.
#[derive(Debug)]
pub enum DriverCommand {
    /// The renderer finished revealing a node.
    RevealFinished(NodeId),
    /// Press a choice.
    StartHold(usize),
    /// Let go of a choice.
    Release(usize),
    /// Answer a pending rating prompt.
    Review(ReviewResponse),
    /// Go back to the start node.
    Restart,
    /// Reply with a snapshot of the session.
    Snapshot(oneshot::Sender<SessionSnapshot>),
    /// Stop the driver.
    Shutdown,
}

/// Cloneable handle for sending commands to a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<DriverCommand>,
}

impl DriverHandle {
    fn send(&self, command: DriverCommand) -> EngineResult<()> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::DriverClosed)
    }

    /// Report that a node's text finished revealing.
    pub fn reveal_finished(&self, node_id: impl Into<NodeId>) -> EngineResult<()> {
        self.send(DriverCommand::RevealFinished(node_id.into()))
    }

    /// Press a choice.
    pub fn start_hold(&self, choice: usize) -> EngineResult<()> {
        self.send(DriverCommand::StartHold(choice))
    }

    /// Let go of a choice.
    pub fn release(&self, choice: usize) -> EngineResult<()> {
        self.send(DriverCommand::Release(choice))
    }

    /// Answer a pending rating prompt.
    pub fn respond_to_review(&self, response: ReviewResponse) -> EngineResult<()> {
        self.send(DriverCommand::Review(response))
    }

    /// Go back to the start node.
    pub fn restart(&self) -> EngineResult<()> {
        self.send(DriverCommand::Restart)
    }

    /// Fetch a snapshot of the session.
    pub async fn snapshot(&self) -> EngineResult<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(DriverCommand::Snapshot(tx))?;
        rx.await.map_err(|_| EngineError::DriverClosed)
    }

    /// Stop the driver. Pending timers are cancelled.
    pub fn shutdown(&self) -> EngineResult<()> {
        self.send(DriverCommand::Shutdown)
    }
}

/// Runs a story session as a tokio actor.
pub struct StoryDriver {
    session: StorySession,
    clock: Arc<dyn Clock>,
    effects: EffectDispatcher,
    events: mpsc::UnboundedSender<StoryEvent>,
    timers: HashMap<usize, (TimerToken, JoinHandle<()>)>,
    timer_tx: mpsc::UnboundedSender<TimerToken>,
}

impl StoryDriver {
    /// Spawn the driver on the current tokio runtime.
    ///
    /// Returns the command handle and the event stream. Haptic events are
    /// routed through `effects` before being forwarded. The driver stops
    /// on [`DriverHandle::shutdown`] or when every handle is dropped.
    pub fn spawn(
        session: StorySession,
        clock: Arc<dyn Clock>,
        effects: EffectDispatcher,
    ) -> (DriverHandle, mpsc::UnboundedReceiver<StoryEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let driver = Self {
            session,
            clock,
            effects,
            events: event_tx,
            timers: HashMap::new(),
            timer_tx,
        };
        tokio::spawn(driver.run(command_rx, timer_rx));

        (
            DriverHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<DriverCommand>,
        mut timers: mpsc::UnboundedReceiver<TimerToken>,
    ) {
        self.flush();
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(DriverCommand::Shutdown) => break,
                    Some(command) => self.handle(command),
                },
                Some(token) = timers.recv() => self.on_timer(token),
            }
            self.flush();
        }
        self.cancel_all_timers();
        tracing::debug!("story driver stopped");
    }

    fn handle(&mut self, command: DriverCommand) {
        let now = self.clock.now();
        let before = self.session.transition_count();

        match command {
            DriverCommand::RevealFinished(node_id) => {
                self.session.reveal_finished(&node_id);
            }
            DriverCommand::StartHold(choice) => match self.session.start_hold(choice, now) {
                Ok(Some(token)) => self.schedule(token),
                Ok(None) => {}
                Err(e) => self.reject(e),
            },
            DriverCommand::Release(choice) => {
                self.cancel_timer(choice);
                if let Err(e) = self.session.release(choice, now) {
                    self.reject(e);
                }
            }
            DriverCommand::Review(response) => {
                self.session.respond_to_review(response, now);
            }
            DriverCommand::Restart => {
                self.session.restart(now);
            }
            DriverCommand::Snapshot(reply) => {
                let _ = reply.send(self.session.snapshot());
            }
            DriverCommand::Shutdown => {}
        }

        self.after_transition(before);
    }

    fn on_timer(&mut self, token: TimerToken) {
        let choice = token.timer.choice;
        if self
            .timers
            .get(&choice)
            .is_some_and(|(scheduled, _)| *scheduled == token)
        {
            self.timers.remove(&choice);
        }
        let before = self.session.transition_count();
        let now = self.clock.now();
        if !self.session.timer_fired(token, now)
            && now < token.deadline()
            && self.is_pending(&token)
        {
            // The sleeper can wake before the session clock reaches the deadline.
            tracing::debug!(
                choice,
                now,
                deadline = token.deadline(),
                "timer woke early, rescheduling"
            );
            self.schedule(token);
        }
        self.after_transition(before);
    }

    fn is_pending(&self, token: &TimerToken) -> bool {
        token.epoch == self.session.transition_count()
            && self
                .session
                .hold(token.timer.choice)
                .and_then(HoldToConfirm::pending_timer)
                == Some(token.timer)
    }

    fn schedule(&mut self, token: TimerToken) {
        let delay = token.deadline().saturating_sub(self.clock.now()).max(0);
        let tx = self.timer_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay.unsigned_abs())).await;
            let _ = tx.send(token);
        });
        if let Some((_, old)) = self.timers.insert(token.timer.choice, (token, handle)) {
            old.abort();
        }
    }

    fn cancel_timer(&mut self, choice: usize) {
        if let Some((_, handle)) = self.timers.remove(&choice) {
            handle.abort();
        }
    }

    fn cancel_all_timers(&mut self) {
        for (_, (_, handle)) in self.timers.drain() {
            handle.abort();
        }
    }

    fn after_transition(&mut self, before: u64) {
        if self.session.transition_count() != before {
            self.cancel_all_timers();
        }
    }

    fn reject(&mut self, error: EngineError) {
        tracing::debug!(error = %error, "command rejected");
        let _ = self.events.send(StoryEvent::CommandRejected {
            reason: error.to_string(),
        });
    }

    fn flush(&mut self) {
        for event in self.session.drain_events() {
            self.effects.dispatch(&event);
            let _ = self.events.send(event);
        }
    }
}
