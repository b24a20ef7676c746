//! Hold-to-confirm state machine.
//!
//! Each displayed choice owns one [`HoldToConfirm`]. Pressing starts a hold
//! and hands out a [`HoldTimer`]; the owner arranges for the timer to fire
//! at its deadline. Releasing early cancels. The phase plus a generation
//! counter decide what a late or duplicate timer does, so release and
//! timeout may race freely:
//!
//! ```text
//!          start_hold            timer fired (same generation)
//!   Idle ─────────────▶ Holding ─────────────────────────────▶ Committed
//!    ▲                    │
//!    └──── Cancelled ◀────┘ release before the deadline
//! ```
//!
//! `Cancelled` is passed through immediately; callers observe `Idle`.
//! `Committed` stays until [`reset`](HoldToConfirm::reset).

use crate::clock::Millis;
use crate::event::{EventQueue, StoryEvent};

/// Phase of a hold session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldPhase {
    /// Not pressed.
    #[default]
    Idle,
    /// Pressed; waiting for the deadline.
    Holding,
    /// Held long enough; the choice was committed.
    Committed,
    /// Released early. Transient.
    Cancelled,
}

/// Handle for the deferred commit of one hold cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldTimer {
    /// Choice the timer belongs to.
    pub choice: usize,
    /// Hold cycle the timer was issued for.
    pub generation: u64,
    /// When the timer should fire.
    pub deadline: Millis,
}

/// Timed commitment for a single choice.
#[derive(Debug, Clone)]
pub struct HoldToConfirm {
    choice: usize,
    duration: Millis,
    intensity: u8,
    phase: HoldPhase,
    started_at: Option<Millis>,
    generation: u64,
}

impl HoldToConfirm {
    /// Create an idle session for `choice`.
    pub fn new(choice: usize, duration: Millis, intensity: u8) -> Self {
        Self {
            choice,
            duration,
            intensity,
            phase: HoldPhase::Idle,
            started_at: None,
            generation: 0,
        }
    }

    /// Index of the owning choice.
    pub fn choice(&self) -> usize {
        self.choice
    }

    /// Current phase.
    pub fn phase(&self) -> HoldPhase {
        self.phase
    }

    /// When the current hold started.
    pub fn started_at(&self) -> Option<Millis> {
        self.started_at
    }

    /// The outstanding timer, if a hold is in progress.
    pub fn pending_timer(&self) -> Option<HoldTimer> {
        match (self.phase, self.started_at) {
            (HoldPhase::Holding, Some(started)) => Some(self.timer(started)),
            _ => None,
        }
    }

    /// Fraction of the hold completed at `now`, from 0.0 to 1.0.
    pub fn progress(&self, now: Millis) -> f32 {
        match (self.phase, self.started_at) {
            (HoldPhase::Committed, _) => 1.0,
            (HoldPhase::Holding, Some(started)) => {
                let elapsed = now.saturating_sub(started).max(0);
                (elapsed as f64 / self.duration as f64).min(1.0) as f32
            }
            _ => 0.0,
        }
    }

    /// Begin holding. Only valid from `Idle`; otherwise nothing happens.
    pub fn start_hold(&mut self, now: Millis, out: &mut EventQueue) -> Option<HoldTimer> {
        if self.phase != HoldPhase::Idle {
            return None;
        }
        self.phase = HoldPhase::Holding;
        self.started_at = Some(now);
        self.generation += 1;

        let timer = self.timer(now);
        out.push(StoryEvent::HapticBegin {
            choice: self.choice,
            intensity: self.intensity,
        });
        out.push(StoryEvent::HoldStarted {
            choice: self.choice,
            deadline: timer.deadline,
        });
        Some(timer)
    }

    /// Let go of the choice.
    ///
    /// Before the deadline this cancels and returns `false`. At or after
    /// the deadline the timer is merely late, so the hold commits and
    /// this returns `true`. Outside `Holding` it does nothing.
    pub fn release(&mut self, now: Millis, out: &mut EventQueue) -> bool {
        let Some(started) = self.holding_since() else {
            return false;
        };
        if now.saturating_sub(started) >= self.duration {
            return self.complete(out);
        }

        self.phase = HoldPhase::Cancelled;
        self.generation += 1;
        out.push(StoryEvent::HapticStop {
            choice: self.choice,
        });
        out.push(StoryEvent::HoldCancelled {
            choice: self.choice,
        });
        tracing::debug!(choice = self.choice, held_ms = now - started, "hold cancelled");
        self.phase = HoldPhase::Idle;
        self.started_at = None;
        false
    }

    /// Deliver a timer. Returns `true` exactly once per hold cycle, when
    /// the hold commits.
    ///
    /// Timers from an earlier cycle, timers arriving after a release, and
    /// repeated deliveries are ignored.
    pub fn on_timer_fired(&mut self, timer: HoldTimer, now: Millis, out: &mut EventQueue) -> bool {
        let Some(started) = self.holding_since() else {
            return false;
        };
        if timer.choice != self.choice || timer.generation != self.generation {
            tracing::trace!(choice = self.choice, "ignoring stale hold timer");
            return false;
        }
        if now.saturating_sub(started) < self.duration {
            return false;
        }
        self.complete(out)
    }

    /// Return to `Idle`, invalidating any outstanding timer.
    pub fn reset(&mut self, out: &mut EventQueue) {
        if self.phase == HoldPhase::Holding {
            out.push(StoryEvent::HapticStop {
                choice: self.choice,
            });
        }
        self.phase = HoldPhase::Idle;
        self.started_at = None;
        self.generation += 1;
    }

    fn holding_since(&self) -> Option<Millis> {
        match self.phase {
            HoldPhase::Holding => self.started_at,
            _ => None,
        }
    }

    fn complete(&mut self, out: &mut EventQueue) -> bool {
        self.phase = HoldPhase::Committed;
        out.push(StoryEvent::HapticStop {
            choice: self.choice,
        });
        tracing::debug!(choice = self.choice, "hold completed");
        true
    }

    fn timer(&self, started: Millis) -> HoldTimer {
        HoldTimer {
            choice: self.choice,
            generation: self.generation,
            deadline: started.saturating_add(self.duration),
        }
    }
}
