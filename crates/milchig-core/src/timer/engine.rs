//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically (once a second in the CLI watch loop).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Expired -> Idle
//! ```
//!
//! Cancelling returns to `Idle` from any state; `Expired` is reached only
//! from `Running`, exactly once per started timer.
//!
//! Starting while a timer is already `Running` never replaces it directly:
//! `start()` answers with [`StartOutcome::NeedsConfirmation`] and the caller
//! prompts the user, calling [`TimerEngine::start_replacing`] only on an
//! explicit yes. Declining therefore leaves the running timer untouched.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Category;
use crate::events::Event;

/// Fixed duration of the hidden debug-mode test timer.
pub const DEBUG_DURATION_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    /// Waiting period elapsed; alerts have been handed off. Cleared back to
    /// `Idle` by `cancel()` (the "stop" action on the completion screen).
    Expired,
}

/// The single active timer: what is being waited out, and until when.
///
/// `end_epoch_ms` is immutable once set - replacing or cancelling the timer
/// is the only way to get a different end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTimer {
    pub category: Category,
    pub end_epoch_ms: u64,
}

/// Answer to a `start()` request.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    Started(Event),
    /// A timer is already running; the caller must confirm replacement with
    /// the user and call `start_replacing()` on yes. On decline, do nothing.
    NeedsConfirmation { running: Category },
}

/// Result of a single `tick()`.
#[derive(Debug, Clone)]
pub enum Tick {
    /// Nothing to do (no running timer).
    Idle,
    /// Timer still running; milliseconds left until the end time.
    Remaining(u64),
    /// Waiting period just elapsed. Returned exactly once.
    Expired(Event),
}

/// Core timer engine.
///
/// Operates on wall-clock timestamps passed in by the caller -- no internal
/// thread. The `*_at` variants take an explicit `now` in epoch milliseconds;
/// the plain methods read the system clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    state: TimerState,
    active: Option<ActiveTimer>,
}

impl TimerEngine {
    /// Create a fresh engine in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            active: None,
        }
    }

    /// Rebuild the engine from the persisted mirror at startup.
    ///
    /// A mirror with an end time still in the future resumes `Running`
    /// without re-confirmation; anything else (absent, corrupt, already
    /// elapsed) yields an `Idle` engine and the caller should clear the
    /// mirror. Calling this twice with the same mirror gives the same state.
    pub fn recover(mirror: Option<ActiveTimer>) -> Self {
        Self::recover_at(mirror, now_ms())
    }

    pub fn recover_at(mirror: Option<ActiveTimer>, now_ms: u64) -> Self {
        match mirror {
            Some(active) if active.end_epoch_ms > now_ms => Self {
                state: TimerState::Running,
                active: Some(active),
            },
            _ => Self::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// The active timer, if one is `Running` (or just `Expired`).
    pub fn active(&self) -> Option<&ActiveTimer> {
        self.active.as_ref()
    }

    pub fn category(&self) -> Option<Category> {
        self.active.map(|a| a.category)
    }

    pub fn end_epoch_ms(&self) -> Option<u64> {
        self.active.map(|a| a.end_epoch_ms)
    }

    /// Milliseconds left until the end time, clamped to zero.
    pub fn remaining_ms_at(&self, now_ms: u64) -> u64 {
        match (self.state, self.active) {
            (TimerState::Running, Some(active)) => active.end_epoch_ms.saturating_sub(now_ms),
            _ => 0,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        self.snapshot_at(now_ms())
    }

    pub fn snapshot_at(&self, now_ms: u64) -> Event {
        let remaining_ms = self.remaining_ms_at(now_ms);
        Event::StateSnapshot {
            state: self.state,
            category: self.category(),
            end_epoch_ms: self.end_epoch_ms(),
            remaining_ms,
            countdown: super::format_countdown(remaining_ms),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a timer for `category` lasting `duration_ms`.
    ///
    /// If a timer is already `Running` this does not touch it and instead
    /// asks the caller to confirm replacement.
    pub fn start(&mut self, category: Category, duration_ms: u64) -> StartOutcome {
        self.start_at(category, duration_ms, now_ms())
    }

    pub fn start_at(&mut self, category: Category, duration_ms: u64, now_ms: u64) -> StartOutcome {
        if self.state == TimerState::Running {
            if let Some(active) = self.active {
                return StartOutcome::NeedsConfirmation {
                    running: active.category,
                };
            }
        }
        StartOutcome::Started(self.start_replacing_at(category, duration_ms, now_ms))
    }

    /// Start unconditionally, replacing any running timer. Call only after
    /// the user confirmed replacement (or when nothing is running).
    pub fn start_replacing(&mut self, category: Category, duration_ms: u64) -> Event {
        self.start_replacing_at(category, duration_ms, now_ms())
    }

    pub fn start_replacing_at(
        &mut self,
        category: Category,
        duration_ms: u64,
        now_ms: u64,
    ) -> Event {
        let end_epoch_ms = now_ms.saturating_add(duration_ms);
        self.state = TimerState::Running;
        self.active = Some(ActiveTimer {
            category,
            end_epoch_ms,
        });
        Event::TimerStarted {
            category,
            duration_ms,
            end_epoch_ms,
            at: Utc::now(),
        }
    }

    /// Call periodically while `Running`.
    ///
    /// Returns `Tick::Expired` exactly once, at the tick where the remaining
    /// time reaches zero; the caller clears the persisted mirror and invokes
    /// the alert dispatcher.
    pub fn tick(&mut self) -> Tick {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now_ms: u64) -> Tick {
        let (TimerState::Running, Some(active)) = (self.state, self.active) else {
            return Tick::Idle;
        };
        let remaining = active.end_epoch_ms.saturating_sub(now_ms);
        if remaining == 0 {
            self.state = TimerState::Expired;
            return Tick::Expired(Event::TimerExpired {
                category: active.category,
                at: Utc::now(),
            });
        }
        Tick::Remaining(remaining)
    }

    /// Cancel from any state, returning to `Idle`.
    ///
    /// Confirmation is the UI layer's responsibility: a declined confirm
    /// simply means this is never called. Returns `None` when there was
    /// nothing to cancel.
    pub fn cancel(&mut self) -> Option<Event> {
        if self.state == TimerState::Idle && self.active.is_none() {
            return None;
        }
        self.state = TimerState::Idle;
        self.active = None;
        Some(Event::TimerCancelled { at: Utc::now() })
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
