// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The timer engine: session ownership and the three-state machine.
//!
//! ```text
//!           start(minutes)              progress >= 1
//!   Idle ─────────────────► Running ─────────────────► Finished
//!    ▲                         │                          │
//!    │   stop(confirmed=true)  │                          │
//!    ├─────────────────────────┘                          │
//!    │                  finish hold elapses               │
//!    └────────────────────────────────────────────────────┘
//! ```
//!
//! The engine has no knowledge of frames, displays, or media. It is driven
//! entirely by the timestamps handed to it, which keeps it testable with
//! plain numbers.

use core::fmt;

use crate::session::{SessionId, StartError, TimerSession};
use crate::time::{Duration, HostTime, Timebase};
use crate::timing::TickSample;

/// Which of the three UI states is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UiState {
    /// No session; the duration picker is shown.
    #[default]
    Idle,
    /// A session is counting down.
    Running,
    /// The session completed; waiting for the finish hold to elapse.
    Finished,
}

/// Errors from engine operations that require a running session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The operation needs a running session, but the engine is in the given
    /// state.
    NotRunning(UiState),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning(state) => write!(f, "no running session (state is {state:?})"),
        }
    }
}

impl core::error::Error for EngineError {}

/// Owns the single active [`TimerSession`] and the [`UiState`].
#[derive(Clone, Debug)]
pub struct TimerEngine {
    timebase: Timebase,
    finish_hold: Duration,
    state: UiState,
    session: Option<TimerSession>,
    finished_at: Option<HostTime>,
    generation: u64,
}

impl TimerEngine {
    /// Creates an idle engine.
    ///
    /// `finish_hold` is how long the Finished state lasts before
    /// [`revert_if_due`](Self::revert_if_due) returns to Idle.
    #[must_use]
    pub const fn new(timebase: Timebase, finish_hold: Duration) -> Self {
        Self {
            timebase,
            finish_hold,
            state: UiState::Idle,
            session: None,
            finished_at: None,
            generation: 0,
        }
    }

    /// Returns the current UI state.
    #[must_use]
    pub const fn state(&self) -> UiState {
        self.state
    }

    /// Returns the live session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&TimerSession> {
        self.session.as_ref()
    }

    /// Returns the live session's id, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(TimerSession::id)
    }

    /// Returns the timebase this engine converts ticks with.
    #[must_use]
    pub const fn timebase(&self) -> Timebase {
        self.timebase
    }

    /// Returns when the Finished state reverts to Idle, if finished.
    #[must_use]
    pub fn revert_at(&self) -> Option<HostTime> {
        self.finished_at.map(|at| at + self.finish_hold)
    }

    /// Starts a session of `minutes` anchored at `now`.
    ///
    /// Zero minutes is rejected with [`StartError::InvalidDuration`] and a
    /// start outside Idle with [`StartError::AlreadyActive`]; neither changes
    /// any state.
    pub fn start(&mut self, minutes: u32, now: HostTime) -> Result<SessionId, StartError> {
        if minutes == 0 {
            return Err(StartError::InvalidDuration);
        }
        if self.state != UiState::Idle {
            return Err(StartError::AlreadyActive);
        }

        self.generation += 1;
        let id = SessionId(self.generation);
        self.session = Some(TimerSession::new(id, minutes, now));
        self.finished_at = None;
        self.state = UiState::Running;
        Ok(id)
    }

    /// Re-anchors the running session at `now`.
    ///
    /// Used once the media asset is ready, so the countdown starts together
    /// with the animation rather than when the button was pressed.
    pub fn anchor(&mut self, now: HostTime) -> Result<(), EngineError> {
        match (self.state, self.session.as_mut()) {
            (UiState::Running, Some(session)) => {
                session.anchor(now);
                Ok(())
            }
            (state, _) => Err(EngineError::NotRunning(state)),
        }
    }

    /// Samples the running session at `now`.
    ///
    /// When the sample is complete the engine moves to Finished and discards
    /// the session; the returned sample is the final one. Outside Running
    /// this returns [`EngineError::NotRunning`].
    pub fn tick(&mut self, now: HostTime) -> Result<TickSample, EngineError> {
        let timebase = self.timebase;
        let sample = match (self.state, self.session.as_mut()) {
            (UiState::Running, Some(session)) => session.sample(now, timebase),
            (state, _) => return Err(EngineError::NotRunning(state)),
        };

        if sample.is_complete() {
            self.session = None;
            self.finished_at = Some(now);
            self.state = UiState::Finished;
        }
        Ok(sample)
    }

    /// Returns `true` iff `progress` has reached 1.
    #[must_use]
    pub fn is_complete(progress: f64) -> bool {
        crate::timing::is_complete(progress)
    }

    /// Stops the running session if the user confirmed.
    ///
    /// Returns `true` if a session was discarded. There is no Finished step
    /// on this path. An unconfirmed stop, or a stop outside Running, changes
    /// nothing.
    pub fn stop(&mut self, confirmed: bool) -> bool {
        if !confirmed || self.state != UiState::Running {
            return false;
        }
        self.reset();
        true
    }

    /// Discards any session and returns to Idle.
    ///
    /// Calling this repeatedly is the same as calling it once.
    pub fn reset(&mut self) {
        self.session = None;
        self.finished_at = None;
        self.state = UiState::Idle;
    }

    /// Returns to Idle if the engine is Finished and the finish hold has
    /// elapsed at `now`. Returns `true` if it reverted.
    pub fn revert_if_due(&mut self, now: HostTime) -> bool {
        match self.revert_at() {
            Some(at) if self.state == UiState::Finished && now >= at => {
                self.reset();
                true
            }
            _ => false,
        }
    }
}
