// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the timer controller.
//!
//! [`TraceSink`] has one method per controller event, each defaulting to a
//! no-op, so a sink only implements what it cares about.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and
//! [`Tracer::set_sink`] drops the sink. When **on**, each method performs a
//! single `Option` branch before dispatching.

use alloc::boxed::Box;

use crate::session::{SessionId, StartError};
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Which kind of deferred callback was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// A display-refresh callback.
    Frame,
    /// A finish-hold timeout.
    Delay,
    /// A media metadata notification.
    MediaReady,
}

/// Emitted when a session starts.
#[derive(Clone, Copy, Debug)]
pub struct SessionStartEvent {
    /// New session id.
    pub session: SessionId,
    /// Session length in seconds.
    pub total_secs: u64,
    /// Host time of the start action.
    pub at: HostTime,
    /// Whether the first frame waits for media metadata.
    pub awaiting_media: bool,
}

/// Emitted when the session is anchored and the first frame requested.
#[derive(Clone, Copy, Debug)]
pub struct SessionBeginEvent {
    /// Session id.
    pub session: SessionId,
    /// Anchor timestamp.
    pub at: HostTime,
}

/// Emitted for every processed frame.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent {
    /// Session id.
    pub session: SessionId,
    /// Backend frame counter.
    pub frame_index: u64,
    /// Frame timestamp.
    pub now: HostTime,
    /// Progress in `[0, 1]`.
    pub progress: f64,
    /// Whole seconds remaining.
    pub seconds_left: u64,
    /// Video position applied, or `None` if scrubbing was skipped.
    pub scrub: Option<f64>,
}

/// Emitted when a session completes.
#[derive(Clone, Copy, Debug)]
pub struct FinishEvent {
    /// Session id.
    pub session: SessionId,
    /// Completion timestamp.
    pub at: HostTime,
}

/// Emitted when a stop is requested while running.
#[derive(Clone, Copy, Debug)]
pub struct StopEvent {
    /// Session id.
    pub session: SessionId,
    /// Whether the user confirmed.
    pub confirmed: bool,
    /// Host time of the request.
    pub at: HostTime,
}

/// Emitted when the controller returns to Idle (after stop, finish hold, or
/// an explicit reset).
#[derive(Clone, Copy, Debug)]
pub struct ResetEvent {
    /// Host time of the reset.
    pub at: HostTime,
    /// Whether a pending frame request was cancelled.
    pub cancelled_frame: bool,
    /// Whether a pending delay was cancelled.
    pub cancelled_delay: bool,
}

/// Emitted when a deferred callback no longer matches the live session.
#[derive(Clone, Copy, Debug)]
pub struct StaleCallbackEvent {
    /// Which callback was dropped.
    pub kind: CallbackKind,
    /// Host time of the drop.
    pub at: HostTime,
}

/// Emitted when a start request is rejected.
#[derive(Clone, Copy, Debug)]
pub struct RejectedStartEvent {
    /// Why it was rejected.
    pub error: StartError,
    /// Host time of the request.
    pub at: HostTime,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the controller.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a session starts.
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        _ = e;
    }

    /// Called when the session is anchored and the frame chain begins.
    fn on_session_begin(&mut self, e: &SessionBeginEvent) {
        _ = e;
    }

    /// Called for every processed frame.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called when a session completes.
    fn on_finish(&mut self, e: &FinishEvent) {
        _ = e;
    }

    /// Called when a stop is requested.
    fn on_stop(&mut self, e: &StopEvent) {
        _ = e;
    }

    /// Called when the controller returns to Idle.
    fn on_reset(&mut self, e: &ResetEvent) {
        _ = e;
    }

    /// Called when a stale callback is dropped.
    fn on_stale_callback(&mut self, e: &StaleCallbackEvent) {
        _ = e;
    }

    /// Called when a start request is rejected.
    fn on_rejected_start(&mut self, e: &RejectedStartEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer
// ---------------------------------------------------------------------------

/// Owns an optional [`TraceSink`] and forwards events to it.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

macro_rules! forward {
    ($(#[$doc:meta])* $name:ident, $method:ident, $event:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl Tracer {
    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Installs `sink`, replacing any previous one.
    pub fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        #[cfg(feature = "trace")]
        {
            self.sink = Some(sink);
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
        }
    }

    /// Removes and returns the installed sink.
    pub fn take_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        #[cfg(feature = "trace")]
        {
            self.sink.take()
        }
        #[cfg(not(feature = "trace"))]
        {
            None
        }
    }

    /// Returns `true` if events reach a sink.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    forward!(
        /// Emits a [`SessionStartEvent`].
        session_start, on_session_start, SessionStartEvent
    );
    forward!(
        /// Emits a [`SessionBeginEvent`].
        session_begin, on_session_begin, SessionBeginEvent
    );
    forward!(
        /// Emits a [`TickEvent`].
        tick, on_tick, TickEvent
    );
    forward!(
        /// Emits a [`FinishEvent`].
        finish, on_finish, FinishEvent
    );
    forward!(
        /// Emits a [`StopEvent`].
        stop, on_stop, StopEvent
    );
    forward!(
        /// Emits a [`ResetEvent`].
        reset, on_reset, ResetEvent
    );
    forward!(
        /// Emits a [`StaleCallbackEvent`].
        stale_callback, on_stale_callback, StaleCallbackEvent
    );
    forward!(
        /// Emits a [`RejectedStartEvent`].
        rejected_start, on_rejected_start, RejectedStartEvent
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_event() -> TickEvent {
        TickEvent {
            session: SessionId(1),
            frame_index: 3,
            now: HostTime(50),
            progress: 0.5,
            seconds_left: 30,
            scrub: Some(6.0),
        }
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_tick(&tick_event());
        sink.on_finish(&FinishEvent {
            session: SessionId(1),
            at: HostTime(0),
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_enabled());
        tracer.tick(&tick_event());
        assert!(tracer.take_sink().is_none());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use core::cell::RefCell;

        struct Counting(Rc<RefCell<u32>>);
        impl TraceSink for Counting {
            fn on_tick(&mut self, _e: &TickEvent) {
                *self.0.borrow_mut() += 1;
            }
        }

        let count = Rc::new(RefCell::new(0));
        let mut tracer = Tracer::none();
        tracer.set_sink(Box::new(Counting(Rc::clone(&count))));
        assert!(tracer.is_enabled());
        tracer.tick(&tick_event());
        tracer.tick(&tick_event());
        assert_eq!(*count.borrow(), 2);
    }
}
