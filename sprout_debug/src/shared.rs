// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared access to an installed sink.
//!
//! A timer owns its sink as a `Box<dyn TraceSink>`. [`SharedSink`] wraps a
//! sink in `Rc<RefCell<_>>` so the caller can keep a handle and read the
//! sink (for example a [`RecorderSink`](crate::recorder::RecorderSink))
//! while the timer is still running.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use sprout_core::trace::{
    FinishEvent, RejectedStartEvent, ResetEvent, SessionBeginEvent, SessionStartEvent,
    StaleCallbackEvent, StopEvent, TickEvent, TraceSink,
};

/// A cloneable handle that forwards every event to the shared sink.
#[derive(Debug, Default)]
pub struct SharedSink<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: TraceSink> SharedSink<S> {
    /// Wraps `sink`.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(sink)),
        }
    }

    /// Borrows the sink.
    ///
    /// # Panics
    ///
    /// Panics if called from inside one of the sink's own event methods.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, S> {
        self.inner.borrow()
    }
}

impl<S: TraceSink> TraceSink for SharedSink<S> {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        self.inner.borrow_mut().on_session_start(e);
    }

    fn on_session_begin(&mut self, e: &SessionBeginEvent) {
        self.inner.borrow_mut().on_session_begin(e);
    }

    fn on_tick(&mut self, e: &TickEvent) {
        self.inner.borrow_mut().on_tick(e);
    }

    fn on_finish(&mut self, e: &FinishEvent) {
        self.inner.borrow_mut().on_finish(e);
    }

    fn on_stop(&mut self, e: &StopEvent) {
        self.inner.borrow_mut().on_stop(e);
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        self.inner.borrow_mut().on_reset(e);
    }

    fn on_stale_callback(&mut self, e: &StaleCallbackEvent) {
        self.inner.borrow_mut().on_stale_callback(e);
    }

    fn on_rejected_start(&mut self, e: &RejectedStartEvent) {
        self.inner.borrow_mut().on_rejected_start(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{RecorderSink, decode};
    use sprout_core::session::SessionId;
    use sprout_core::time::HostTime;

    #[test]
    fn clones_see_the_same_recording() {
        let shared = SharedSink::new(RecorderSink::new());
        let mut installed: Box<dyn TraceSink> = Box::new(shared.clone());
        installed.on_finish(&FinishEvent {
            session: SessionId(1),
            at: HostTime(7),
        });
        assert_eq!(decode(shared.borrow().as_bytes()).count(), 1);
    }
}
