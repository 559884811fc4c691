// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<video>` media asset.
//!
//! [`VideoAsset`] scrubs an `HtmlVideoElement`. The `loadedmetadata` listener
//! is registered once; [`await_metadata`](MediaAsset::await_metadata) only
//! records which session is waiting, and the listener delivers that session
//! (at most once) to the callback given to [`VideoAsset::connect`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use sprout_core::backend::MediaAsset;
use sprout_core::session::SessionId;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, HtmlVideoElement};

/// `HTMLMediaElement.HAVE_METADATA`.
const HAVE_METADATA: u16 = 1;

/// Returns `Some(duration)` if it is usable for scrubbing.
pub(crate) fn usable_duration(duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

/// The growing-plant video.
pub struct VideoAsset {
    video: HtmlVideoElement,
    waiting: Rc<Cell<Option<SessionId>>>,
    listener: RefCell<Option<Closure<dyn FnMut(Event)>>>,
}

impl core::fmt::Debug for VideoAsset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoAsset")
            .field("ready_state", &self.video.ready_state())
            .field("current_time", &self.video.current_time())
            .field("waiting", &self.waiting.get())
            .finish_non_exhaustive()
    }
}

impl VideoAsset {
    /// Wraps `video`. Native controls are left as the page declares them.
    #[must_use]
    pub fn new(video: HtmlVideoElement) -> Self {
        Self {
            video,
            waiting: Rc::new(Cell::new(None)),
            listener: RefCell::new(None),
        }
    }

    /// Returns the underlying element.
    #[must_use]
    pub fn element(&self) -> &HtmlVideoElement {
        &self.video
    }

    /// Registers the `loadedmetadata` listener that reports the waiting
    /// session to `on_ready`.
    pub fn connect(&self, on_ready: impl FnMut(SessionId) + 'static) -> Result<(), JsValue> {
        let waiting = Rc::clone(&self.waiting);
        let mut on_ready = on_ready;
        let closure = Closure::wrap(Box::new(move |_event: Event| {
            if let Some(session) = waiting.take() {
                on_ready(session);
            }
        }) as Box<dyn FnMut(_)>);
        self.video
            .add_event_listener_with_callback("loadedmetadata", closure.as_ref().unchecked_ref())?;
        if let Some(previous) = self.listener.borrow_mut().replace(closure) {
            let _ = self.video.remove_event_listener_with_callback(
                "loadedmetadata",
                previous.as_ref().unchecked_ref(),
            );
        }
        Ok(())
    }
}

impl MediaAsset for VideoAsset {
    fn is_ready(&self) -> bool {
        self.video.ready_state() >= HAVE_METADATA
    }

    fn duration(&self) -> Option<f64> {
        usable_duration(self.video.duration())
    }

    fn seek(&mut self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn play(&mut self) {
        // Autoplay policies may reject the promise; the scrub still applies.
        let _ = self.video.play();
    }

    fn pause(&mut self) {
        let _ = self.video.pause();
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.video.set_playback_rate(rate);
    }

    fn await_metadata(&mut self, session: SessionId) {
        self.waiting.set(Some(session));
        self.video.load();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_finite_positive_durations_are_usable() {
        assert_eq!(usable_duration(12.5), Some(12.5));
        assert_eq!(usable_duration(0.0), None);
        assert_eq!(usable_duration(f64::NAN), None);
        assert_eq!(usable_duration(f64::INFINITY), None);
        assert_eq!(usable_duration(-1.0), None);
    }
}
