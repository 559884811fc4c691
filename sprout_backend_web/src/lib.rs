// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for sprout.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafScheduler`]: one-shot `requestAnimationFrame` requests
//! - [`TimeoutScheduler`]: one-shot `setTimeout` requests
//! - [`DomSurface`]: the timer widgets, resolved by element id
//! - [`VideoAsset`]: the scrubbed `<video>`
//! - [`ConsoleSink`]: controller trace events on the browser console
//! - [`WebHost`]: all of the above behind the [`Host`] contract
//! - [`mount`]: builds a [`SproutTimer`] on a page and wires its buttons

#![no_std]

extern crate alloc;

mod console;
mod dom;
mod raf;
mod timeout;
mod video;

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use sprout_core::backend::{
    Clock, DelayHandle, DelayScheduler, Dialogs, FrameHandle, FrameScheduler, Host,
};
use sprout_core::config::TimerConfig;
use sprout_core::controller::SproutTimer;
use sprout_core::time::{Duration, HostTime, Timebase};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Event, HtmlVideoElement, Window};

pub use console::ConsoleSink;
pub use dom::{DomSurface, ids, lookup};
pub use raf::RafScheduler;
pub use sprout_core::backend::{MediaAsset, Surface};
pub use timeout::TimeoutScheduler;
pub use video::VideoAsset;

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    raf::host_time_from_millis(raf::performance_now())
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}

/// A [`Host`] backed by the browser.
#[derive(Debug)]
pub struct WebHost {
    window: Window,
    frames: RafScheduler,
    delays: TimeoutScheduler,
    surface: DomSurface,
    media: VideoAsset,
}

impl WebHost {
    /// Creates a host from resolved outputs.
    #[must_use]
    pub fn new(window: Window, surface: DomSurface, media: VideoAsset) -> Self {
        Self {
            window,
            frames: RafScheduler::new(),
            delays: TimeoutScheduler::new(timebase()),
            surface,
            media,
        }
    }

    /// Resolves every output from `document`.
    pub fn from_document(window: Window, document: &Document) -> Result<Self, JsValue> {
        let surface = DomSurface::from_document(document)?;
        let video: HtmlVideoElement = lookup(document, ids::PLANT_VIDEO)?;
        Ok(Self::new(window, surface, VideoAsset::new(video)))
    }

    /// Returns the frame scheduler.
    #[must_use]
    pub fn frames(&self) -> &RafScheduler {
        &self.frames
    }

    /// Returns the delay scheduler.
    #[must_use]
    pub fn delays(&self) -> &TimeoutScheduler {
        &self.delays
    }

    /// Returns the surface.
    #[must_use]
    pub fn surface(&self) -> &DomSurface {
        &self.surface
    }

    /// Returns the media asset.
    #[must_use]
    pub fn media(&self) -> &VideoAsset {
        &self.media
    }
}

impl Clock for WebHost {
    fn now(&self) -> HostTime {
        now()
    }
}

impl FrameScheduler for WebHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.frames.request()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.cancel(handle);
    }
}

impl DelayScheduler for WebHost {
    fn schedule_delay(&mut self, delay: Duration) -> DelayHandle {
        self.delays.schedule(delay)
    }

    fn cancel_delay(&mut self, handle: DelayHandle) {
        self.delays.cancel(handle);
    }
}

impl Dialogs for WebHost {
    fn confirm(&mut self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }
}

impl Host for WebHost {
    type Surface = DomSurface;
    type Media = VideoAsset;

    fn outputs(&mut self) -> (&mut DomSurface, &mut VideoAsset) {
        (&mut self.surface, &mut self.media)
    }
}

/// A mounted timer, shared between the page's event callbacks.
pub type SharedTimer = Rc<RefCell<SproutTimer<WebHost>>>;

/// Builds a timer on the current page and wires the start and stop buttons.
///
/// Every callback holds only a weak reference to the timer, and each borrows
/// it for the duration of one event. The returned handle keeps the timer
/// alive; drop it and the page goes inert.
pub fn mount(config: TimerConfig) -> Result<SharedTimer, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    mount_in(window, &document, config)
}

/// Like [`mount`], for an explicit window and document.
pub fn mount_in(
    window: Window,
    document: &Document,
    config: TimerConfig,
) -> Result<SharedTimer, JsValue> {
    let host = WebHost::from_document(window, document)?;
    let timer = Rc::new(RefCell::new(SproutTimer::new(config, host)));
    connect_host(&timer)?;
    timer.borrow_mut().initialize();
    bind_controls(document, &timer)?;
    Ok(timer)
}

fn connect_host(timer: &SharedTimer) -> Result<(), JsValue> {
    let t = timer.borrow();
    let host = t.host();

    let weak = Rc::downgrade(timer);
    host.frames().connect(move |handle, tick| {
        if let Some(timer) = weak.upgrade() {
            timer.borrow_mut().on_frame(handle, tick);
        }
    });

    let weak = Rc::downgrade(timer);
    host.delays().connect(move |handle, now| {
        if let Some(timer) = weak.upgrade() {
            timer.borrow_mut().on_delay(handle, now);
        }
    });

    let weak = Rc::downgrade(timer);
    host.media().connect(move |session| {
        if let Some(timer) = weak.upgrade() {
            timer.borrow_mut().on_media_ready(session);
        }
    })
}

fn bind_controls(document: &Document, timer: &SharedTimer) -> Result<(), JsValue> {
    let start_button: web_sys::HtmlElement = lookup(document, ids::START_BUTTON)?;
    let weak = Rc::downgrade(timer);
    let start_cb = Closure::wrap(Box::new(move |_event: Event| {
        let Some(timer) = weak.upgrade() else {
            return;
        };
        let mut t = timer.borrow_mut();
        let text = t.host().surface().input_value();
        // Rejections are already reported through `Dialogs::alert`.
        let _ = t.start_from_input(&text);
    }) as Box<dyn FnMut(_)>);
    start_button.add_event_listener_with_callback("click", start_cb.as_ref().unchecked_ref())?;
    start_cb.forget();

    let stop_button: web_sys::HtmlElement = lookup(document, ids::STOP_BUTTON)?;
    let weak = Rc::downgrade(timer);
    let stop_cb = Closure::wrap(Box::new(move |_event: Event| {
        if let Some(timer) = weak.upgrade() {
            timer.borrow_mut().request_stop();
        }
    }) as Box<dyn FnMut(_)>);
    stop_button.add_event_listener_with_callback("click", stop_cb.as_ref().unchecked_ref())?;
    stop_cb.forget();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timebase_is_microsecond() {
        let tb = timebase();
        // 1 tick = 1 µs = 1000 ns
        assert_eq!(tb.ticks_to_nanos(1), 1000);
        assert_eq!(tb.ticks_to_nanos(1_000_000), 1_000_000_000);
    }

    #[test]
    fn web_config_matches_backend_timebase() {
        assert_eq!(TimerConfig::web().timebase, timebase());
    }

    #[test]
    fn frame_timestamps_become_microseconds() {
        assert_eq!(raf::host_time_from_millis(16.5), HostTime(16_500));
        assert_eq!(raf::host_time_from_millis(-3.0), HostTime(0));
    }
}
