// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame scheduler.
//!
//! [`RafScheduler`] hands out one-shot frame requests. Each callback receives
//! a [`DOMHighResTimeStamp`][mdn] (milliseconds on the `performance.now()`
//! timeline), which is converted to microsecond [`HostTime`] ticks and
//! delivered together with the [`FrameHandle`] of the request that fired.
//!
//! Unlike a free-running loop, the scheduler never re-registers itself: the
//! controller decides whether another frame is needed.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use sprout_core::backend::FrameHandle;
use sprout_core::time::HostTime;
use sprout_core::timing::FrameTick;

// Direct global bindings instead of `web_sys::Window` methods; avoids
// fetching (and unwrapping) the Window/Performance objects on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// Converts a `DOMHighResTimeStamp` in milliseconds to microsecond ticks.
pub(crate) fn host_time_from_millis(ms: f64) -> HostTime {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "DOMHighResTimeStamp is a small positive f64; µs fits in u64"
    )]
    let us = (ms.max(0.0) * 1000.0) as u64;
    HostTime(us)
}

type RafClosure = Closure<dyn FnMut(f64)>;
type FrameCallback = Box<dyn FnMut(FrameHandle, FrameTick)>;

/// One-shot `requestAnimationFrame` requests that report back with a
/// [`FrameHandle`] and a [`FrameTick`].
///
/// Cloning is cheap; clones share the same registration.
#[derive(Clone)]
pub struct RafScheduler {
    inner: Rc<RafInner>,
}

struct RafInner {
    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Created once in [`connect`](RafScheduler::connect) and reused for
    /// every request.
    closure: RefCell<Option<RafClosure>>,

    /// Receives fired frames. Held in its own `RefCell` so that a request
    /// made from inside the callback does not conflict with it.
    callback: RefCell<Option<FrameCallback>>,

    /// Monotonically increasing frame counter (becomes `FrameTick::frame_index`).
    frame_counter: Cell<u64>,

    /// Last handle handed out.
    next_handle: Cell<u64>,

    /// The outstanding request and the browser id it was registered under.
    pending: Cell<Option<(FrameHandle, i32)>>,
}

impl RafScheduler {
    /// Creates a scheduler with no callback connected.
    ///
    /// Requests made before [`connect`](Self::connect) are still counted but
    /// never fire.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RafInner {
                closure: RefCell::new(None),
                callback: RefCell::new(None),
                frame_counter: Cell::new(0),
                next_handle: Cell::new(0),
                pending: Cell::new(None),
            }),
        }
    }

    /// Connects the receiver of fired frames, replacing any previous one.
    pub fn connect(&self, callback: impl FnMut(FrameHandle, FrameTick) + 'static) {
        *self.inner.callback.borrow_mut() = Some(Box::new(callback));
        if self.inner.closure.borrow().is_some() {
            return;
        }

        let inner = Rc::downgrade(&self.inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let Some((handle, _)) = inner.pending.take() else {
                return;
            };

            let frame_index = inner.frame_counter.get();
            inner.frame_counter.set(frame_index + 1);
            let tick = FrameTick {
                now: host_time_from_millis(timestamp_ms),
                frame_index,
            };

            // Taken out for the call so a nested `connect` cannot alias it.
            let callback = inner.callback.borrow_mut().take();
            if let Some(mut callback) = callback {
                callback(handle, tick);
                let mut slot = inner.callback.borrow_mut();
                if slot.is_none() {
                    *slot = Some(callback);
                }
            }
        }) as Box<dyn FnMut(f64)>);
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Requests a callback on the next animation frame.
    ///
    /// Only one request is outstanding at a time; a new request replaces
    /// (and cancels) the previous one.
    pub fn request(&self) -> FrameHandle {
        let handle = FrameHandle(self.inner.next_handle.get() + 1);
        self.inner.next_handle.set(handle.0);

        if let Some((_, id)) = self.inner.pending.take() {
            cancel_animation_frame(id);
        }
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.inner.pending.set(Some((handle, id)));
        }
        handle
    }

    /// Cancels `handle` if it is still outstanding.
    pub fn cancel(&self, handle: FrameHandle) {
        match self.inner.pending.get() {
            Some((pending, id)) if pending == handle => {
                self.inner.pending.set(None);
                cancel_animation_frame(id);
            }
            _ => {}
        }
    }

    /// Returns `true` if a request is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    /// Returns how many frames have been delivered.
    #[must_use]
    pub fn frames_delivered(&self) -> u64 {
        self.inner.frame_counter.get()
    }
}

impl Default for RafScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RafInner {
    fn drop(&mut self) {
        if let Some((_, id)) = self.pending.take() {
            cancel_animation_frame(id);
        }
    }
}

impl core::fmt::Debug for RafScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafScheduler")
            .field("pending", &self.inner.pending.get().map(|(h, _)| h))
            .field("frame_counter", &self.inner.frame_counter.get())
            .finish_non_exhaustive()
    }
}
