// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` delay scheduler.
//!
//! [`TimeoutScheduler`] follows the same one-shot shape as
//! [`RafScheduler`](crate::RafScheduler): a single registered closure, one
//! outstanding request, and the [`DelayHandle`] of the request that fired
//! delivered with a fresh [`now`](crate::now) reading.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use sprout_core::backend::DelayHandle;
use sprout_core::time::{Duration, HostTime, Timebase};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, millis: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

/// Converts a delay to whole milliseconds for `setTimeout`, rounding up so a
/// timeout never fires before the delay has elapsed.
pub(crate) fn timeout_millis(delay: Duration, timebase: Timebase) -> i32 {
    let nanos = timebase.ticks_to_nanos(delay.ticks());
    let millis = nanos.div_ceil(1_000_000);
    i32::try_from(millis).unwrap_or(i32::MAX)
}

type TimeoutClosure = Closure<dyn FnMut()>;
type DelayCallback = Box<dyn FnMut(DelayHandle, HostTime)>;

/// One-shot `setTimeout` requests that report back with a [`DelayHandle`].
///
/// Cloning is cheap; clones share the same registration.
#[derive(Clone)]
pub struct TimeoutScheduler {
    inner: Rc<TimeoutInner>,
}

struct TimeoutInner {
    timebase: Timebase,
    closure: RefCell<Option<TimeoutClosure>>,
    callback: RefCell<Option<DelayCallback>>,
    next_handle: Cell<u64>,
    pending: Cell<Option<(DelayHandle, i32)>>,
}

impl TimeoutScheduler {
    /// Creates a scheduler that converts delays using `timebase`.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self {
            inner: Rc::new(TimeoutInner {
                timebase,
                closure: RefCell::new(None),
                callback: RefCell::new(None),
                next_handle: Cell::new(0),
                pending: Cell::new(None),
            }),
        }
    }

    /// Connects the receiver of fired delays, replacing any previous one.
    pub fn connect(&self, callback: impl FnMut(DelayHandle, HostTime) + 'static) {
        *self.inner.callback.borrow_mut() = Some(Box::new(callback));
        if self.inner.closure.borrow().is_some() {
            return;
        }

        let inner = Rc::downgrade(&self.inner);
        let closure = Closure::wrap(Box::new(move || {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let Some((handle, _)) = inner.pending.take() else {
                return;
            };
            let now = crate::now();

            let callback = inner.callback.borrow_mut().take();
            if let Some(mut callback) = callback {
                callback(handle, now);
                let mut slot = inner.callback.borrow_mut();
                if slot.is_none() {
                    *slot = Some(callback);
                }
            }
        }) as Box<dyn FnMut()>);
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Requests a callback once `delay` has elapsed, replacing any
    /// outstanding request.
    pub fn schedule(&self, delay: Duration) -> DelayHandle {
        let handle = DelayHandle(self.inner.next_handle.get() + 1);
        self.inner.next_handle.set(handle.0);

        if let Some((_, id)) = self.inner.pending.take() {
            clear_timeout(id);
        }
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let millis = timeout_millis(delay, self.inner.timebase);
            let id = set_timeout(closure.as_ref().unchecked_ref(), millis);
            self.inner.pending.set(Some((handle, id)));
        }
        handle
    }

    /// Cancels `handle` if it is still outstanding.
    pub fn cancel(&self, handle: DelayHandle) {
        match self.inner.pending.get() {
            Some((pending, id)) if pending == handle => {
                self.inner.pending.set(None);
                clear_timeout(id);
            }
            _ => {}
        }
    }

    /// Returns `true` if a delay is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

impl Drop for TimeoutInner {
    fn drop(&mut self) {
        if let Some((_, id)) = self.pending.take() {
            clear_timeout(id);
        }
    }
}

impl core::fmt::Debug for TimeoutScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimeoutScheduler")
            .field("timebase", &self.inner.timebase)
            .field("pending", &self.inner.pending.get().map(|(h, _)| h))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_rounds_up_to_whole_millis() {
        let tb = Timebase::MICROS;
        assert_eq!(timeout_millis(Duration::from_secs(5, tb), tb), 5_000);
        assert_eq!(timeout_millis(Duration(1), tb), 1);
        assert_eq!(timeout_millis(Duration(2_500), tb), 3);
        assert_eq!(timeout_millis(Duration::ZERO, tb), 0);
    }

    #[test]
    fn huge_timeout_saturates() {
        let tb = Timebase::NANOS;
        assert_eq!(timeout_millis(Duration(u64::MAX), tb), i32::MAX);
    }
}
