// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The timer logic never touches a platform API directly. A backend crate
//! implements the traits below and hands the result to
//! [`SproutTimer`](crate::controller::SproutTimer):
//!
//! - **Clock**: a monotonic `now()` in the same tick units the frame
//!   scheduler stamps its callbacks with.
//!
//! - **Frame scheduler**: one-shot "call me on the next display refresh"
//!   requests (`requestAnimationFrame` on the web). Each request returns a
//!   [`FrameHandle`]; the backend later calls
//!   [`SproutTimer::on_frame`](crate::controller::SproutTimer::on_frame)
//!   with that handle. Chaining is the controller's job, not the backend's.
//!
//! - **Delay scheduler**: one-shot timeouts (`setTimeout`), used for the
//!   finish hold. Fired via
//!   [`SproutTimer::on_delay`](crate::controller::SproutTimer::on_delay).
//!
//! - **Dialogs**: a blocking yes/no confirmation and an alert.
//!
//! - **Surface** and **media asset**: the display outputs written by the
//!   [`PresentationAdapter`](crate::present::PresentationAdapter).
//!
//! # Crate boundaries
//!
//! `sprout_core` owns the engine, the adapter, the controller, and this
//! contract module. Backend crates depend on `sprout_core` and provide
//! platform glue; application code wires the two together.

use core::fmt;

use crate::session::SessionId;
use crate::time::{Duration, HostTime};

/// Identifies one outstanding frame request.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

impl fmt::Debug for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameHandle({})", self.0)
    }
}

/// Identifies one outstanding delay.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelayHandle(pub u64);

impl fmt::Debug for DelayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DelayHandle({})", self.0)
    }
}

/// A monotonic clock.
pub trait Clock {
    /// Returns the current host time.
    fn now(&self) -> HostTime;
}

/// Requests callbacks paced by the display refresh.
pub trait FrameScheduler {
    /// Requests a single callback on the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancels a pending request. Cancelling a handle that already fired or
    /// was already cancelled must be harmless.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Schedules one-shot delayed callbacks.
pub trait DelayScheduler {
    /// Requests a single callback once `delay` has elapsed.
    fn schedule_delay(&mut self, delay: Duration) -> DelayHandle;

    /// Cancels a pending delay. Must be harmless for stale handles.
    fn cancel_delay(&mut self, handle: DelayHandle);
}

/// Modal user dialogs.
pub trait Dialogs {
    /// Asks the user a yes/no question and returns their answer.
    fn confirm(&mut self, message: &str) -> bool;

    /// Shows a message the user has to acknowledge.
    fn alert(&mut self, message: &str);
}

/// The visible timer widgets.
pub trait Surface {
    /// Switches between the idle layout (duration picker, idle visual) and
    /// the running layout (countdown panel, plant visual).
    fn show_running(&mut self, running: bool);

    /// Sets the countdown text.
    fn set_countdown(&mut self, text: &str);

    /// Sets the progress bar fill, in percent.
    fn set_progress_percent(&mut self, percent: f64);

    /// Sets the growth-stage label.
    fn set_stage(&mut self, label: &str);

    /// Sets the status line.
    fn set_status(&mut self, text: &str);

    /// Clears the minutes input field.
    fn clear_input(&mut self);
}

/// A seekable animation asset (the growing-plant video).
pub trait MediaAsset {
    /// Returns `true` once metadata (including the duration) is available.
    fn is_ready(&self) -> bool;

    /// Returns the asset's duration in seconds, if known.
    fn duration(&self) -> Option<f64>;

    /// Moves the playback position to `seconds`.
    fn seek(&mut self, seconds: f64);

    /// Starts playback.
    fn play(&mut self);

    /// Pauses playback.
    fn pause(&mut self);

    /// Sets the playback rate.
    fn set_playback_rate(&mut self, rate: f64);

    /// Arranges for
    /// [`SproutTimer::on_media_ready`](crate::controller::SproutTimer::on_media_ready)
    /// to be called with `session` once metadata has loaded.
    fn await_metadata(&mut self, session: SessionId);
}

/// Everything a [`SproutTimer`](crate::controller::SproutTimer) needs from
/// its platform.
pub trait Host: Clock + FrameScheduler + DelayScheduler + Dialogs {
    /// The surface type.
    type Surface: Surface;
    /// The media asset type.
    type Media: MediaAsset;

    /// Borrows the surface and the media asset together.
    fn outputs(&mut self) -> (&mut Self::Surface, &mut Self::Media);
}
