// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic in-memory host.
//!
//! [`SimHost`] implements [`Host`] with a manual clock, recorded surface and
//! media state, and queues of frame and delay requests. Time only moves when
//! [`SproutTimer::advance`] is called, which fires due delays and the pending
//! frame at a fixed refresh interval. This is what the controller tests and
//! the simulation demo run against.

use alloc::string::{String, ToString as _};
use alloc::vec::Vec;

use crate::backend::{
    Clock, DelayHandle, DelayScheduler, Dialogs, FrameHandle, FrameScheduler, Host, MediaAsset,
    Surface,
};
use crate::controller::SproutTimer;
use crate::session::SessionId;
use crate::time::{Duration, HostTime};
use crate::timing::FrameTick;

/// Recorded state of the simulated surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimSurface {
    /// Whether the running layout is shown.
    pub running: bool,
    /// Last countdown text.
    pub countdown: String,
    /// Last progress bar fill in percent.
    pub progress_percent: f64,
    /// Last stage label.
    pub stage: String,
    /// Last status text.
    pub status: String,
    /// How many times the input field was cleared.
    pub input_clears: u32,
}

impl Surface for SimSurface {
    fn show_running(&mut self, running: bool) {
        self.running = running;
    }

    fn set_countdown(&mut self, text: &str) {
        self.countdown = text.to_string();
    }

    fn set_progress_percent(&mut self, percent: f64) {
        self.progress_percent = percent;
    }

    fn set_stage(&mut self, label: &str) {
        self.stage = label.to_string();
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn clear_input(&mut self) {
        self.input_clears += 1;
    }
}

/// Recorded state of the simulated video.
#[derive(Clone, Debug, PartialEq)]
pub struct SimMedia {
    /// Whether metadata has loaded.
    pub ready: bool,
    /// Clip length in seconds once ready.
    pub duration: Option<f64>,
    /// Current playback position.
    pub current_time: f64,
    /// Whether the clip is playing.
    pub playing: bool,
    /// Current playback rate.
    pub playback_rate: f64,
    /// Number of seeks applied.
    pub seeks: u32,
    /// Session waiting for metadata, if any.
    pub awaiting: Option<SessionId>,
}

impl SimMedia {
    /// A clip whose metadata is already loaded.
    #[must_use]
    pub const fn ready(duration: f64) -> Self {
        Self {
            ready: true,
            duration: Some(duration),
            current_time: 0.0,
            playing: false,
            playback_rate: 1.0,
            seeks: 0,
            awaiting: None,
        }
    }

    /// A clip whose metadata has not loaded yet.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            ready: false,
            duration: None,
            current_time: 0.0,
            playing: false,
            playback_rate: 1.0,
            seeks: 0,
            awaiting: None,
        }
    }
}

impl MediaAsset for SimMedia {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn duration(&self) -> Option<f64> {
        if self.ready { self.duration } else { None }
    }

    fn seek(&mut self, seconds: f64) {
        self.current_time = seconds;
        self.seeks += 1;
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
    }

    fn await_metadata(&mut self, session: SessionId) {
        self.awaiting = Some(session);
    }
}

/// A deterministic [`Host`].
#[derive(Clone, Debug)]
pub struct SimHost {
    now: HostTime,
    next_handle: u64,
    frame_index: u64,
    frames: Vec<FrameHandle>,
    delays: Vec<(DelayHandle, HostTime)>,
    /// Answer returned by every confirmation dialog.
    pub confirm_answer: bool,
    /// Messages of every confirmation dialog shown.
    pub confirms: Vec<String>,
    /// Messages of every alert shown.
    pub alerts: Vec<String>,
    /// Frame requests cancelled so far.
    pub cancelled_frames: u32,
    /// Delays cancelled so far.
    pub cancelled_delays: u32,
    /// The simulated surface.
    pub surface: SimSurface,
    /// The simulated video.
    pub media: SimMedia,
}

impl SimHost {
    /// Creates a host at time zero with the given media.
    #[must_use]
    pub fn new(media: SimMedia) -> Self {
        Self {
            now: HostTime(0),
            next_handle: 0,
            frame_index: 0,
            frames: Vec::new(),
            delays: Vec::new(),
            confirm_answer: true,
            confirms: Vec::new(),
            alerts: Vec::new(),
            cancelled_frames: 0,
            cancelled_delays: 0,
            surface: SimSurface::default(),
            media,
        }
    }

    /// Moves the clock to `now` without firing anything.
    pub fn set_now(&mut self, now: HostTime) {
        self.now = now;
    }

    /// Returns the outstanding frame requests.
    #[must_use]
    pub fn outstanding_frames(&self) -> &[FrameHandle] {
        &self.frames
    }

    /// Returns the outstanding delays and their due times.
    #[must_use]
    pub fn outstanding_delays(&self) -> &[(DelayHandle, HostTime)] {
        &self.delays
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn take_due_delay(&mut self) -> Option<DelayHandle> {
        let idx = self.delays.iter().position(|&(_, due)| due <= self.now)?;
        Some(self.delays.remove(idx).0)
    }
}

impl Clock for SimHost {
    fn now(&self) -> HostTime {
        self.now
    }
}

impl FrameScheduler for SimHost {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_handle());
        self.frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.frames.len();
        self.frames.retain(|&h| h != handle);
        if self.frames.len() != before {
            self.cancelled_frames += 1;
        }
    }
}

impl DelayScheduler for SimHost {
    fn schedule_delay(&mut self, delay: Duration) -> DelayHandle {
        let handle = DelayHandle(self.next_handle());
        self.delays.push((handle, self.now + delay));
        handle
    }

    fn cancel_delay(&mut self, handle: DelayHandle) {
        let before = self.delays.len();
        self.delays.retain(|&(h, _)| h != handle);
        if self.delays.len() != before {
            self.cancelled_delays += 1;
        }
    }
}

impl Dialogs for SimHost {
    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.confirm_answer
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

impl Host for SimHost {
    type Surface = SimSurface;
    type Media = SimMedia;

    fn outputs(&mut self) -> (&mut SimSurface, &mut SimMedia) {
        (&mut self.surface, &mut self.media)
    }
}

impl SproutTimer<SimHost> {
    /// Runs the simulation forward by `span`, one display refresh of
    /// `refresh` at a time.
    ///
    /// At each refresh, due delays fire first, then every outstanding frame
    /// request fires with the refresh timestamp.
    pub fn advance(&mut self, span: Duration, refresh: Duration) {
        let end = self.host().now() + span;
        let step = if refresh == Duration::ZERO { span } else { refresh };
        while self.host().now() < end {
            let next = (self.host().now() + step).min(end);
            self.host_mut().set_now(next);
            self.fire_due();
        }
    }

    /// Jumps the clock by `gap` with no refreshes in between (a suspended
    /// tab), then delivers whatever is due at the new time.
    pub fn suspend_for(&mut self, gap: Duration) {
        let next = self.host().now() + gap;
        self.host_mut().set_now(next);
        self.fire_due();
    }

    /// Marks the media ready with `duration` and delivers the metadata
    /// notification if a session is waiting for it.
    pub fn load_media(&mut self, duration: f64) {
        let media = &mut self.host_mut().media;
        media.ready = true;
        media.duration = Some(duration);
        if let Some(session) = media.awaiting.take() {
            self.on_media_ready(session);
        }
    }

    fn fire_due(&mut self) {
        while let Some(handle) = self.host_mut().take_due_delay() {
            let now = self.host().now();
            self.on_delay(handle, now);
        }
        let frames = core::mem::take(&mut self.host_mut().frames);
        for handle in frames {
            let host = self.host_mut();
            let tick = FrameTick {
                now: host.now,
                frame_index: host.frame_index,
            };
            host.frame_index += 1;
            self.on_frame(handle, tick);
        }
    }
}
