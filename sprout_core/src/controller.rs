// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The controller that wires the engine, the adapter, and a host together.
//!
//! [`SproutTimer`] is the only owner of scheduled-task handles. Each deferred
//! callback is accepted only if it matches what the controller is waiting
//! for (the pending [`FrameHandle`], the pending [`DelayHandle`], or the
//! [`SessionId`] awaiting media), and every exit from Running or Finished
//! cancels whatever is still pending. A callback left over from a stopped
//! session therefore cannot reanimate it.
//!
//! # Frame loop
//!
//! ```text
//!   start ──► show_started ──► (media ready?) ──► begin: anchor + request_frame
//!                                                   │
//!   on_frame(handle, tick) ◄────────────────────────┘◄──────────┐
//!       │ engine.tick(now) ──► adapter.present                  │
//!       ├── progress < 1 ──► request_frame ─────────────────────┘
//!       └── progress = 1 ──► show_finished ──► schedule_delay(hold)
//!                                                   │
//!   on_delay(handle) ──► revert to Idle ◄───────────┘
//! ```

use alloc::boxed::Box;

use crate::backend::{DelayHandle, FrameHandle, Host, MediaAsset as _, Surface as _};
use crate::config::TimerConfig;
use crate::engine::{TimerEngine, UiState};
use crate::present::PresentationAdapter;
use crate::session::{SessionId, StartError, parse_minutes};
use crate::time::HostTime;
use crate::timing::FrameTick;
use crate::trace::{
    CallbackKind, FinishEvent, RejectedStartEvent, ResetEvent, SessionBeginEvent,
    SessionStartEvent, StaleCallbackEvent, StopEvent, TickEvent, TraceSink, Tracer,
};

/// A single growth timer bound to a host.
#[derive(Debug)]
pub struct SproutTimer<H: Host> {
    config: TimerConfig,
    engine: TimerEngine,
    adapter: PresentationAdapter,
    host: H,
    tracer: Tracer,
    pending_frame: Option<FrameHandle>,
    pending_revert: Option<DelayHandle>,
    awaiting_media: Option<SessionId>,
}

impl<H: Host> SproutTimer<H> {
    /// Creates an idle timer. Call [`initialize`](Self::initialize) once the
    /// host's outputs exist.
    #[must_use]
    pub fn new(config: TimerConfig, host: H) -> Self {
        Self {
            engine: TimerEngine::new(config.timebase, config.finish_hold),
            adapter: PresentationAdapter::new(config.plant_name, config.scrub_mode),
            config,
            host,
            tracer: Tracer::none(),
            pending_frame: None,
            pending_revert: None,
            awaiting_media: None,
        }
    }

    /// Installs a trace sink. Events only reach it when the `trace` feature
    /// is enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer.set_sink(sink);
    }

    /// Removes and returns the installed trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.tracer.take_sink()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    /// Returns the current UI state.
    #[must_use]
    pub const fn state(&self) -> UiState {
        self.engine.state()
    }

    /// Returns the host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Returns the pending frame request, if any.
    #[must_use]
    pub const fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// Returns the pending finish-hold delay, if any.
    #[must_use]
    pub const fn pending_revert(&self) -> Option<DelayHandle> {
        self.pending_revert
    }

    /// Applies the page-load baseline: idle layout, animation paused.
    pub fn initialize(&mut self) {
        let (surface, media) = self.host.outputs();
        surface.show_running(false);
        media.pause();
    }

    /// Starts a session from the raw text of the minutes field.
    pub fn start_from_input(&mut self, text: &str) -> Result<SessionId, StartError> {
        match parse_minutes(text) {
            Ok(minutes) => self.start(minutes),
            Err(error) => {
                self.reject(error);
                Err(error)
            }
        }
    }

    /// Starts a session of `minutes`.
    ///
    /// Invalid input is reported through [`Dialogs::alert`] and leaves the
    /// timer Idle. If the media asset is not ready yet, the frame chain
    /// starts from [`on_media_ready`](Self::on_media_ready).
    ///
    /// [`Dialogs::alert`]: crate::backend::Dialogs::alert
    pub fn start(&mut self, minutes: u32) -> Result<SessionId, StartError> {
        let now = self.host.now();
        let session = match self.engine.start(minutes, now) {
            Ok(session) => session,
            Err(error) => {
                self.reject(error);
                return Err(error);
            }
        };
        let total_secs = u64::from(minutes) * 60;

        let (surface, media) = self.host.outputs();
        self.adapter.show_started(total_secs, surface);
        let ready = media.is_ready();

        self.tracer.session_start(&SessionStartEvent {
            session,
            total_secs,
            at: now,
            awaiting_media: !ready,
        });

        if ready {
            self.begin(session);
        } else {
            self.awaiting_media = Some(session);
            let (_, media) = self.host.outputs();
            media.await_metadata(session);
        }
        Ok(session)
    }

    /// Called by the host once media metadata is available.
    pub fn on_media_ready(&mut self, session: SessionId) {
        if self.awaiting_media != Some(session) || self.engine.session_id() != Some(session) {
            self.stale(CallbackKind::MediaReady);
            return;
        }
        self.awaiting_media = None;
        self.begin(session);
    }

    /// Called by the host when a requested frame fires.
    pub fn on_frame(&mut self, handle: FrameHandle, tick: FrameTick) {
        if self.pending_frame != Some(handle) {
            self.stale(CallbackKind::Frame);
            return;
        }
        self.pending_frame = None;

        let Some((session, total_secs)) = self
            .engine
            .session()
            .map(|s| (s.id(), s.total_secs()))
        else {
            self.stale(CallbackKind::Frame);
            return;
        };
        let Ok(sample) = self.engine.tick(tick.now) else {
            self.stale(CallbackKind::Frame);
            return;
        };

        let (surface, media) = self.host.outputs();
        let scrub = self.adapter.present(&sample, total_secs, surface, media);
        self.tracer.tick(&TickEvent {
            session,
            frame_index: tick.frame_index,
            now: tick.now,
            progress: sample.progress,
            seconds_left: sample.seconds_left,
            scrub,
        });

        if sample.is_complete() {
            self.finish(session, tick.now);
        } else {
            self.pending_frame = Some(self.host.request_frame());
        }
    }

    /// Called by the host when a scheduled delay fires.
    pub fn on_delay(&mut self, handle: DelayHandle, now: HostTime) {
        if self.pending_revert != Some(handle) {
            self.stale(CallbackKind::Delay);
            return;
        }
        self.pending_revert = None;

        if self.engine.revert_if_due(now) {
            self.show_idle(now, false, false);
        } else if let Some(at) = self.engine.revert_at() {
            // Fired early; wait out the remainder.
            let remaining = at.saturating_duration_since(now);
            self.pending_revert = Some(self.host.schedule_delay(remaining));
        }
    }

    /// Asks the user to confirm, then stops the running session.
    ///
    /// Returns `true` if the session was stopped. Outside Running nothing is
    /// asked and nothing changes.
    pub fn request_stop(&mut self) -> bool {
        let Some(session) = self.engine.session_id() else {
            return false;
        };
        if self.engine.state() != UiState::Running {
            return false;
        }

        let confirmed = self.host.confirm(self.config.stop_prompt);
        let now = self.host.now();
        self.tracer.stop(&StopEvent {
            session,
            confirmed,
            at: now,
        });

        if !self.engine.stop(confirmed) {
            return false;
        }
        let (cancelled_frame, cancelled_delay) = self.cancel_pending();
        self.show_idle(now, cancelled_frame, cancelled_delay);
        true
    }

    /// Cancels everything pending and returns to the idle baseline.
    ///
    /// Calling this repeatedly is the same as calling it once.
    pub fn reset(&mut self) {
        let now = self.host.now();
        let (cancelled_frame, cancelled_delay) = self.cancel_pending();
        self.engine.reset();
        self.show_idle(now, cancelled_frame, cancelled_delay);
    }

    fn begin(&mut self, session: SessionId) {
        let now = self.host.now();
        if self.engine.anchor(now).is_err() {
            self.stale(CallbackKind::MediaReady);
            return;
        }
        let (_, media) = self.host.outputs();
        self.adapter.start_media(media);
        self.tracer
            .session_begin(&SessionBeginEvent { session, at: now });
        if let Some(stale) = self.pending_frame.take() {
            self.host.cancel_frame(stale);
        }
        self.pending_frame = Some(self.host.request_frame());
    }

    fn finish(&mut self, session: SessionId, now: HostTime) {
        if let Some(frame) = self.pending_frame.take() {
            self.host.cancel_frame(frame);
        }
        let (surface, media) = self.host.outputs();
        self.adapter.show_finished(surface, media);
        self.tracer.finish(&FinishEvent { session, at: now });
        self.pending_revert = Some(self.host.schedule_delay(self.config.finish_hold));
    }

    fn show_idle(&mut self, now: HostTime, cancelled_frame: bool, cancelled_delay: bool) {
        let (surface, media) = self.host.outputs();
        self.adapter.show_idle(surface, media);
        self.tracer.reset(&ResetEvent {
            at: now,
            cancelled_frame,
            cancelled_delay,
        });
    }

    /// Cancels the pending frame and delay. Returns which were pending.
    fn cancel_pending(&mut self) -> (bool, bool) {
        self.awaiting_media = None;
        let frame = self.pending_frame.take();
        if let Some(handle) = frame {
            self.host.cancel_frame(handle);
        }
        let delay = self.pending_revert.take();
        if let Some(handle) = delay {
            self.host.cancel_delay(handle);
        }
        (frame.is_some(), delay.is_some())
    }

    fn reject(&mut self, error: StartError) {
        let at = self.host.now();
        self.tracer.rejected_start(&RejectedStartEvent { error, at });
        if error == StartError::InvalidDuration {
            self.host.alert(self.config.invalid_input_message);
        }
    }

    fn stale(&mut self, kind: CallbackKind) {
        let at = self.host.now();
        self.tracer
            .stale_callback(&StaleCallbackEvent { kind, at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DelayScheduler as _;
    use crate::present::{FINISHED_COUNTDOWN, IDLE_STAGE_LABEL};
    use crate::sim::{SimHost, SimMedia};
    use crate::time::Duration;

    const REFRESH: Duration = Duration(16_666_667);

    fn secs(s: u64) -> Duration {
        Duration(s * 1_000_000_000)
    }

    fn at(s: u64) -> HostTime {
        HostTime(s * 1_000_000_000)
    }

    fn timer(media: SimMedia) -> SproutTimer<SimHost> {
        let mut t = SproutTimer::new(TimerConfig::headless(), SimHost::new(media));
        t.initialize();
        t
    }

    #[test]
    fn scenario_a_runs_to_finish_and_reverts() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(1).unwrap();
        assert_eq!(t.state(), UiState::Running);
        assert_eq!(t.host().surface.countdown, "1:00 left");
        assert!(t.host().media.playing);

        t.advance(secs(30), REFRESH);
        let sample = t.engine().session().unwrap().last_sample();
        assert_eq!(sample.progress, 0.5);
        assert_eq!(sample.seconds_left, 30);
        let surface = &t.host().surface;
        assert_eq!(surface.countdown, "0:30 left");
        assert_eq!(surface.stage, "Growing Sprout 🌿");
        assert!((surface.progress_percent - 50.0).abs() < 1e-9);
        assert!((t.host().media.current_time - 6.0).abs() < 1e-9);

        t.advance(secs(30), REFRESH);
        assert_eq!(t.state(), UiState::Finished);
        let surface = &t.host().surface;
        assert_eq!(surface.countdown, FINISHED_COUNTDOWN);
        assert_eq!(surface.stage, "Fully Grown! 🎉");
        assert_eq!(surface.status, "✨ Your sunflower is fully grown! 🌸");
        assert!(!t.host().media.playing);
        assert!(t.pending_frame().is_none());
        assert!(t.host().outstanding_frames().is_empty());

        t.advance(Duration(4_900_000_000), REFRESH);
        assert_eq!(t.state(), UiState::Finished);

        t.advance(Duration(100_000_000), REFRESH);
        assert_eq!(t.state(), UiState::Idle);
        assert!(!t.host().surface.running);
        assert_eq!(t.host().surface.stage, IDLE_STAGE_LABEL);
        assert_eq!(t.host().media.current_time, 0.0);
        assert!(t.pending_revert().is_none());
    }

    #[test]
    fn scenario_b_zero_minutes_is_rejected() {
        let mut t = timer(SimMedia::ready(12.0));
        assert_eq!(t.start(0), Err(StartError::InvalidDuration));
        assert_eq!(t.state(), UiState::Idle);
        assert!(t.engine().session().is_none());
        assert!(t.host().outstanding_frames().is_empty());
        assert_eq!(
            t.host().alerts,
            ["Please enter a valid number of minutes."]
        );
        assert!(!t.host().surface.running);
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        let mut t = timer(SimMedia::ready(12.0));
        assert_eq!(t.start_from_input("soon"), Err(StartError::InvalidDuration));
        assert_eq!(t.start_from_input("-2"), Err(StartError::InvalidDuration));
        assert_eq!(t.host().alerts.len(), 2);
        assert_eq!(t.state(), UiState::Idle);

        t.start_from_input("2").unwrap();
        assert_eq!(t.engine().session().unwrap().total_secs(), 120);
    }

    #[test]
    fn scenario_c_denied_stop_keeps_running() {
        let mut t = timer(SimMedia::ready(12.0));
        let session = t.start(5).unwrap();
        t.advance(secs(10), REFRESH);
        t.host_mut().confirm_answer = false;

        assert!(!t.request_stop());
        assert_eq!(t.state(), UiState::Running);
        assert_eq!(t.engine().session_id(), Some(session));
        assert_eq!(
            t.host().confirms,
            ["Are you sure you want to stop? Your plant will wither."]
        );
        assert!(t.pending_frame().is_some());

        t.advance(secs(10), REFRESH);
        let sample = t.engine().session().unwrap().last_sample();
        assert_eq!(sample.seconds_left, 280);
    }

    #[test]
    fn scenario_d_confirmed_stop_skips_finished() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(5).unwrap();
        t.advance(secs(10), REFRESH);

        assert!(t.request_stop());
        assert_eq!(t.state(), UiState::Idle);
        assert!(t.pending_frame().is_none());
        assert!(t.pending_revert().is_none());
        assert!(t.host().outstanding_frames().is_empty());
        assert!(t.host().outstanding_delays().is_empty());
        assert_eq!(t.host().cancelled_frames, 1);
        let surface = &t.host().surface;
        assert_ne!(surface.countdown, FINISHED_COUNTDOWN);
        assert!(!surface.running);
        assert_eq!(surface.countdown, "");
        assert_eq!(surface.progress_percent, 0.0);
        assert_eq!(surface.status, "");
        assert_eq!(surface.stage, IDLE_STAGE_LABEL);

        t.advance(secs(600), REFRESH);
        assert_eq!(t.state(), UiState::Idle);
    }

    #[test]
    fn second_stop_changes_nothing() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(5).unwrap();
        t.advance(secs(10), REFRESH);

        assert!(t.request_stop());
        let surface = t.host().surface.clone();
        let media = t.host().media.clone();

        assert!(!t.request_stop());
        assert_eq!(t.state(), UiState::Idle);
        assert_eq!(t.host().confirms.len(), 1);
        assert_eq!(t.host().surface, surface);
        assert_eq!(t.host().media, media);
        assert!(t.host().outstanding_frames().is_empty());
    }

    #[test]
    fn stop_outside_running_asks_nothing() {
        let mut t = timer(SimMedia::ready(12.0));
        assert!(!t.request_stop());
        t.start(1).unwrap();
        t.advance(secs(60), REFRESH);
        assert_eq!(t.state(), UiState::Finished);
        assert!(!t.request_stop());
        assert!(t.host().confirms.is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(1).unwrap();
        t.advance(secs(5), REFRESH);

        let snapshot = |t: &SproutTimer<SimHost>| {
            let h = t.host();
            (
                t.state(),
                h.surface.running,
                h.surface.stage.clone(),
                h.surface.countdown.clone(),
                h.surface.progress_percent,
                h.surface.status.clone(),
                h.media.playing,
                h.media.current_time,
                h.outstanding_frames().len(),
            )
        };
        t.reset();
        let once = snapshot(&t);
        assert_eq!(once.3, "");
        assert_eq!(once.4, 0.0);
        assert_eq!(once.5, "");
        t.reset();
        assert_eq!(once, snapshot(&t));
        assert_eq!(t.host().cancelled_frames, 1);
        assert_eq!(t.host().cancelled_delays, 0);
    }

    #[test]
    fn reset_while_finished_cancels_revert() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(1).unwrap();
        t.advance(secs(60), REFRESH);
        assert!(t.pending_revert().is_some());

        t.reset();
        assert_eq!(t.state(), UiState::Idle);
        assert_eq!(t.host().cancelled_delays, 1);
        assert!(t.host().outstanding_delays().is_empty());
    }

    #[test]
    fn stale_frame_cannot_reanimate_a_stopped_session() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(1).unwrap();
        t.advance(secs(1), REFRESH);
        let leftover = t.pending_frame().unwrap();

        t.reset();
        let idle_surface = t.host().surface.clone();
        t.on_frame(
            leftover,
            FrameTick {
                now: at(59),
                frame_index: 999,
            },
        );
        assert_eq!(t.state(), UiState::Idle);
        assert_eq!(t.host().surface, idle_surface);
        assert!(t.host().outstanding_frames().is_empty());

        t.start(1).unwrap();
        let fresh = t.pending_frame().unwrap();
        assert_ne!(fresh, leftover);
        t.on_frame(
            leftover,
            FrameTick {
                now: at(59),
                frame_index: 1000,
            },
        );
        assert_eq!(t.state(), UiState::Running);
        assert_eq!(t.pending_frame(), Some(fresh));
    }

    #[test]
    fn stale_delay_is_ignored() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(1).unwrap();
        t.advance(secs(60), REFRESH);
        let leftover = t.pending_revert().unwrap();
        t.reset();

        t.start(1).unwrap();
        t.on_delay(leftover, at(100));
        assert_eq!(t.state(), UiState::Running);
    }

    #[test]
    fn early_delay_waits_out_the_remainder() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(1).unwrap();
        t.advance(secs(60), REFRESH);
        let first = t.pending_revert().unwrap();

        t.host_mut().cancel_delay(first);
        t.on_delay(first, at(62));
        assert_eq!(t.state(), UiState::Finished);
        let second = t.pending_revert().unwrap();
        assert_ne!(first, second);

        t.host_mut().set_now(at(62));
        t.advance(secs(3), REFRESH);
        assert_eq!(t.state(), UiState::Idle);
    }

    #[test]
    fn first_frame_waits_for_media() {
        let mut t = timer(SimMedia::loading());
        let session = t.start(1).unwrap();
        assert!(t.pending_frame().is_none());
        assert_eq!(t.host().media.awaiting, Some(session));
        assert!(t.host().surface.running);

        t.advance(secs(10), REFRESH);
        assert_eq!(t.host().surface.countdown, "1:00 left");

        t.load_media(12.0);
        assert!(t.pending_frame().is_some());
        assert_eq!(t.engine().session().unwrap().start(), at(10));

        t.advance(secs(30), REFRESH);
        let sample = t.engine().session().unwrap().last_sample();
        assert_eq!(sample.progress, 0.5);
    }

    #[test]
    fn media_ready_after_stop_is_ignored() {
        let mut t = timer(SimMedia::loading());
        t.start(1).unwrap();
        assert!(t.request_stop());

        t.load_media(12.0);
        assert_eq!(t.state(), UiState::Idle);
        assert!(t.pending_frame().is_none());
        assert!(!t.host().media.playing);
    }

    #[test]
    fn unknown_duration_skips_scrub_but_counts_down() {
        let mut media = SimMedia::ready(12.0);
        media.duration = None;
        let mut t = timer(media);
        t.start(1).unwrap();
        let seeks_at_start = t.host().media.seeks;

        t.advance(secs(15), REFRESH);
        assert_eq!(t.host().media.seeks, seeks_at_start);
        assert_eq!(t.host().surface.countdown, "0:45 left");
        assert_eq!(t.host().surface.stage, "Growing Sprout 🌿");
    }

    #[test]
    fn suspended_tab_catches_up_in_one_frame() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(1).unwrap();
        t.advance(secs(1), REFRESH);

        t.suspend_for(secs(45));
        let sample = t.engine().session().unwrap().last_sample();
        assert_eq!(sample.seconds_left, 14);
        assert_eq!(t.host().surface.stage, "Budding Plant 🌼");

        t.suspend_for(secs(120));
        assert_eq!(t.state(), UiState::Finished);
    }

    #[test]
    fn progress_never_decreases_across_frames() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(2).unwrap();
        let mut last = 0.0;
        for _ in 0..100 {
            t.advance(Duration(1_100_000_000), REFRESH);
            let Some(session) = t.engine().session() else {
                break;
            };
            let p = session.last_sample().progress;
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn start_while_finished_is_rejected() {
        let mut t = timer(SimMedia::ready(12.0));
        t.start(1).unwrap();
        t.advance(secs(60), REFRESH);
        assert_eq!(t.start(3), Err(StartError::AlreadyActive));
        assert_eq!(t.state(), UiState::Finished);
        assert!(t.host().alerts.is_empty());
    }
}
