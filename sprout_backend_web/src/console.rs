// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace output.
//!
//! [`ConsoleSink`] writes one `console.debug` line per controller event,
//! with timestamps in milliseconds. Per-frame ticks are only logged when
//! enabled with [`ConsoleSink::with_ticks`], since they arrive at the display
//! refresh rate.

use alloc::format;
use alloc::string::String;

use sprout_core::time::{HostTime, Timebase};
use sprout_core::trace::{
    CallbackKind, FinishEvent, RejectedStartEvent, ResetEvent, SessionBeginEvent,
    SessionStartEvent, StaleCallbackEvent, StopEvent, TickEvent, TraceSink,
};
use web_sys::console;

/// Logs controller events to the browser console.
#[derive(Debug)]
pub struct ConsoleSink {
    timebase: Timebase,
    ticks: bool,
}

impl ConsoleSink {
    /// Creates a sink that skips per-frame ticks.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self {
            timebase,
            ticks: false,
        }
    }

    /// Creates a sink that also logs every tick.
    #[must_use]
    pub fn with_ticks(timebase: Timebase) -> Self {
        Self {
            timebase,
            ticks: true,
        }
    }

    fn ms(&self, t: HostTime) -> f64 {
        self.timebase.ticks_to_secs(t.ticks()) * 1000.0
    }

    fn log(line: &str) {
        console::debug_1(&line.into());
    }
}

fn kind_name(kind: CallbackKind) -> &'static str {
    match kind {
        CallbackKind::Frame => "frame",
        CallbackKind::Delay => "delay",
        CallbackKind::MediaReady => "media-ready",
    }
}

fn scrub_text(scrub: Option<f64>) -> String {
    match scrub {
        Some(pos) => format!("{pos:.3}s"),
        None => String::from("skipped"),
    }
}

impl TraceSink for ConsoleSink {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        Self::log(&format!(
            "[sprout] start session={} total={}s at={:.1}ms awaiting_media={}",
            e.session.0,
            e.total_secs,
            self.ms(e.at),
            e.awaiting_media,
        ));
    }

    fn on_session_begin(&mut self, e: &SessionBeginEvent) {
        Self::log(&format!(
            "[sprout] begin session={} anchor={:.1}ms",
            e.session.0,
            self.ms(e.at),
        ));
    }

    fn on_tick(&mut self, e: &TickEvent) {
        if !self.ticks {
            return;
        }
        Self::log(&format!(
            "[sprout] tick session={} frame={} now={:.1}ms progress={:.4} left={}s scrub={}",
            e.session.0,
            e.frame_index,
            self.ms(e.now),
            e.progress,
            e.seconds_left,
            scrub_text(e.scrub),
        ));
    }

    fn on_finish(&mut self, e: &FinishEvent) {
        Self::log(&format!(
            "[sprout] finish session={} at={:.1}ms",
            e.session.0,
            self.ms(e.at),
        ));
    }

    fn on_stop(&mut self, e: &StopEvent) {
        Self::log(&format!(
            "[sprout] stop session={} confirmed={} at={:.1}ms",
            e.session.0,
            e.confirmed,
            self.ms(e.at),
        ));
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        Self::log(&format!(
            "[sprout] idle at={:.1}ms cancelled_frame={} cancelled_delay={}",
            self.ms(e.at),
            e.cancelled_frame,
            e.cancelled_delay,
        ));
    }

    fn on_stale_callback(&mut self, e: &StaleCallbackEvent) {
        Self::log(&format!(
            "[sprout] stale {} callback dropped at={:.1}ms",
            kind_name(e.kind),
            self.ms(e.at),
        ));
    }

    fn on_rejected_start(&mut self, e: &RejectedStartEvent) {
        console::warn_1(
            &format!("[sprout] start rejected: {} at={:.1}ms", e.error, self.ms(e.at)).into(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_text_marks_skipped_frames() {
        assert_eq!(scrub_text(Some(6.0)), "6.000s");
        assert_eq!(scrub_text(None), "skipped");
    }

    #[test]
    fn callback_kinds_have_short_names() {
        assert_eq!(kind_name(CallbackKind::MediaReady), "media-ready");
    }
}
