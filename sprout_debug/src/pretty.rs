// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to milliseconds using a [`Timebase`].

use std::io::Write;

use sprout_core::present::format_time;
use sprout_core::time::{HostTime, Timebase};
use sprout_core::trace::{
    CallbackKind, FinishEvent, RejectedStartEvent, ResetEvent, SessionBeginEvent,
    SessionStartEvent, StaleCallbackEvent, StopEvent, TickEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
    tick_stride: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .field("tick_stride", &self.tick_stride)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self::new(Box::new(std::io::stderr()), timebase)
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self::with_writer(writer, timebase)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self {
            writer,
            timebase,
            tick_stride: 1,
        }
    }

    /// Only prints every `stride`-th frame tick (by frame index); the final
    /// tick of a session is always printed.
    #[must_use]
    pub fn every_nth_tick(mut self, stride: u64) -> Self {
        self.tick_stride = stride.max(1);
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ms(&self, t: HostTime) -> f64 {
        self.timebase.ticks_to_secs(t.ticks()) * 1000.0
    }
}

fn kind_name(kind: CallbackKind) -> &'static str {
    match kind {
        CallbackKind::Frame => "frame",
        CallbackKind::Delay => "delay",
        CallbackKind::MediaReady => "media-ready",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        let _ = writeln!(
            self.writer,
            "[start] session={} total={} at={:.1}ms{}",
            e.session.0,
            format_time(e.total_secs),
            self.ms(e.at),
            if e.awaiting_media {
                " (waiting for media)"
            } else {
                ""
            },
        );
    }

    fn on_session_begin(&mut self, e: &SessionBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[begin] session={} anchor={:.1}ms",
            e.session.0,
            self.ms(e.at),
        );
    }

    fn on_tick(&mut self, e: &TickEvent) {
        if e.frame_index % self.tick_stride != 0 && e.progress < 1.0 {
            return;
        }
        let scrub = match e.scrub {
            Some(pos) => format!("{pos:.3}s"),
            None => "-".to_string(),
        };
        let _ = writeln!(
            self.writer,
            "[tick] session={} frame={} now={:.1}ms progress={:.4} left={} scrub={}",
            e.session.0,
            e.frame_index,
            self.ms(e.now),
            e.progress,
            format_time(e.seconds_left),
            scrub,
        );
    }

    fn on_finish(&mut self, e: &FinishEvent) {
        let _ = writeln!(
            self.writer,
            "[finish] session={} at={:.1}ms",
            e.session.0,
            self.ms(e.at),
        );
    }

    fn on_stop(&mut self, e: &StopEvent) {
        let _ = writeln!(
            self.writer,
            "[stop] session={} confirmed={} at={:.1}ms",
            e.session.0,
            e.confirmed,
            self.ms(e.at),
        );
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        let _ = writeln!(
            self.writer,
            "[idle] at={:.1}ms cancelled_frame={} cancelled_delay={}",
            self.ms(e.at),
            e.cancelled_frame,
            e.cancelled_delay,
        );
    }

    fn on_stale_callback(&mut self, e: &StaleCallbackEvent) {
        let _ = writeln!(
            self.writer,
            "[stale] {} at={:.1}ms",
            kind_name(e.kind),
            self.ms(e.at),
        );
    }

    fn on_rejected_start(&mut self, e: &RejectedStartEvent) {
        let _ = writeln!(
            self.writer,
            "[rejected] {} at={:.1}ms",
            e.error,
            self.ms(e.at),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::session::{SessionId, StartError};

    fn tick(frame_index: u64, progress: f64) -> TickEvent {
        TickEvent {
            session: SessionId(1),
            frame_index,
            now: HostTime(30_000_000_000),
            progress,
            seconds_left: 30,
            scrub: None,
        }
    }

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn tick_line_is_readable() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new(), Timebase::NANOS);
        sink.on_tick(&tick(3, 0.5));
        assert_eq!(
            output(sink),
            "[tick] session=1 frame=3 now=30000.0ms progress=0.5000 left=0:30 scrub=-\n"
        );
    }

    #[test]
    fn stride_skips_ticks_but_keeps_the_last() {
        let mut sink =
            PrettyPrintSink::with_writer(Vec::new(), Timebase::NANOS).every_nth_tick(10);
        for i in 0..25 {
            sink.on_tick(&tick(i, 0.5));
        }
        sink.on_tick(&tick(25, 1.0));
        let out = output(sink);
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().last().unwrap().contains("progress=1.0000"));
    }

    #[test]
    fn rejection_uses_error_message() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new(), Timebase::MICROS);
        sink.on_rejected_start(&RejectedStartEvent {
            error: StartError::InvalidDuration,
            at: HostTime(1_500),
        });
        assert_eq!(
            output(sink),
            "[rejected] Please enter a valid number of minutes. at=1.5ms\n"
        );
    }
}
