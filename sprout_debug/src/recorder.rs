// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use sprout_core::session::{SessionId, StartError};
use sprout_core::time::HostTime;
use sprout_core::trace::{
    CallbackKind, FinishEvent, RejectedStartEvent, ResetEvent, SessionBeginEvent,
    SessionStartEvent, StaleCallbackEvent, StopEvent, TickEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SESSION_START: u8 = 1;
const TAG_SESSION_BEGIN: u8 = 2;
const TAG_TICK: u8 = 3;
const TAG_FINISH: u8 = 4;
const TAG_STOP: u8 = 5;
const TAG_RESET: u8 = 6;
const TAG_STALE_CALLBACK: u8 = 7;
const TAG_REJECTED_START: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_option_f64(&mut self, v: Option<f64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_f64(val);
            }
            None => {
                self.write_u8(0);
                self.write_f64(0.0);
            }
        }
    }

    fn write_header(&mut self, tag: u8, session: SessionId, at: HostTime) {
        self.write_u8(tag);
        self.write_u64(session.0);
        self.write_u64(at.ticks());
    }
}

impl TraceSink for RecorderSink {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        self.write_header(TAG_SESSION_START, e.session, e.at);
        self.write_u64(e.total_secs);
        self.write_bool(e.awaiting_media);
    }

    fn on_session_begin(&mut self, e: &SessionBeginEvent) {
        self.write_header(TAG_SESSION_BEGIN, e.session, e.at);
    }

    fn on_tick(&mut self, e: &TickEvent) {
        self.write_header(TAG_TICK, e.session, e.now);
        self.write_u64(e.frame_index);
        self.write_f64(e.progress);
        self.write_u64(e.seconds_left);
        self.write_option_f64(e.scrub);
    }

    fn on_finish(&mut self, e: &FinishEvent) {
        self.write_header(TAG_FINISH, e.session, e.at);
    }

    fn on_stop(&mut self, e: &StopEvent) {
        self.write_header(TAG_STOP, e.session, e.at);
        self.write_bool(e.confirmed);
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        self.write_u8(TAG_RESET);
        self.write_u64(e.at.ticks());
        self.write_bool(e.cancelled_frame);
        self.write_bool(e.cancelled_delay);
    }

    fn on_stale_callback(&mut self, e: &StaleCallbackEvent) {
        self.write_u8(TAG_STALE_CALLBACK);
        self.write_u64(e.at.ticks());
        self.write_u8(match e.kind {
            CallbackKind::Frame => 0,
            CallbackKind::Delay => 1,
            CallbackKind::MediaReady => 2,
        });
    }

    fn on_rejected_start(&mut self, e: &RejectedStartEvent) {
        self.write_u8(TAG_REJECTED_START);
        self.write_u64(e.at.ticks());
        self.write_u8(match e.error {
            StartError::InvalidDuration => 0,
            StartError::AlreadyActive => 1,
        });
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`SessionStartEvent`].
    SessionStart(SessionStartEvent),
    /// A [`SessionBeginEvent`].
    SessionBegin(SessionBeginEvent),
    /// A [`TickEvent`].
    Tick(TickEvent),
    /// A [`FinishEvent`].
    Finish(FinishEvent),
    /// A [`StopEvent`].
    Stop(StopEvent),
    /// A [`ResetEvent`].
    Reset(ResetEvent),
    /// A [`StaleCallbackEvent`].
    StaleCallback(StaleCallbackEvent),
    /// A [`RejectedStartEvent`].
    RejectedStart(RejectedStartEvent),
}

impl RecordedEvent {
    /// Returns the host time the event was stamped with.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::SessionStart(e) => e.at,
            Self::SessionBegin(e) => e.at,
            Self::Tick(e) => e.now,
            Self::Finish(e) => e.at,
            Self::Stop(e) => e.at,
            Self::Reset(e) => e.at,
            Self::StaleCallback(e) => e.at,
            Self::RejectedStart(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_option_f64(&mut self) -> Option<Option<f64>> {
        let present = self.read_u8()?;
        let val = self.read_f64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_header(&mut self) -> Option<(SessionId, HostTime)> {
        Some((SessionId(self.read_u64()?), HostTime(self.read_u64()?)))
    }

    fn decode_session_start(&mut self) -> Option<RecordedEvent> {
        let (session, at) = self.read_header()?;
        Some(RecordedEvent::SessionStart(SessionStartEvent {
            session,
            total_secs: self.read_u64()?,
            at,
            awaiting_media: self.read_bool()?,
        }))
    }

    fn decode_session_begin(&mut self) -> Option<RecordedEvent> {
        let (session, at) = self.read_header()?;
        Some(RecordedEvent::SessionBegin(SessionBeginEvent { session, at }))
    }

    fn decode_tick(&mut self) -> Option<RecordedEvent> {
        let (session, now) = self.read_header()?;
        Some(RecordedEvent::Tick(TickEvent {
            session,
            frame_index: self.read_u64()?,
            now,
            progress: self.read_f64()?,
            seconds_left: self.read_u64()?,
            scrub: self.read_option_f64()?,
        }))
    }

    fn decode_finish(&mut self) -> Option<RecordedEvent> {
        let (session, at) = self.read_header()?;
        Some(RecordedEvent::Finish(FinishEvent { session, at }))
    }

    fn decode_stop(&mut self) -> Option<RecordedEvent> {
        let (session, at) = self.read_header()?;
        Some(RecordedEvent::Stop(StopEvent {
            session,
            confirmed: self.read_bool()?,
            at,
        }))
    }

    fn decode_reset(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reset(ResetEvent {
            at: HostTime(self.read_u64()?),
            cancelled_frame: self.read_bool()?,
            cancelled_delay: self.read_bool()?,
        }))
    }

    fn decode_stale_callback(&mut self) -> Option<RecordedEvent> {
        let at = HostTime(self.read_u64()?);
        let kind = match self.read_u8()? {
            0 => CallbackKind::Frame,
            1 => CallbackKind::Delay,
            _ => CallbackKind::MediaReady,
        };
        Some(RecordedEvent::StaleCallback(StaleCallbackEvent { kind, at }))
    }

    fn decode_rejected_start(&mut self) -> Option<RecordedEvent> {
        let at = HostTime(self.read_u64()?);
        let error = match self.read_u8()? {
            0 => StartError::InvalidDuration,
            _ => StartError::AlreadyActive,
        };
        Some(RecordedEvent::RejectedStart(RejectedStartEvent { error, at }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_SESSION_START => self.decode_session_start(),
            TAG_SESSION_BEGIN => self.decode_session_begin(),
            TAG_TICK => self.decode_tick(),
            TAG_FINISH => self.decode_finish(),
            TAG_STOP => self.decode_stop(),
            TAG_RESET => self.decode_reset(),
            TAG_STALE_CALLBACK => self.decode_stale_callback(),
            TAG_REJECTED_START => self.decode_rejected_start(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick(scrub: Option<f64>) -> TickEvent {
        TickEvent {
            session: SessionId(3),
            frame_index: 42,
            now: HostTime(30_000_000_000),
            progress: 0.5,
            seconds_left: 30,
            scrub,
        }
    }

    #[test]
    fn tick_keeps_skipped_scrub() {
        let mut rec = RecorderSink::new();
        rec.on_tick(&sample_tick(Some(6.0)));
        rec.on_tick(&sample_tick(None));

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match (&events[0], &events[1]) {
            (RecordedEvent::Tick(a), RecordedEvent::Tick(b)) => {
                assert_eq!(a.session, SessionId(3));
                assert_eq!(a.frame_index, 42);
                assert_eq!(a.now, HostTime(30_000_000_000));
                assert_eq!(a.progress, 0.5);
                assert_eq!(a.seconds_left, 30);
                assert_eq!(a.scrub, Some(6.0));
                assert_eq!(b.scrub, None);
            }
            other => panic!("expected two ticks, got {other:?}"),
        }
    }

    #[test]
    fn session_lifecycle_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_session_start(&SessionStartEvent {
            session: SessionId(1),
            total_secs: 60,
            at: HostTime(0),
            awaiting_media: true,
        });
        rec.on_session_begin(&SessionBeginEvent {
            session: SessionId(1),
            at: HostTime(10),
        });
        rec.on_stop(&StopEvent {
            session: SessionId(1),
            confirmed: true,
            at: HostTime(20),
        });
        rec.on_reset(&ResetEvent {
            at: HostTime(20),
            cancelled_frame: true,
            cancelled_delay: false,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[0],
            RecordedEvent::SessionStart(SessionStartEvent {
                total_secs: 60,
                awaiting_media: true,
                ..
            })
        ));
        assert_eq!(events[1].at(), HostTime(10));
        assert!(matches!(
            events[2],
            RecordedEvent::Stop(StopEvent {
                confirmed: true,
                ..
            })
        ));
        assert!(matches!(
            events[3],
            RecordedEvent::Reset(ResetEvent {
                cancelled_frame: true,
                cancelled_delay: false,
                ..
            })
        ));
    }

    #[test]
    fn rejections_and_stale_callbacks_decode() {
        let mut rec = RecorderSink::new();
        rec.on_rejected_start(&RejectedStartEvent {
            error: StartError::AlreadyActive,
            at: HostTime(5),
        });
        rec.on_stale_callback(&StaleCallbackEvent {
            kind: CallbackKind::MediaReady,
            at: HostTime(6),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert!(matches!(
            events[0],
            RecordedEvent::RejectedStart(RejectedStartEvent {
                error: StartError::AlreadyActive,
                ..
            })
        ));
        assert!(matches!(
            events[1],
            RecordedEvent::StaleCallback(StaleCallbackEvent {
                kind: CallbackKind::MediaReady,
                ..
            })
        ));
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_tick(&sample_tick(Some(1.0)));
        rec.on_finish(&FinishEvent {
            session: SessionId(3),
            at: HostTime(1),
        });
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }
}
