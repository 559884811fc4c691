// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each session becomes a duration span from its start to its return to
//! Idle, ticks become `progress` and `seconds_left` counter tracks, and the
//! remaining events are instants.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use sprout_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

const PID: u32 = 1;
const TID_SESSION: u32 = 1;
const TID_CALLBACKS: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut open_session: Option<u64> = None;

    for recorded in decode(bytes) {
        let ts = ticks_to_us(recorded.at().ticks(), timebase);
        match recorded {
            RecordedEvent::SessionStart(e) => {
                open_session = Some(e.session.0);
                events.push(json!({
                    "ph": "B",
                    "name": format!("session {}", e.session.0),
                    "cat": "Session",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_SESSION,
                    "args": {
                        "total_secs": e.total_secs,
                        "awaiting_media": e.awaiting_media,
                    }
                }));
            }
            RecordedEvent::SessionBegin(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Begin",
                    "cat": "Session",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_SESSION,
                    "s": "t",
                    "args": { "session": e.session.0 }
                }));
            }
            RecordedEvent::Tick(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "progress",
                    "ts": ts,
                    "pid": PID,
                    "args": { "progress": e.progress }
                }));
                events.push(json!({
                    "ph": "C",
                    "name": "seconds_left",
                    "ts": ts,
                    "pid": PID,
                    "args": { "seconds_left": e.seconds_left }
                }));
                if e.scrub.is_none() {
                    events.push(json!({
                        "ph": "i",
                        "name": "ScrubSkipped",
                        "cat": "Frame",
                        "ts": ts,
                        "pid": PID,
                        "tid": TID_SESSION,
                        "s": "t",
                        "args": { "frame_index": e.frame_index }
                    }));
                }
            }
            RecordedEvent::Finish(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Finished",
                    "cat": "Session",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_SESSION,
                    "s": "p",
                    "args": { "session": e.session.0 }
                }));
            }
            RecordedEvent::Stop(e) => {
                let name = if e.confirmed { "Stop" } else { "StopDeclined" };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Session",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_SESSION,
                    "s": "t",
                    "args": { "session": e.session.0 }
                }));
            }
            RecordedEvent::Reset(e) => {
                if let Some(session) = open_session.take() {
                    events.push(json!({
                        "ph": "E",
                        "name": format!("session {session}"),
                        "cat": "Session",
                        "ts": ts,
                        "pid": PID,
                        "tid": TID_SESSION,
                        "args": {
                            "cancelled_frame": e.cancelled_frame,
                            "cancelled_delay": e.cancelled_delay,
                        }
                    }));
                }
            }
            RecordedEvent::StaleCallback(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Stale{:?}", e.kind),
                    "cat": "Callback",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_CALLBACKS,
                    "s": "t",
                }));
            }
            RecordedEvent::RejectedStart(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RejectedStart",
                    "cat": "Callback",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_CALLBACKS,
                    "s": "t",
                    "args": { "error": e.error.to_string() }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use sprout_core::session::SessionId;
    use sprout_core::time::HostTime;
    use sprout_core::trace::{
        CallbackKind, ResetEvent, SessionStartEvent, StaleCallbackEvent, TickEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_session_start(&SessionStartEvent {
            session: SessionId(1),
            total_secs: 60,
            at: HostTime(1_000_000),
            awaiting_media: false,
        });
        rec.on_tick(&TickEvent {
            session: SessionId(1),
            frame_index: 0,
            now: HostTime(2_000_000),
            progress: 0.25,
            seconds_left: 45,
            scrub: None,
        });
        rec.on_stale_callback(&StaleCallbackEvent {
            kind: CallbackKind::Frame,
            at: HostTime(2_500_000),
        });
        rec.on_reset(&ResetEvent {
            at: HostTime(3_000_000),
            cancelled_frame: true,
            cancelled_delay: false,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 6);

        // Session span opens...
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "session 1");
        assert_eq!(parsed[0]["ts"], 1000.0);

        // ...two counters and a skipped-scrub marker for the tick...
        assert_eq!(parsed[1]["ph"], "C");
        assert_eq!(parsed[2]["args"]["seconds_left"], 45);
        assert_eq!(parsed[3]["name"], "ScrubSkipped");

        assert_eq!(parsed[4]["name"], "StaleFrame");

        // ...and closes on the return to Idle.
        assert_eq!(parsed[5]["ph"], "E");
        assert_eq!(parsed[5]["name"], "session 1");
    }

    #[test]
    fn reset_without_session_emits_nothing() {
        let mut rec = RecorderSink::new();
        rec.on_reset(&ResetEvent {
            at: HostTime(0),
            cancelled_frame: false,
            cancelled_delay: false,
        });
        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&String::from_utf8(out).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
