// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scrub-drift metrics and grading for demo harnesses.
//!
//! A [`DriftTracker`] compares, frame by frame, the scrub position the timer
//! asked for with the position the media asset actually reports, and keeps a
//! rolling history of frame deltas. Frames where scrubbing was skipped, or
//! that arrive after a long gap (dropped refreshes, a suspended tab), count
//! as misses.

#![no_std]

extern crate alloc;

use alloc::string::String;
use sprout_core::time::{HostTime, Timebase};
use sprout_core::trace::TickEvent;

/// How precisely the media asset is expected to follow seeks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeekPrecision {
    /// Seeks land exactly (simulated media).
    Exact,
    /// Seeks snap to decoded frames, as a browser `<video>` does.
    #[default]
    FrameSnapped,
}

/// Per-frame sample fed into [`DriftTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct ScrubSample {
    /// Position the timer requested, in seconds; `None` if it skipped the
    /// scrub.
    pub expected_s: Option<f64>,
    /// Position the asset reports, in seconds.
    pub observed_s: f64,
    /// Frame delta in milliseconds.
    pub frame_delta_ms: f64,
}

/// Letter grade for scrub synchronization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncGrade {
    /// Tight sync and low miss rate.
    A,
    /// Good sync with moderate misses.
    B,
    /// Degraded but usable.
    C,
    /// Poor sync.
    D,
}

impl SyncGrade {
    /// Returns a short label for HUD rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`DriftTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct DriftReport {
    /// Current grade.
    pub grade: SyncGrade,
    /// Misses per 1000 observed frames.
    pub miss_rate_per_1000: f64,
    /// Signed drift of this frame (observed minus expected), in ms. Zero for
    /// skipped scrubs.
    pub drift_ms: f64,
    /// Largest absolute drift seen so far, in ms.
    pub max_abs_drift_ms: f64,
    /// Total frames observed.
    pub total_frames: u64,
    /// Total misses observed.
    pub missed_frames: u64,
}

/// Rolling drift tracker with fixed-size frame-delta history.
///
/// The history must hold at least one frame:
///
/// ```compile_fail
/// use sprout_sync_harness::{DriftTracker, SeekPrecision};
///
/// let _ = DriftTracker::<0>::new(16.67, SeekPrecision::Exact);
/// ```
#[derive(Debug)]
pub struct DriftTracker<const N: usize> {
    precision: SeekPrecision,
    refresh_ms: f64,
    deltas_ms: [f64; N],
    cursor: usize,
    total_frames: u64,
    missed_frames: u64,
    max_abs_drift_ms: f64,
    last_now: Option<HostTime>,
}

impl<const N: usize> Default for DriftTracker<N> {
    fn default() -> Self {
        Self::new(16.67, SeekPrecision::default())
    }
}

impl<const N: usize> DriftTracker<N> {
    /// Creates a tracker for a display refreshing every `refresh_ms`, with
    /// that value prefilled in the ring buffer.
    #[must_use]
    pub const fn new(refresh_ms: f64, precision: SeekPrecision) -> Self {
        const { assert!(N > 0, "DriftTracker needs a non-empty history") };
        Self {
            precision,
            refresh_ms,
            deltas_ms: [refresh_ms; N],
            cursor: 0,
            total_frames: 0,
            missed_frames: 0,
            max_abs_drift_ms: 0.0,
            last_now: None,
        }
    }

    /// Observes one frame and returns an updated report.
    #[must_use]
    pub fn observe(&mut self, sample: ScrubSample) -> DriftReport {
        self.total_frames = self.total_frames.saturating_add(1);
        self.deltas_ms[self.cursor % N] = sample.frame_delta_ms;
        self.cursor = (self.cursor + 1) % N;

        let drift_ms = sample
            .expected_s
            .map_or(0.0, |expected| (sample.observed_s - expected) * 1000.0);
        self.max_abs_drift_ms = self.max_abs_drift_ms.max(drift_ms.abs());

        let stalled = sample.frame_delta_ms > self.refresh_ms * 2.0;
        if sample.expected_s.is_none() || stalled {
            self.missed_frames = self.missed_frames.saturating_add(1);
        }

        let miss_rate = self.missed_frames as f64 * 1000.0 / self.total_frames as f64;
        let grade = grade_for(self.precision, drift_ms.abs(), miss_rate);

        DriftReport {
            grade,
            miss_rate_per_1000: miss_rate,
            drift_ms,
            max_abs_drift_ms: self.max_abs_drift_ms,
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }

    /// Observes the frame described by a controller [`TickEvent`], with the
    /// asset position read back after the frame was presented.
    ///
    /// The frame delta is measured from the previous observed tick; the
    /// first tick counts as one nominal refresh.
    #[must_use]
    pub fn observe_tick(
        &mut self,
        tick: &TickEvent,
        observed_s: f64,
        timebase: Timebase,
    ) -> DriftReport {
        let frame_delta_ms = self.last_now.map_or(self.refresh_ms, |last| {
            timebase.ticks_to_secs(tick.now.saturating_duration_since(last).ticks()) * 1000.0
        });
        self.last_now = Some(tick.now);
        self.observe(ScrubSample {
            expected_s: tick.scrub,
            observed_s,
            frame_delta_ms,
        })
    }

    /// Forgets the previous tick, so the next session's first frame is not
    /// measured against the last one.
    pub fn end_session(&mut self) {
        self.last_now = None;
    }

    /// Returns ring-buffer frame deltas oldest→newest.
    #[must_use]
    pub fn frame_deltas(&self) -> [f64; N] {
        let mut out = [0.0; N];
        let mut i = 0;
        while i < N {
            let idx = (self.cursor + i) % N;
            out[i] = self.deltas_ms[idx];
            i += 1;
        }
        out
    }

    /// Returns an ASCII sparkline over `frame_deltas()`.
    #[must_use]
    pub fn sparkline_ascii(&self, min_ms: f64, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(N);
        for v in self.frame_deltas() {
            let t = (v.clamp(min_ms, max_ms) - min_ms) / (max_ms - min_ms);
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level.min(LEVELS.len() - 1)] as char);
        }
        out
    }
}

fn grade_for(precision: SeekPrecision, drift_abs_ms: f64, miss_rate_per_1000: f64) -> SyncGrade {
    let (a_drift, b_drift, c_drift, a_miss, b_miss, c_miss) = match precision {
        SeekPrecision::Exact => (1.0, 5.0, 20.0, 1.0, 5.0, 15.0),
        SeekPrecision::FrameSnapped => (20.0, 42.0, 84.0, 10.0, 30.0, 80.0),
    };

    if drift_abs_ms < a_drift && miss_rate_per_1000 < a_miss {
        SyncGrade::A
    } else if drift_abs_ms < b_drift && miss_rate_per_1000 < b_miss {
        SyncGrade::B
    } else if drift_abs_ms < c_drift && miss_rate_per_1000 < c_miss {
        SyncGrade::C
    } else {
        SyncGrade::D
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::session::SessionId;

    fn sample(expected: Option<f64>, observed: f64, delta: f64) -> ScrubSample {
        ScrubSample {
            expected_s: expected,
            observed_s: observed,
            frame_delta_ms: delta,
        }
    }

    #[test]
    fn skipped_scrubs_and_stalls_count_as_misses() {
        let mut t = DriftTracker::<8>::new(16.67, SeekPrecision::Exact);
        let mut report = t.observe(sample(Some(1.0), 1.0, 16.7));
        for i in 0..9 {
            let expected = if i < 1 { None } else { Some(1.0) };
            let delta = if i == 1 { 100.0 } else { 16.7 };
            report = t.observe(sample(expected, 1.0, delta));
        }
        assert_eq!(report.total_frames, 10);
        assert_eq!(report.missed_frames, 2);
        assert!((report.miss_rate_per_1000 - 200.0).abs() < 1e-6);
        assert_eq!(report.grade, SyncGrade::D);
    }

    #[test]
    fn frame_snapped_thresholds_are_looser() {
        let mut exact = DriftTracker::<4>::new(16.67, SeekPrecision::Exact);
        let e = exact.observe(sample(Some(6.0), 6.01, 16.7));
        assert!((e.drift_ms - 10.0).abs() < 1e-6);
        assert_eq!(e.grade, SyncGrade::C);

        let mut snapped = DriftTracker::<4>::new(16.67, SeekPrecision::FrameSnapped);
        let s = snapped.observe(sample(Some(6.0), 6.01, 16.7));
        assert_eq!(s.grade, SyncGrade::A);
    }

    #[test]
    fn tick_deltas_use_the_timebase() {
        let tb = Timebase::MICROS;
        let mut t = DriftTracker::<4>::new(16.67, SeekPrecision::Exact);
        let tick = |now: u64| TickEvent {
            session: SessionId(1),
            frame_index: 0,
            now: HostTime(now),
            progress: 0.5,
            seconds_left: 30,
            scrub: Some(6.0),
        };
        let _ = t.observe_tick(&tick(1_000_000), 6.0, tb);
        let report = t.observe_tick(&tick(1_033_000), 6.0, tb);
        assert_eq!(report.grade, SyncGrade::A);
        assert!((t.frame_deltas()[3] - 33.0).abs() < 1e-9);
        assert_eq!(report.missed_frames, 0);

        t.end_session();
        let _ = t.observe_tick(&tick(9_000_000), 6.0, tb);
        assert!((t.frame_deltas()[3] - 16.67).abs() < 1e-9);
    }

    #[test]
    fn sparkline_spans_levels() {
        let mut t = DriftTracker::<3>::new(10.0, SeekPrecision::Exact);
        let _ = t.observe(sample(Some(0.0), 0.0, 30.0));
        assert_eq!(t.sparkline_ascii(10.0, 30.0), "  @");
    }

    #[test]
    fn single_slot_history_wraps() {
        let mut t = DriftTracker::<1>::new(16.67, SeekPrecision::Exact);
        let _ = t.observe(sample(Some(1.0), 1.0, 20.0));
        let report = t.observe(sample(Some(1.0), 1.0, 30.0));
        assert_eq!(t.frame_deltas(), [30.0]);
        assert_eq!(report.total_frames, 2);
    }
}
