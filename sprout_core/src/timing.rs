// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame ticks and the elapsed-time sampling formula.
//!
//! - [`FrameTick`]: a display-refresh opportunity delivered by the backend
//! - [`TickSample`]: what the engine derives from one tick
//!
//! # Data flow
//!
//! 1. The backend's frame scheduler fires and produces a [`FrameTick`]
//!    (e.g. from the `requestAnimationFrame` timestamp).
//! 2. [`TimerEngine::tick`](crate::engine::TimerEngine::tick) turns the
//!    tick's `now` into a [`TickSample`] using [`sample_elapsed`].
//! 3. The [`PresentationAdapter`](crate::present::PresentationAdapter)
//!    projects the sample onto the surface and the media asset.
//! 4. The controller requests the next frame unless the sample is complete.

use crate::time::{Duration, HostTime, Timebase};

/// A frame opportunity delivered by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTick {
    /// Host time the frame callback was invoked with.
    pub now: HostTime,
    /// Monotonically increasing frame counter for the backend's scheduler.
    pub frame_index: u64,
}

/// Engine output for a single tick.
///
/// Both fields are derived from `now - start`; neither is ever stored and
/// advanced independently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickSample {
    /// Fraction of the total duration elapsed, in `[0, 1]`.
    pub progress: f64,
    /// Whole seconds remaining, rounded up.
    pub seconds_left: u64,
}

impl TickSample {
    /// The sample at the instant a session of `total_secs` starts.
    #[must_use]
    pub const fn initial(total_secs: u64) -> Self {
        Self {
            progress: 0.0,
            seconds_left: total_secs,
        }
    }

    /// Returns `true` once the sample has reached the end of the session.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        is_complete(self.progress)
    }
}

/// Returns `true` iff `progress` has reached 1.
#[must_use]
pub fn is_complete(progress: f64) -> bool {
    progress >= 1.0
}

/// Computes the sample for a session of `total_secs` that has run for
/// `elapsed`.
///
/// `progress = min(elapsed / total, 1)` and
/// `seconds_left = ceil(total - elapsed)`, clamped at zero.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "seconds_left is bounded by total_secs, which came from a u64"
)]
pub fn sample_elapsed(total_secs: u64, elapsed: Duration, timebase: Timebase) -> TickSample {
    if total_secs == 0 {
        return TickSample {
            progress: 1.0,
            seconds_left: 0,
        };
    }
    let total = total_secs as f64;
    let elapsed = elapsed.as_secs_f64(timebase);
    let progress = (elapsed / total).min(1.0);
    let remaining = libm::ceil(total - elapsed).max(0.0);
    TickSample {
        progress,
        seconds_left: remaining as u64,
    }
}

/// Computes the sample for a session anchored at `start`, observed at `now`.
#[must_use]
pub fn sample_at(total_secs: u64, start: HostTime, now: HostTime, timebase: Timebase) -> TickSample {
    sample_elapsed(total_secs, now.saturating_duration_since(start), timebase)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TB: Timebase = Timebase::MICROS;

    fn secs(s: f64) -> Duration {
        Duration((s * 1_000_000.0) as u64)
    }

    #[test]
    fn endpoints() {
        for total in [1_u64, 60, 300, 3600] {
            let start = sample_elapsed(total, Duration::ZERO, TB);
            assert_eq!(start.progress, 0.0);
            assert_eq!(start.seconds_left, total);

            let end = sample_elapsed(total, Duration::from_secs(total, TB), TB);
            assert_eq!(end.progress, 1.0);
            assert_eq!(end.seconds_left, 0);
            assert!(end.is_complete());
        }
    }

    #[test]
    fn interior_points_follow_formula() {
        for total in [60_u64, 90, 1500] {
            for elapsed in [0.25_f64, 1.0, 12.5, 29.999, 45.1] {
                let d = secs(elapsed);
                let s = sample_elapsed(total, d, TB);
                let expected = elapsed / total as f64;
                assert!((s.progress - expected).abs() < 1e-6, "{total} {elapsed}");
                let exact = d.as_secs_f64(TB);
                assert_eq!(s.seconds_left, libm::ceil(total as f64 - exact) as u64);
            }
        }
    }

    #[test]
    fn overrun_clamps() {
        let s = sample_elapsed(60, secs(75.0), TB);
        assert_eq!(s.progress, 1.0);
        assert_eq!(s.seconds_left, 0);
    }

    #[test]
    fn fractional_seconds_round_up() {
        let s = sample_elapsed(60, secs(0.4), TB);
        assert_eq!(s.seconds_left, 60);
        let s = sample_elapsed(60, secs(1.0), TB);
        assert_eq!(s.seconds_left, 59);
    }

    #[test]
    fn sample_at_ignores_backwards_now() {
        let s = sample_at(60, HostTime(5_000_000), HostTime(1_000_000), TB);
        assert_eq!(s, TickSample::initial(60));
    }

    #[test]
    fn completion_threshold() {
        assert!(!is_complete(0.999_999));
        assert!(is_complete(1.0));
    }
}
