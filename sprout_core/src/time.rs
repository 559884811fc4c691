// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time and timebase conversion.
//!
//! [`HostTime`] is a reading of the host's monotonic clock in platform ticks
//! (microseconds for `performance.now()` in the browser, nanoseconds for the
//! simulation host). [`Timebase`] carries the rational factor that turns
//! those ticks into nanoseconds, and [`Duration`] is a span in the same tick
//! units.
//!
//! Elapsed time for a session is always computed as `now - start` in ticks
//! and converted to seconds only at the edge, so frame jitter never
//! accumulates.

use core::fmt;
use core::ops::{Add, Sub};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point in time expressed as platform-native monotonic ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the span from `earlier` to `self`, or zero if `earlier` is
    /// after `self`.
    ///
    /// Clock readings that go backwards (a suspended tab resuming with a
    /// stale frame timestamp, say) therefore never produce negative elapsed
    /// time.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Checked addition of a duration.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, duration: Duration) -> Option<Self> {
        match self.0.checked_add(duration.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds.
///
/// `nanoseconds = ticks * numer / denom`
///
/// Backends expose the correct instance through a `timebase()` free function
/// (e.g. `sprout_backend_web::timebase()` is `1000/1`, one tick per
/// microsecond).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// A timebase where ticks are already nanoseconds.
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// A timebase where one tick is one microsecond.
    pub const MICROS: Self = Self {
        numer: 1000,
        denom: 1,
    };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }

    /// Converts a tick count to fractional seconds.
    #[inline]
    #[must_use]
    pub fn ticks_to_secs(self, ticks: u64) -> f64 {
        self.ticks_to_nanos(ticks) as f64 / NANOS_PER_SEC as f64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A duration in platform-native ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Creates a duration of `secs` whole seconds in the given timebase.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(secs.saturating_mul(NANOS_PER_SEC)))
    }

    /// Creates a duration of `millis` milliseconds in the given timebase.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(millis.saturating_mul(1_000_000)))
    }

    /// Returns this duration as fractional seconds.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self, timebase: Timebase) -> f64 {
        timebase.ticks_to_secs(self.0)
    }

    /// Returns this duration in whole milliseconds, rounded down.
    #[inline]
    #[must_use]
    pub const fn as_millis(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0) / 1_000_000
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn micros_timebase_converts_seconds() {
        let tb = Timebase::MICROS;
        let d = Duration::from_secs(5, tb);
        assert_eq!(d.ticks(), 5_000_000);
        assert!((d.as_secs_f64(tb) - 5.0).abs() < 1e-12);
        assert_eq!(d.as_millis(tb), 5_000);
    }

    #[test]
    fn nanos_timebase_converts_millis() {
        let tb = Timebase::NANOS;
        let d = Duration::from_millis(16, tb);
        assert_eq!(d.ticks(), 16_000_000);
        assert_eq!(d.as_millis(tb), 16);
    }

    #[test]
    fn backwards_clock_saturates_to_zero() {
        let start = HostTime(10_000);
        assert_eq!(HostTime(4_000) - start, Duration::ZERO);
        assert_eq!(HostTime(12_500) - start, Duration(2_500));
    }

    #[test]
    fn host_time_addition_saturates() {
        assert_eq!(HostTime(u64::MAX) + Duration(1), HostTime(u64::MAX));
        assert_eq!(HostTime(u64::MAX).checked_add(Duration(1)), None);
        assert_eq!(HostTime(1).checked_add(Duration(2)), Some(HostTime(3)));
    }

    #[test]
    fn large_tick_values_do_not_overflow() {
        let tb = Timebase::new(125, 3);
        let _nanos = tb.ticks_to_nanos(u64::MAX / 2);
        let _secs = tb.ticks_to_secs(u64::MAX / 2);
    }
}
