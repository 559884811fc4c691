// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer sessions and duration input.

use core::fmt;

use crate::time::{HostTime, Timebase};
use crate::timing::{TickSample, sample_at};

/// Generation number identifying one started session.
///
/// Every deferred callback (frame, delay, media-ready) is checked against the
/// live session's id, so a callback left over from a stopped session is
/// dropped instead of driving the new one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(pub u64);

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

/// Errors from starting a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartError {
    /// The duration was zero, negative, or not a number.
    InvalidDuration,
    /// A session is already running or finishing.
    AlreadyActive,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDuration => f.write_str("Please enter a valid number of minutes."),
            Self::AlreadyActive => f.write_str("A timer is already running."),
        }
    }
}

impl core::error::Error for StartError {}

/// Parses the minutes field the way a browser `parseInt` reads it.
///
/// Leading whitespace and a single sign are accepted, then as many decimal
/// digits as follow; anything after the digits is ignored (`"12.5"` is 12,
/// `"7min"` is 7). Values that do not start with a digit, and values that
/// are zero or negative, are rejected. Very large values saturate.
pub fn parse_minutes(text: &str) -> Result<u32, StartError> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: u32 = 0;
    let mut digits = 0_usize;
    for b in rest.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
        digits += 1;
    }

    if digits == 0 || negative || value == 0 {
        return Err(StartError::InvalidDuration);
    }
    Ok(value)
}

/// One countdown run.
///
/// The session stores only its total length and the anchor it measures from.
/// Progress and seconds-left are derived on every tick from `now - start`.
#[derive(Clone, Copy, Debug)]
pub struct TimerSession {
    id: SessionId,
    total_secs: u64,
    start: HostTime,
    last: TickSample,
}

impl TimerSession {
    pub(crate) fn new(id: SessionId, minutes: u32, now: HostTime) -> Self {
        let total_secs = u64::from(minutes) * 60;
        Self {
            id,
            total_secs,
            start: now,
            last: TickSample::initial(total_secs),
        }
    }

    /// Returns this session's generation id.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the configured length in whole seconds.
    #[must_use]
    pub const fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// Returns the anchor timestamp elapsed time is measured from.
    #[must_use]
    pub const fn start(&self) -> HostTime {
        self.start
    }

    /// Returns the most recent sample (the initial sample before any tick).
    #[must_use]
    pub const fn last_sample(&self) -> TickSample {
        self.last
    }

    /// Moves the anchor to `now` and forgets earlier samples.
    pub(crate) fn anchor(&mut self, now: HostTime) {
        self.start = now;
        self.last = TickSample::initial(self.total_secs);
    }

    /// Samples the session at `now`.
    ///
    /// A `now` that would move progress backwards (an out-of-order timestamp)
    /// returns the previous sample instead.
    pub(crate) fn sample(&mut self, now: HostTime, timebase: Timebase) -> TickSample {
        let next = sample_at(self.total_secs, self.start, now, timebase);
        if next.progress >= self.last.progress {
            self.last = next;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integers() {
        assert_eq!(parse_minutes("25"), Ok(25));
        assert_eq!(parse_minutes("  5"), Ok(5));
        assert_eq!(parse_minutes("+3"), Ok(3));
    }

    #[test]
    fn parses_integer_prefix() {
        assert_eq!(parse_minutes("12.5"), Ok(12));
        assert_eq!(parse_minutes("7min"), Ok(7));
        assert_eq!(parse_minutes("007"), Ok(7));
    }

    #[test]
    fn rejects_non_positive_and_non_numeric() {
        for bad in ["", "   ", "abc", "0", "-3", "-0", "+", ".5", "min7"] {
            assert_eq!(parse_minutes(bad), Err(StartError::InvalidDuration), "{bad:?}");
        }
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(parse_minutes("99999999999999999999"), Ok(u32::MAX));
    }

    #[test]
    fn session_never_moves_backwards() {
        let tb = Timebase::MICROS;
        let mut s = TimerSession::new(SessionId(1), 1, HostTime(0));
        let later = s.sample(HostTime(30_000_000), tb);
        assert_eq!(later.seconds_left, 30);
        let earlier = s.sample(HostTime(10_000_000), tb);
        assert_eq!(earlier, later);
    }

    #[test]
    fn anchor_restarts_measurement() {
        let tb = Timebase::MICROS;
        let mut s = TimerSession::new(SessionId(1), 2, HostTime(0));
        s.anchor(HostTime(4_000_000));
        assert_eq!(s.start(), HostTime(4_000_000));
        let sample = s.sample(HostTime(4_000_000), tb);
        assert_eq!(sample, TickSample::initial(120));
    }

    #[test]
    fn start_error_messages() {
        use alloc::string::ToString as _;
        assert_eq!(
            StartError::InvalidDuration.to_string(),
            "Please enter a valid number of minutes."
        );
    }
}
