// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer configuration and per-backend presets.

use crate::present::ScrubMode;
use crate::time::{Duration, Timebase};

/// Configuration for a [`SproutTimer`](crate::controller::SproutTimer).
#[derive(Clone, Copy, Debug)]
pub struct TimerConfig {
    /// Tick units of the host clock and frame timestamps.
    pub timebase: Timebase,
    /// How long the Finished state is shown before returning to Idle.
    pub finish_hold: Duration,
    /// Plant named in the status lines.
    pub plant_name: &'static str,
    /// How the video position tracks the countdown.
    pub scrub_mode: ScrubMode,
    /// Question asked before a running session is stopped.
    pub stop_prompt: &'static str,
    /// Message shown when the minutes input is rejected.
    pub invalid_input_message: &'static str,
}

impl TimerConfig {
    /// Default configuration for the browser (microsecond ticks from
    /// `performance.now()`).
    #[must_use]
    pub const fn web() -> Self {
        Self::with_timebase(Timebase::MICROS)
    }

    /// Default configuration for headless hosts such as the simulator
    /// (nanosecond ticks).
    #[must_use]
    pub const fn headless() -> Self {
        Self::with_timebase(Timebase::NANOS)
    }

    const fn with_timebase(timebase: Timebase) -> Self {
        Self {
            timebase,
            finish_hold: Duration::from_secs(5, timebase),
            plant_name: "Sunflower",
            scrub_mode: ScrubMode::MediaDuration,
            stop_prompt: "Are you sure you want to stop? Your plant will wither.",
            invalid_input_message: "Please enter a valid number of minutes.",
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::web()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_hold_for_five_seconds() {
        let web = TimerConfig::web();
        assert_eq!(web.finish_hold.as_millis(web.timebase), 5_000);
        let headless = TimerConfig::headless();
        assert_eq!(headless.finish_hold.as_millis(headless.timebase), 5_000);
        assert_eq!(headless.finish_hold.ticks(), 5_000_000_000);
    }
}
