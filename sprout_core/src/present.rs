// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation adapter.
//!
//! Projects engine output onto a [`Surface`] and a [`MediaAsset`]. The
//! adapter only reads [`TickSample`]s; it never writes session state.
//!
//! The video is scrubbed to the computed position on every tick, so the
//! animation never free-runs ahead of or behind the countdown.

use alloc::format;
use alloc::string::String;

use crate::backend::{MediaAsset, Surface};
use crate::timing::TickSample;

/// Stage label shown while idle, before any session has grown.
pub const IDLE_STAGE_LABEL: &str = "Small Sprout 🌱";

/// Countdown text shown once a session completes.
pub const FINISHED_COUNTDOWN: &str = "FINISHED!";

/// Discrete growth stage derived from progress bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrowthStage {
    /// Progress in `[0, 0.25)`.
    Seedling,
    /// Progress in `[0.25, 0.75)`.
    Sprout,
    /// Progress in `[0.75, 1)`.
    Budding,
    /// Progress at 1.
    FullyGrown,
}

impl GrowthStage {
    /// Returns the stage for `progress`.
    #[must_use]
    pub fn from_progress(progress: f64) -> Self {
        if progress < 0.25 {
            Self::Seedling
        } else if progress < 0.75 {
            Self::Sprout
        } else if progress < 1.0 {
            Self::Budding
        } else {
            Self::FullyGrown
        }
    }

    /// Returns the short lowercase stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Seedling => "seedling",
            Self::Sprout => "sprout",
            Self::Budding => "budding",
            Self::FullyGrown => "fully grown",
        }
    }

    /// Returns the label written to the surface.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Seedling => "Small Seedling 🌱",
            Self::Sprout => "Growing Sprout 🌿",
            Self::Budding => "Budding Plant 🌼",
            Self::FullyGrown => "Fully Grown! 🎉",
        }
    }
}

/// Formats whole seconds as `m:ss`.
///
/// Minutes are not padded and not wrapped into hours: `3600` is `"60:00"`.
#[must_use]
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// How the video position relates to the countdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrubMode {
    /// `progress * media_duration`: the whole clip plays over the whole
    /// countdown regardless of their lengths.
    #[default]
    MediaDuration,
    /// The clip plays at real speed from the start of the countdown and
    /// holds its last frame if the countdown is longer.
    CountdownClamped,
}

/// Returns the scrub position for a sample, or `None` when the asset's
/// duration is unknown, zero, or not finite.
#[must_use]
pub fn scrub_position(
    mode: ScrubMode,
    sample: &TickSample,
    total_secs: u64,
    media_duration: Option<f64>,
) -> Option<f64> {
    let duration = media_duration.filter(|d| d.is_finite() && *d > 0.0)?;
    let position = match mode {
        ScrubMode::MediaDuration => sample.progress * duration,
        ScrubMode::CountdownClamped => (sample.progress * total_secs as f64).min(duration),
    };
    Some(position)
}

/// Everything written to the outputs for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameView {
    /// Countdown text, e.g. `"2:05 left"`.
    pub countdown: String,
    /// Progress bar fill in percent.
    pub progress_percent: f64,
    /// Growth stage for this progress.
    pub stage: GrowthStage,
    /// Video position to seek to, if scrubbing is possible this tick.
    pub scrub: Option<f64>,
}

/// Maps engine output onto the surface and the media asset.
#[derive(Clone, Debug)]
pub struct PresentationAdapter {
    scrub_mode: ScrubMode,
    running_status: String,
    finished_status: String,
}

impl PresentationAdapter {
    /// Creates an adapter that names `plant_name` in its status lines.
    #[must_use]
    pub fn new(plant_name: &str, scrub_mode: ScrubMode) -> Self {
        let plant = plant_name.to_lowercase();
        Self {
            scrub_mode,
            running_status: format!("Growing your {plant}... 🌿"),
            finished_status: format!("✨ Your {plant} is fully grown! 🌸"),
        }
    }

    /// Returns the configured scrub mode.
    #[must_use]
    pub const fn scrub_mode(&self) -> ScrubMode {
        self.scrub_mode
    }

    /// Returns the status line shown while running.
    #[must_use]
    pub fn running_status(&self) -> &str {
        &self.running_status
    }

    /// Returns the status line shown once finished.
    #[must_use]
    pub fn finished_status(&self) -> &str {
        &self.finished_status
    }

    /// Derives the view for one sample without touching any output.
    #[must_use]
    pub fn view(
        &self,
        sample: &TickSample,
        total_secs: u64,
        media_duration: Option<f64>,
    ) -> FrameView {
        FrameView {
            countdown: format!("{} left", format_time(sample.seconds_left)),
            progress_percent: sample.progress * 100.0,
            stage: GrowthStage::from_progress(sample.progress),
            scrub: scrub_position(self.scrub_mode, sample, total_secs, media_duration),
        }
    }

    /// Switches to the running layout and shows the session's first frame.
    pub fn show_started(&self, total_secs: u64, surface: &mut impl Surface) {
        surface.show_running(true);
        surface.set_status(&self.running_status);
        let view = self.view(&TickSample::initial(total_secs), total_secs, None);
        write_view(&view, surface);
    }

    /// Rewinds the asset and starts it at normal speed.
    pub fn start_media(&self, media: &mut impl MediaAsset) {
        media.seek(0.0);
        media.set_playback_rate(1.0);
        media.play();
    }

    /// Writes one tick to the outputs. Returns the scrub position applied,
    /// or `None` if scrubbing was skipped.
    pub fn present(
        &self,
        sample: &TickSample,
        total_secs: u64,
        surface: &mut impl Surface,
        media: &mut impl MediaAsset,
    ) -> Option<f64> {
        let view = self.view(sample, total_secs, media.duration());
        write_view(&view, surface);
        if let Some(position) = view.scrub {
            media.seek(position);
        }
        view.scrub
    }

    /// Shows the terminal state and freezes the animation.
    pub fn show_finished(&self, surface: &mut impl Surface, media: &mut impl MediaAsset) {
        surface.set_status(&self.finished_status);
        surface.set_countdown(FINISHED_COUNTDOWN);
        surface.set_progress_percent(100.0);
        surface.set_stage(GrowthStage::FullyGrown.label());
        media.pause();
    }

    /// Returns every output to the pre-start baseline.
    pub fn show_idle(&self, surface: &mut impl Surface, media: &mut impl MediaAsset) {
        surface.show_running(false);
        media.pause();
        media.seek(0.0);
        media.set_playback_rate(1.0);
        surface.set_countdown("");
        surface.set_progress_percent(0.0);
        surface.set_stage(IDLE_STAGE_LABEL);
        surface.set_status("");
        surface.clear_input();
    }
}

fn write_view(view: &FrameView, surface: &mut impl Surface) {
    surface.set_countdown(&view.countdown);
    surface.set_progress_percent(view.progress_percent);
    surface.set_stage(view.stage.label());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(progress: f64, seconds_left: u64) -> TickSample {
        TickSample {
            progress,
            seconds_left,
        }
    }

    #[test]
    fn format_time_examples() {
        assert_eq!(format_time(125), "2:05");
        assert_eq!(format_time(59), "0:59");
        assert_eq!(format_time(3600), "60:00");
        assert_eq!(format_time(0), "0:00");
    }

    #[test]
    fn stage_bands() {
        assert_eq!(GrowthStage::from_progress(0.0), GrowthStage::Seedling);
        assert_eq!(GrowthStage::from_progress(0.249), GrowthStage::Seedling);
        assert_eq!(GrowthStage::from_progress(0.25), GrowthStage::Sprout);
        assert_eq!(GrowthStage::from_progress(0.5), GrowthStage::Sprout);
        assert_eq!(GrowthStage::from_progress(0.75), GrowthStage::Budding);
        assert_eq!(GrowthStage::from_progress(0.999), GrowthStage::Budding);
        assert_eq!(GrowthStage::from_progress(1.0), GrowthStage::FullyGrown);
        assert_eq!(GrowthStage::Sprout.name(), "sprout");
        assert_eq!(GrowthStage::FullyGrown.name(), "fully grown");
    }

    #[test]
    fn view_for_half_way() {
        let adapter = PresentationAdapter::new("Sunflower", ScrubMode::MediaDuration);
        let view = adapter.view(&sample(0.5, 30), 60, Some(12.0));
        assert_eq!(view.countdown, "0:30 left");
        assert!((view.progress_percent - 50.0).abs() < 1e-12);
        assert_eq!(view.stage, GrowthStage::Sprout);
        assert_eq!(view.scrub, Some(6.0));
    }

    #[test]
    fn scrub_skipped_without_usable_duration() {
        let s = sample(0.5, 30);
        for d in [None, Some(0.0), Some(f64::NAN), Some(f64::INFINITY)] {
            assert_eq!(scrub_position(ScrubMode::MediaDuration, &s, 60, d), None);
        }
    }

    #[test]
    fn countdown_clamped_scrub_holds_last_frame() {
        let s = sample(0.5, 30);
        assert_eq!(
            scrub_position(ScrubMode::CountdownClamped, &s, 60, Some(100.0)),
            Some(30.0)
        );
        assert_eq!(
            scrub_position(ScrubMode::CountdownClamped, &s, 60, Some(10.0)),
            Some(10.0)
        );
    }

    #[test]
    fn status_lines_use_lowercase_plant_name() {
        let adapter = PresentationAdapter::new("Sunflower", ScrubMode::default());
        assert_eq!(adapter.running_status(), "Growing your sunflower... 🌿");
        assert_eq!(
            adapter.finished_status(),
            "✨ Your sunflower is fully grown! 🌸"
        );
    }

    #[test]
    fn show_idle_clears_derived_fields() {
        use crate::sim::{SimMedia, SimSurface};

        let adapter = PresentationAdapter::new("Sunflower", ScrubMode::default());
        let mut surface = SimSurface::default();
        let mut media = SimMedia::ready(12.0);
        assert_eq!(
            adapter.present(&sample(0.5, 30), 60, &mut surface, &mut media),
            Some(6.0)
        );
        adapter.show_finished(&mut surface, &mut media);

        adapter.show_idle(&mut surface, &mut media);
        assert_eq!(surface.countdown, "");
        assert_eq!(surface.progress_percent, 0.0);
        assert_eq!(surface.status, "");
        assert_eq!(surface.stage, IDLE_STAGE_LABEL);
        assert_eq!(surface.input_clears, 1);
        assert_eq!(media.current_time, 0.0);
    }
}
