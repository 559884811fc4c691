// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM surface.
//!
//! [`DomSurface`] resolves the timer widgets by element id once, at mount
//! time, and implements [`Surface`] by writing text content and inline
//! styles. Per-frame writes ignore DOM errors.

use alloc::format;

use sprout_core::backend::Surface;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement, HtmlInputElement};

/// Element ids the surface and the controls bind to.
pub mod ids {
    /// Container of the duration picker, shown while Idle.
    pub const SELECTION_STATE: &str = "selection-state";
    /// Container of the countdown panel, shown while a session is active.
    pub const RUNNING_STATE: &str = "running-state";
    /// Countdown text.
    pub const TIME_DISPLAY: &str = "time-display";
    /// Progress bar fill; its width is set in percent.
    pub const PROGRESS_BAR: &str = "progress-bar";
    /// Status line.
    pub const STATUS_TEXT: &str = "status-text";
    /// Growth-stage label.
    pub const SPROUT_STATUS: &str = "sprout-status";
    /// Minutes input field.
    pub const CUSTOM_MINUTES: &str = "custom-minutes";
    /// Visual shown while Idle.
    pub const COFFEE_VISUAL: &str = "coffee-visual";
    /// Container of the plant video, shown while a session is active.
    pub const PLANT_VISUAL_CONTAINER: &str = "plant-visual-container";
    /// The growing-plant `<video>`.
    pub const PLANT_VIDEO: &str = "plant-video";
    /// Start button.
    pub const START_BUTTON: &str = "start-button";
    /// Stop button.
    pub const STOP_BUTTON: &str = "stop-button";
}

/// Looks up `id` in `document` and casts it to `T`.
///
/// Fails with a descriptive `JsValue` if the element is missing or has the
/// wrong type.
pub fn lookup<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has an unexpected type")))
}

/// The timer widgets as live DOM elements.
pub struct DomSurface {
    selection_state: HtmlElement,
    running_state: HtmlElement,
    time_display: HtmlElement,
    progress_bar: HtmlElement,
    status_text: HtmlElement,
    sprout_status: HtmlElement,
    custom_minutes: HtmlInputElement,
    coffee_visual: HtmlElement,
    plant_visual_container: HtmlElement,
}

impl core::fmt::Debug for DomSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomSurface")
            .field("countdown", &self.time_display.text_content())
            .field("stage", &self.sprout_status.text_content())
            .finish_non_exhaustive()
    }
}

impl DomSurface {
    /// Resolves every widget in `document`.
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            selection_state: lookup(document, ids::SELECTION_STATE)?,
            running_state: lookup(document, ids::RUNNING_STATE)?,
            time_display: lookup(document, ids::TIME_DISPLAY)?,
            progress_bar: lookup(document, ids::PROGRESS_BAR)?,
            status_text: lookup(document, ids::STATUS_TEXT)?,
            sprout_status: lookup(document, ids::SPROUT_STATUS)?,
            custom_minutes: lookup(document, ids::CUSTOM_MINUTES)?,
            coffee_visual: lookup(document, ids::COFFEE_VISUAL)?,
            plant_visual_container: lookup(document, ids::PLANT_VISUAL_CONTAINER)?,
        })
    }

    /// Returns the current text of the minutes field.
    #[must_use]
    pub fn input_value(&self) -> alloc::string::String {
        self.custom_minutes.value()
    }
}

fn set_display(el: &HtmlElement, visible: bool) {
    let value = if visible { "block" } else { "none" };
    let _ = el.style().set_property("display", value);
}

impl Surface for DomSurface {
    fn show_running(&mut self, running: bool) {
        set_display(&self.coffee_visual, !running);
        set_display(&self.plant_visual_container, running);
        set_display(&self.selection_state, !running);
        set_display(&self.running_state, running);
    }

    fn set_countdown(&mut self, text: &str) {
        self.time_display.set_text_content(Some(text));
    }

    fn set_progress_percent(&mut self, percent: f64) {
        let _ = self
            .progress_bar
            .style()
            .set_property("width", &format!("{percent}%"));
    }

    fn set_stage(&mut self, label: &str) {
        self.sprout_status.set_text_content(Some(label));
    }

    fn set_status(&mut self, text: &str) {
        self.status_text.set_text_content(Some(text));
    }

    fn clear_input(&mut self) {
        self.custom_minutes.set_value("");
    }
}
