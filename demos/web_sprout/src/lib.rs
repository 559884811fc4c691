// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growing-plant focus timer in the browser.
//!
//! Builds the timer page (duration picker, countdown panel, plant video),
//! then hands it to [`sprout_backend_web::mount`]. The video is scrubbed to
//! the countdown's progress on every animation frame, so the plant is fully
//! grown exactly when the time is up.
//!
//! Append `?trace` to the URL to log controller events to the console and
//! show a scrub-drift HUD under the video.
//!
//! Build with: `wasm-pack build --target web demos/web_sprout`
//! Then serve `demos/web_sprout/` (with a `sunflower.mp4` next to
//! `index.html`) and open `index.html`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;

use sprout_backend_web::{ConsoleSink, SharedTimer, ids};
use sprout_core::config::TimerConfig;
use sprout_core::time::Timebase;
use sprout_core::trace::{
    FinishEvent, RejectedStartEvent, ResetEvent, SessionBeginEvent, SessionStartEvent,
    StaleCallbackEvent, StopEvent, TickEvent, TraceSink,
};
use sprout_sync_harness::{DriftTracker, SeekPrecision};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlVideoElement};

const VIDEO_URL: &str = "sunflower.mp4";
const DRIFT_HISTORY: usize = 60;

/// Entry point for the web demo.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let page = build_page(&document)?;
    body.append_child(&page.shell)?;

    let traced = window
        .location()
        .search()
        .is_ok_and(|query| query.contains("trace"));

    let config = TimerConfig::web();
    let timer = sprout_backend_web::mount_in(window, &document, config)?;
    if traced {
        install_probe(&timer, page.video, page.hud, config.timebase);
    }

    // The page lives as long as the document does.
    core::mem::forget(timer);
    Ok(())
}

struct Page {
    shell: HtmlElement,
    video: HtmlVideoElement,
    hud: HtmlElement,
}

fn build_page(doc: &Document) -> Result<Page, JsValue> {
    let shell = element(doc, "section")?;
    style(
        &shell,
        "width: 420px; padding: 28px; border-radius: 22px; background: rgba(255,255,255,0.86); box-shadow: 0 24px 60px rgba(40,60,30,0.2); display: grid; gap: 16px; justify-items: center; text-align: center;",
    )?;

    let title = element(doc, "h1")?;
    title.set_text_content(Some("Grow a Sunflower"));
    style(&title, "margin: 0; font-size: 24px; color: #2f4a25;")?;
    shell.append_child(&title)?;

    // -- visuals -----------------------------------------------------------
    let coffee = element(doc, "div")?;
    coffee.set_id(ids::COFFEE_VISUAL);
    coffee.set_text_content(Some("☕"));
    style(&coffee, "font-size: 96px; line-height: 1;")?;
    shell.append_child(&coffee)?;

    let plant = element(doc, "div")?;
    plant.set_id(ids::PLANT_VISUAL_CONTAINER);
    style(
        &plant,
        "display: none; width: 320px; height: 320px; border-radius: 16px; overflow: hidden;",
    )?;
    let video: HtmlVideoElement = doc.create_element("video")?.unchecked_into();
    video.set_id(ids::PLANT_VIDEO);
    video.set_src(VIDEO_URL);
    video.set_controls(false);
    video.set_muted(true);
    video.set_autoplay(false);
    video.set_preload("auto");
    video.set_attribute("playsinline", "")?;
    style(&video, "width: 100%; height: 100%; object-fit: cover;")?;
    plant.append_child(&video)?;
    shell.append_child(&plant)?;

    let stage = element(doc, "div")?;
    stage.set_id(ids::SPROUT_STATUS);
    stage.set_text_content(Some(sprout_core::present::IDLE_STAGE_LABEL));
    style(&stage, "font-weight: 600; color: #3d6b2c;")?;
    shell.append_child(&stage)?;

    // -- duration picker ---------------------------------------------------
    let selection = element(doc, "div")?;
    selection.set_id(ids::SELECTION_STATE);
    style(&selection, "display: flex; gap: 10px; align-items: center;")?;
    let minutes: HtmlInputElement = doc.create_element("input")?.unchecked_into();
    minutes.set_id(ids::CUSTOM_MINUTES);
    minutes.set_type("number");
    minutes.set_min("1");
    minutes.set_placeholder("Minutes");
    style(
        &minutes,
        "width: 110px; padding: 8px 10px; border-radius: 10px; border: 1px solid #b9c9ad;",
    )?;
    selection.append_child(&minutes)?;
    let start = button(doc, ids::START_BUTTON, "Start growing", "#3d6b2c")?;
    selection.append_child(&start)?;
    shell.append_child(&selection)?;

    // -- countdown panel ---------------------------------------------------
    let running = element(doc, "div")?;
    running.set_id(ids::RUNNING_STATE);
    style(&running, "display: none; width: 100%;")?;

    let time = element(doc, "div")?;
    time.set_id(ids::TIME_DISPLAY);
    style(
        &time,
        "font: 600 40px/1.2 ui-monospace, SFMono-Regular, Menlo, monospace; color: #2f4a25;",
    )?;
    running.append_child(&time)?;

    let track = element(doc, "div")?;
    style(
        &track,
        "height: 10px; margin: 12px 0; border-radius: 999px; background: rgba(47,74,37,0.15); overflow: hidden;",
    )?;
    let bar = element(doc, "div")?;
    bar.set_id(ids::PROGRESS_BAR);
    style(
        &bar,
        "width: 0%; height: 100%; background: linear-gradient(90deg, #7cb342, #fbc02d);",
    )?;
    track.append_child(&bar)?;
    running.append_child(&track)?;

    let status = element(doc, "div")?;
    status.set_id(ids::STATUS_TEXT);
    style(&status, "margin-bottom: 12px; color: #4d5d44;")?;
    running.append_child(&status)?;

    let stop = button(doc, ids::STOP_BUTTON, "Give up", "#a0522d")?;
    running.append_child(&stop)?;
    shell.append_child(&running)?;

    let hud = element(doc, "pre")?;
    style(
        &hud,
        "margin: 0; min-height: 1.2em; font: 11px/1.3 ui-monospace, SFMono-Regular, Menlo, monospace; color: #6b7b62;",
    )?;
    shell.append_child(&hud)?;

    Ok(Page { shell, video, hud })
}

/// Logs events to the console and grades how closely the video follows the
/// requested scrub position.
struct DriftProbe {
    console: ConsoleSink,
    video: HtmlVideoElement,
    hud: HtmlElement,
    timebase: Timebase,
    drift: DriftTracker<DRIFT_HISTORY>,
}

impl TraceSink for DriftProbe {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        self.console.on_session_start(e);
    }

    fn on_session_begin(&mut self, e: &SessionBeginEvent) {
        self.console.on_session_begin(e);
    }

    fn on_tick(&mut self, e: &TickEvent) {
        self.console.on_tick(e);
        let report = self
            .drift
            .observe_tick(e, self.video.current_time(), self.timebase);
        self.hud.set_text_content(Some(&format!(
            "scrub {} | drift {:+.1}ms | max {:.1}ms | misses {}/{}\n[{}]",
            report.grade.as_str(),
            report.drift_ms,
            report.max_abs_drift_ms,
            report.missed_frames,
            report.total_frames,
            self.drift.sparkline_ascii(8.0, 50.0),
        )));
    }

    fn on_finish(&mut self, e: &FinishEvent) {
        self.console.on_finish(e);
    }

    fn on_stop(&mut self, e: &StopEvent) {
        self.console.on_stop(e);
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        self.console.on_reset(e);
        self.drift.end_session();
    }

    fn on_stale_callback(&mut self, e: &StaleCallbackEvent) {
        self.console.on_stale_callback(e);
    }

    fn on_rejected_start(&mut self, e: &RejectedStartEvent) {
        self.console.on_rejected_start(e);
    }
}

fn install_probe(timer: &SharedTimer, video: HtmlVideoElement, hud: HtmlElement, tb: Timebase) {
    let probe = DriftProbe {
        console: ConsoleSink::new(tb),
        video,
        hud,
        timebase: tb,
        drift: DriftTracker::new(16.67, SeekPrecision::FrameSnapped),
    };
    timer
        .borrow_mut()
        .set_trace_sink(Box::new(probe));
}

fn button(doc: &Document, id: &str, label: &str, color: &str) -> Result<HtmlButtonElement, JsValue> {
    let button: HtmlButtonElement = doc.create_element("button")?.unchecked_into();
    button.set_id(id);
    button.set_text_content(Some(label));
    style(
        &button,
        &format!(
            "border: 0; border-radius: 999px; padding: 9px 18px; background: {color}; color: #fff; font-weight: 600; cursor: pointer;"
        ),
    )?;
    Ok(button)
}

fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

fn style(el: &web_sys::Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}
