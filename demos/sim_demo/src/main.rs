// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated sessions that exercise the controller, tracing, and drift
//! pipeline without a browser.
//!
//! Drives a [`SproutTimer`] on a [`SimHost`] through a rejected start, a
//! session that waits for media and runs to completion, and a session that
//! survives a declined stop and a suspended tab before being stopped. Events
//! go to a [`PrettyPrintSink`] on stdout and to a [`RecorderSink`], which is
//! exported as Chrome trace JSON at the end.
//!
//! Usage: `sim_demo [trace.json]`

use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use sprout_core::config::TimerConfig;
use sprout_core::controller::SproutTimer;
use sprout_core::sim::{SimHost, SimMedia};
use sprout_core::time::{Duration, Timebase};
use sprout_core::trace::{
    FinishEvent, RejectedStartEvent, ResetEvent, SessionBeginEvent, SessionStartEvent,
    StaleCallbackEvent, StopEvent, TickEvent, TraceSink,
};
use sprout_debug::pretty::PrettyPrintSink;
use sprout_debug::recorder::RecorderSink;
use sprout_debug::shared::SharedSink;
use sprout_sync_harness::{DriftReport, DriftTracker, SeekPrecision};

/// 16.6ms refresh interval in nanoseconds (≈60 Hz).
const REFRESH_INTERVAL_NS: u64 = 16_666_667;
const REFRESH: Duration = Duration(REFRESH_INTERVAL_NS);
const VIDEO_SECONDS: f64 = 12.0;
const DRIFT_HISTORY: usize = 48;

/// Forwards every event to each of its sinks in turn.
struct Fanout {
    sinks: Vec<Box<dyn TraceSink>>,
    last_tick: Rc<RefCell<Option<TickEvent>>>,
}

impl TraceSink for Fanout {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_session_start(e));
    }

    fn on_session_begin(&mut self, e: &SessionBeginEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_session_begin(e));
    }

    fn on_tick(&mut self, e: &TickEvent) {
        *self.last_tick.borrow_mut() = Some(*e);
        self.sinks.iter_mut().for_each(|s| s.on_tick(e));
    }

    fn on_finish(&mut self, e: &FinishEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_finish(e));
    }

    fn on_stop(&mut self, e: &StopEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_stop(e));
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_reset(e));
    }

    fn on_stale_callback(&mut self, e: &StaleCallbackEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_stale_callback(e));
    }

    fn on_rejected_start(&mut self, e: &RejectedStartEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_rejected_start(e));
    }
}

struct Demo {
    timer: SproutTimer<SimHost>,
    last_tick: Rc<RefCell<Option<TickEvent>>>,
    drift: DriftTracker<DRIFT_HISTORY>,
    report: Option<DriftReport>,
}

impl Demo {
    /// Runs `span` one refresh at a time, grading the scrub after each frame.
    fn run_for(&mut self, span: Duration) {
        let timebase = self.timer.config().timebase;
        let mut elapsed = Duration::ZERO;
        while elapsed < span {
            self.timer.advance(REFRESH, REFRESH);
            elapsed = elapsed + REFRESH;
            self.observe(timebase);
        }
    }

    fn suspend_for(&mut self, gap: Duration) {
        self.timer.suspend_for(gap);
        self.observe(self.timer.config().timebase);
    }

    fn observe(&mut self, timebase: Timebase) {
        if let Some(tick) = self.last_tick.borrow_mut().take() {
            let observed = self.timer.host().media.current_time;
            self.report = Some(self.drift.observe_tick(&tick, observed, timebase));
        }
    }

    fn print_drift(&mut self, label: &str) {
        if let Some(r) = self.report.take() {
            println!(
                "== {label}: grade {} | frames {} | misses {} ({:.1}/1000) | max drift {:.3}ms",
                r.grade.as_str(),
                r.total_frames,
                r.missed_frames,
                r.miss_rate_per_1000,
                r.max_abs_drift_ms,
            );
            println!("   frame deltas [{}]", self.drift.sparkline_ascii(10.0, 50.0));
        }
        self.drift.end_session();
    }
}

fn main() {
    let config = TimerConfig::headless();
    let timebase = config.timebase;

    // -- sinks -------------------------------------------------------------
    let pretty = PrettyPrintSink::new(Box::new(std::io::stdout()), timebase).every_nth_tick(120);
    let recorder = SharedSink::new(RecorderSink::new());
    let last_tick = Rc::new(RefCell::new(None));

    let mut timer = SproutTimer::new(config, SimHost::new(SimMedia::loading()));
    timer.set_trace_sink(Box::new(Fanout {
        sinks: vec![Box::new(pretty), Box::new(recorder.clone())],
        last_tick: Rc::clone(&last_tick),
    }));
    timer.initialize();

    let mut demo = Demo {
        timer,
        last_tick,
        drift: DriftTracker::new(16.67, SeekPrecision::Exact),
        report: None,
    };

    // -- 1. rejected input -------------------------------------------------
    let _ = demo.timer.start_from_input("soon");
    println!("alerts: {:?}", demo.timer.host().alerts);

    // -- 2. one minute, media arrives late ---------------------------------
    demo.timer
        .start_from_input("1")
        .expect("idle timer accepts a valid start");
    demo.run_for(Duration::from_millis(500, timebase));
    demo.timer.load_media(VIDEO_SECONDS);
    demo.run_for(Duration::from_secs(60, timebase));
    println!(
        "state after run: {:?}, countdown {:?}",
        demo.timer.state(),
        demo.timer.host().surface.countdown
    );
    demo.print_drift("session 1");
    demo.run_for(config.finish_hold);
    println!("state after hold: {:?}", demo.timer.state());

    // -- 3. two minutes, declined stop, suspended tab, stop ----------------
    demo.timer
        .start(2)
        .expect("timer is idle after the finish hold");
    demo.run_for(Duration::from_secs(30, timebase));
    demo.timer.host_mut().confirm_answer = false;
    demo.timer.request_stop();
    demo.suspend_for(Duration::from_secs(20, timebase));
    demo.run_for(Duration::from_secs(1, timebase));
    demo.print_drift("session 2");
    demo.timer.host_mut().confirm_answer = true;
    demo.timer.request_stop();
    println!(
        "state after stop: {:?}, stage {:?}",
        demo.timer.state(),
        demo.timer.host().surface.stage
    );

    // -- export Chrome trace -----------------------------------------------
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sprout-trace.json".to_string());
    let file = File::create(&path).expect("failed to create trace file");
    let mut writer = BufWriter::new(file);
    sprout_debug::chrome::export(recorder.borrow().as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path}");
}
