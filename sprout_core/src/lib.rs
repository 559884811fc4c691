// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer engine and presentation adapter for frame-synchronized growth
//! timers.
//!
//! `sprout_core` turns monotonic clock readings into a countdown, a progress
//! ratio, and a video scrub position. It is `no_std` compatible (with
//! `alloc`) and talks to its platform only through the traits in
//! [`backend`].
//!
//! # Architecture
//!
//! ```text
//!   Backend (frame scheduler)
//!       │ on_frame(handle, FrameTick)
//!       ▼
//!   SproutTimer ──► TimerEngine::tick(now) ──► TickSample
//!       │                                         │
//!       │              ┌──────────────────────────┘
//!       │              ▼
//!       │   PresentationAdapter::present ──► Surface + MediaAsset
//!       ▼
//!   request_frame / schedule_delay ──► Backend
//! ```
//!
//! **[`engine`]**: the three-state machine (Idle, Running, Finished) and
//! the single owned [`TimerSession`](session::TimerSession). Pure function
//! of timestamps; no display or scheduling knowledge.
//!
//! **[`present`]**: countdown formatting, growth stages, scrub positions,
//! and the adapter that writes them to the outputs.
//!
//! **[`controller`]**: [`SproutTimer`](controller::SproutTimer), which owns
//! the pending frame and delay handles and drops stale callbacks.
//!
//! **[`backend`]**: the host contract that platform crates implement.
//!
//! **[`sim`]**: a deterministic host for tests and offline runs.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) hooks for controller
//! events, compiled away unless the `trace` feature is on.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod controller;
pub mod engine;
pub mod present;
pub mod session;
pub mod sim;
pub mod time;
pub mod timing;
pub mod trace;
