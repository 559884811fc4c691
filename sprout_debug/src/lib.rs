// Copyright 2026 the Sprout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for sprout
//! diagnostics.
//!
//! This crate provides [`TraceSink`](sprout_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from
//!   recorded bytes.
//! - [`shared::SharedSink`]: lets a caller keep reading a sink after handing
//!   it to a timer.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod shared;
