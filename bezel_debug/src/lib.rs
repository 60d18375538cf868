// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for primitive-list construction.
//!
//! This crate provides [`TraceSink`](bezel_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] writes one human-readable line per event.
//! - [`recorder::RecorderSink`] keeps every event in memory.
//! - [`chrome::export`] turns a recording into Chrome Trace Event Format
//!   JSON.

pub mod chrome;
pub mod pretty;
pub mod recorder;
