// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use bezel_core::trace::{FrameBeginEvent, FrameEndEvent, LayerEvent, OptimizeEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:begin] frame={} size={}x{} slot={}",
            e.frame_index, e.width, e.height, e.ring_slot,
        );
    }

    fn on_layer(&mut self, e: &LayerEvent) {
        if !e.enabled {
            let _ = writeln!(
                self.writer,
                "[layer] frame={} {} disabled",
                e.frame_index, e.layer,
            );
            return;
        }
        let _ = writeln!(
            self.writer,
            "[layer] frame={} {} blend={:?} primitives={}",
            e.frame_index, e.layer, e.blend, e.primitives,
        );
    }

    fn on_optimize(&mut self, e: &OptimizeEvent) {
        let _ = writeln!(
            self.writer,
            "[optimize] frame={} opaque={} clears={}",
            e.frame_index, e.opaque_quads, e.clear_quads,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} primitives={}",
            e.frame_index, e.primitives,
        );
    }
}
