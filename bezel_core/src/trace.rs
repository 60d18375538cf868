// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for primitive-list construction.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! compositor calls while it builds a frame. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.

use crate::container::BlendMode;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a target starts building a primitive list.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Per-target frame counter.
    pub frame_index: u64,
    /// Device width in pixels.
    pub width: u32,
    /// Device height in pixels.
    pub height: u32,
    /// Index of the ring buffer being filled.
    pub ring_slot: u8,
}

/// Emitted after one artwork layer has been walked.
#[derive(Clone, Copy, Debug)]
pub struct LayerEvent {
    /// Per-target frame counter.
    pub frame_index: u64,
    /// Layer name (`"backdrop"`, `"screen"`, `"overlay"` or `"bezel"`).
    pub layer: &'static str,
    /// Blend mode applied to items without their own.
    pub blend: BlendMode,
    /// Whether the layer is enabled in the current configuration.
    pub enabled: bool,
    /// Primitives emitted for this layer, after clipping.
    pub primitives: u32,
}

/// Emitted after the redraw-region optimizer has run.
#[derive(Clone, Copy, Debug)]
pub struct OptimizeEvent {
    /// Per-target frame counter.
    pub frame_index: u64,
    /// Leading quads proven opaque and switched to no blending.
    pub opaque_quads: u32,
    /// Clear quads inserted for the uncovered remainder.
    pub clear_quads: u32,
}

/// Emitted when a primitive list is complete.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Per-target frame counter.
    pub frame_index: u64,
    /// Total primitives in the list.
    pub primitives: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the compositor.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a target starts a frame.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called after each layer.
    fn on_layer(&mut self, e: &LayerEvent) {
        _ = e;
    }

    /// Called after optimization.
    fn on_optimize(&mut self, e: &OptimizeEvent) {
        _ = e;
    }

    /// Called when the list is complete.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LayerEvent`].
    #[inline]
    pub fn layer(&mut self, e: &LayerEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_layer(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OptimizeEvent`].
    #[inline]
    pub fn optimize(&mut self, e: &OptimizeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_optimize(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameEndEvent`].
    #[inline]
    pub fn frame_end(&mut self, e: &FrameEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

impl Default for Tracer<'_> {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        layers: u32,
        ends: u32,
    }

    impl TraceSink for Counter {
        fn on_layer(&mut self, _e: &LayerEvent) {
            self.layers += 1;
        }

        fn on_frame_end(&mut self, _e: &FrameEndEvent) {
            self.ends += 1;
        }
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let mut sink = Counter::default();
        {
            let mut tracer = Tracer::new(&mut sink);
            tracer.layer(&LayerEvent {
                frame_index: 0,
                layer: "screen",
                blend: BlendMode::Add,
                enabled: true,
                primitives: 1,
            });
            tracer.frame_end(&FrameEndEvent {
                frame_index: 0,
                primitives: 1,
            });
            tracer.optimize(&OptimizeEvent {
                frame_index: 0,
                opaque_quads: 0,
                clear_quads: 1,
            });
        }
        assert_eq!(sink.layers, 1);
        assert_eq!(sink.ends, 1);
    }

    #[test]
    fn none_tracer_is_silent() {
        let mut tracer = Tracer::none();
        tracer.frame_begin(&FrameBeginEvent {
            frame_index: 0,
            width: 1,
            height: 1,
            ring_slot: 0,
        });
    }
}
