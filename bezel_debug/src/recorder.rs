// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event it
//! receives, in order, for later inspection or export.

use bezel_core::trace::{FrameBeginEvent, FrameEndEvent, LayerEvent, OptimizeEvent, TraceSink};

/// One recorded event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`LayerEvent`].
    Layer(LayerEvent),
    /// An [`OptimizeEvent`].
    Optimize(OptimizeEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
}

impl RecordedEvent {
    /// Frame the event belongs to.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::FrameBegin(e) => e.frame_index,
            Self::Layer(e) => e.frame_index,
            Self::Optimize(e) => e.frame_index,
            Self::FrameEnd(e) => e.frame_index,
        }
    }
}

/// A [`TraceSink`] that keeps every event.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events in arrival order.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns its events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.events.push(RecordedEvent::FrameBegin(*e));
    }

    fn on_layer(&mut self, e: &LayerEvent) {
        self.events.push(RecordedEvent::Layer(*e));
    }

    fn on_optimize(&mut self, e: &OptimizeEvent) {
        self.events.push(RecordedEvent::Optimize(*e));
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.events.push(RecordedEvent::FrameEnd(*e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bezel_core::trace::Tracer;
    use bezel_layout::file::LayoutRequest;
    use bezel_layout::subst::ScreenInfo;
    use bezel_render::compositor::Compositor;

    #[test]
    fn records_a_whole_frame() {
        let mut c = Compositor::new();
        c.add_screen(ScreenInfo::new(320, 240));
        let mut target = c.create_target(&LayoutRequest::default());

        let mut rec = RecorderSink::new();
        target.get_primitives_traced(&mut c, &mut Tracer::new(&mut rec));

        let events = rec.events();
        assert!(matches!(events.first(), Some(RecordedEvent::FrameBegin(_))));
        assert!(matches!(events.last(), Some(RecordedEvent::FrameEnd(_))));
        let layers = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Layer(_)))
            .count();
        assert_eq!(layers, 4);
        assert!(events.iter().all(|e| e.frame_index() == 1));
    }

    #[test]
    fn clear_forgets_events() {
        let mut rec = RecorderSink::new();
        rec.on_frame_end(&FrameEndEvent {
            frame_index: 3,
            primitives: 0,
        });
        assert_eq!(rec.events().len(), 1);
        rec.clear();
        assert!(rec.into_events().is_empty());
    }
}
