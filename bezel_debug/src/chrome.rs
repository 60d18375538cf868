// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] writes events recorded by a
//! [`RecorderSink`](super::recorder::RecorderSink) as [Chrome Trace Event
//! Format][spec] JSON.
//!
//! Events carry no wall-clock time, so each frame is laid out as a slice one
//! millisecond wide and its events are spaced evenly inside it.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::RecordedEvent;

const FRAME_US: f64 = 1000.0;
const STEP_US: f64 = 100.0;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len());
    let mut step = 0.0;

    for event in events {
        let base = event.frame_index() as f64 * FRAME_US;
        match event {
            RecordedEvent::FrameBegin(e) => {
                step = 0.0;
                out.push(json!({
                    "ph": "B",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": base,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "width": e.width,
                        "height": e.height,
                        "ring_slot": e.ring_slot,
                    }
                }));
            }
            RecordedEvent::Layer(e) => {
                step += STEP_US;
                out.push(json!({
                    "ph": "i",
                    "name": e.layer,
                    "cat": "Layer",
                    "ts": base + step,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "blend": format!("{:?}", e.blend),
                        "enabled": e.enabled,
                        "primitives": e.primitives,
                    }
                }));
            }
            RecordedEvent::Optimize(e) => {
                step += STEP_US;
                out.push(json!({
                    "ph": "i",
                    "name": "Optimize",
                    "cat": "Frame",
                    "ts": base + step,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "opaque_quads": e.opaque_quads,
                        "clear_quads": e.clear_quads,
                    }
                }));
            }
            RecordedEvent::FrameEnd(e) => {
                out.push(json!({
                    "ph": "E",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": base + FRAME_US - STEP_US,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "primitives": e.primitives,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use bezel_core::container::BlendMode;
    use bezel_core::trace::{
        FrameBeginEvent, FrameEndEvent, LayerEvent, OptimizeEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 2,
            width: 640,
            height: 480,
            ring_slot: 1,
        });
        rec.on_layer(&LayerEvent {
            frame_index: 2,
            layer: "screen",
            blend: BlendMode::Add,
            enabled: true,
            primitives: 1,
        });
        rec.on_optimize(&OptimizeEvent {
            frame_index: 2,
            opaque_quads: 1,
            clear_quads: 0,
        });
        rec.on_frame_end(&FrameEndEvent {
            frame_index: 2,
            primitives: 1,
        });

        let mut out = Vec::new();
        export(rec.events(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        // The frame is a duration slice bracketing its events.
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[3]["ph"], "E");
        assert_eq!(parsed[1]["name"], "screen");
        assert_eq!(parsed[1]["args"]["blend"], "Add");
        assert_eq!(parsed[2]["args"]["opaque_quads"], 1);

        let ts: Vec<f64> = parsed.iter().map(|v| v["ts"].as_f64().unwrap()).collect();
        assert!(ts.windows(2).all(|w| w[0] < w[1]), "got: {ts:?}");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
