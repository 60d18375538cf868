// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for compositing emulated screens with data-driven artwork.
//!
//! `bezel_core` holds everything the compositor needs below the layout model:
//! the shared geometry vocabulary, color adjustment, per-source scene
//! containers and the bounded texture-scaling cache. Storage for bitmaps,
//! textures and containers uses flat arenas addressed by generational
//! handles, so weak relations (a texture naming its source bitmap, a
//! primitive naming its texture) never own what they point at.
//!
//! # Architecture
//!
//! ```text
//!   Producer ──► Container::add_{line,quad,glyph}
//!                       │
//!                       ▼
//!   Texture::get_scaled ◄── compositor walk ──► PrimitiveList
//!        │                                          (bezel_render)
//!        ▼
//!   Scaler (nearest, element renderer, …)
//! ```
//!
//! **[`geometry`]**: [`Rect`](kurbo::Rect)-based bounds helpers and pixel
//! rectangles.
//!
//! **[`color`]**: Floating-point RGBA color and packed ARGB helpers.
//!
//! **[`orientation`]**: Swap/flip orientation flags and their composition.
//!
//! **[`transform`]**: Chained scale/offset/color/orientation transform.
//!
//! **[`adjust`]**: Brightness/contrast/gamma mapping and lookup tables.
//!
//! **[`arena`]**: Generational slot storage behind every handle type.
//!
//! **[`bitmap`]**: Source bitmaps and the [`BitmapStore`](bitmap::BitmapStore)
//! registry.
//!
//! **[`texture`]**: Source-bitmap wrapper with a fixed cache of scaled
//! copies.
//!
//! **[`container`]**: Per-source accumulator of draw items plus color
//! correction state.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-composition instrumentation.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod adjust;
pub mod arena;
pub mod bitmap;
pub mod color;
pub mod container;
pub mod geometry;
pub mod orientation;
pub mod texture;
pub mod trace;
pub mod transform;
